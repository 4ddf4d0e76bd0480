//! Clipboard image capture.
//!
//! Capture only works on Windows, where a PowerShell child process reads the
//! clipboard through `System.Windows.Forms` and saves it as PNG into a temp
//! file. The child reports `SUCCESS` or `NO_IMAGE` on stdout.
//!
//! The temp file is a [`tempfile::TempPath`], so it is removed when the
//! capture returns, whichever way it returns.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use redmine_core::{Error, Result};
use tempfile::TempPath;
use tokio::process::Command;
use tracing::{debug, warn};

const SUPPORTED_OS: &str = "windows";
const SIGNAL_SUCCESS: &str = "SUCCESS";
const SIGNAL_NO_IMAGE: &str = "NO_IMAGE";

/// Result of running the capture script.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Runs the clipboard script against a target file.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    async fn save_clipboard_image(&self, target: &Path) -> Result<ScriptOutput>;
}

/// `powershell -STA` runner used in production.
#[derive(Debug, Default, Clone, Copy)]
pub struct PowerShellRunner;

impl PowerShellRunner {
    fn script(target: &Path) -> String {
        let target = target.display().to_string().replace('\'', "''");
        format!(
            "Add-Type -AssemblyName System.Windows.Forms; \
             Add-Type -AssemblyName System.Drawing; \
             $img = [System.Windows.Forms.Clipboard]::GetImage(); \
             if ($img -ne $null) {{ \
             $img.Save('{target}', [System.Drawing.Imaging.ImageFormat]::Png); \
             $img.Dispose(); \
             Write-Output '{SIGNAL_SUCCESS}' \
             }} else {{ Write-Output '{SIGNAL_NO_IMAGE}' }}"
        )
    }
}

#[async_trait]
impl ScriptRunner for PowerShellRunner {
    async fn save_clipboard_image(&self, target: &Path) -> Result<ScriptOutput> {
        debug!(target = %target.display(), "running clipboard capture script");

        let output = Command::new("powershell")
            .args(["-NoProfile", "-NonInteractive", "-STA", "-Command"])
            .arg(Self::script(target))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| Error::Clipboard(format!("failed to start powershell: {}", e)))?;

        Ok(ScriptOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// What the clipboard held.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    /// PNG bytes of the clipboard image.
    Captured(Vec<u8>),
    NoImage,
}

/// Anything that can produce clipboard image bytes.
#[async_trait]
pub trait ClipboardSource: Send + Sync {
    async fn capture(&self) -> Result<CaptureOutcome>;
}

/// Clipboard source backed by a [`ScriptRunner`].
pub struct ClipboardCapture<R> {
    runner: R,
    platform: String,
}

impl<R: ScriptRunner> ClipboardCapture<R> {
    /// Capture on the current operating system.
    pub fn new(runner: R) -> Self {
        Self::with_platform(runner, std::env::consts::OS)
    }

    /// Capture as if running on `platform` (a `std::env::consts::OS` value).
    pub fn with_platform(runner: R, platform: impl Into<String>) -> Self {
        Self {
            runner,
            platform: platform.into(),
        }
    }

    async fn run(&self, target: &Path) -> Result<CaptureOutcome> {
        let output = self.runner.save_clipboard_image(target).await?;

        if !output.success {
            warn!(code = ?output.code, stderr = %output.stderr.trim(), "clipboard script failed");
            let code = output
                .code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            return Err(Error::Clipboard(format!(
                "script exited with {}: {}",
                code,
                output.stderr.trim()
            )));
        }

        match output.stdout.trim() {
            SIGNAL_NO_IMAGE => {
                debug!("clipboard holds no image");
                Ok(CaptureOutcome::NoImage)
            }
            SIGNAL_SUCCESS => {
                let bytes = tokio::fs::read(target).await?;
                debug!(bytes = bytes.len(), "captured clipboard image");
                Ok(CaptureOutcome::Captured(bytes))
            }
            other => Err(Error::Clipboard(format!("unexpected script output: {:?}", other))),
        }
    }
}

impl ClipboardCapture<PowerShellRunner> {
    pub fn powershell() -> Self {
        Self::new(PowerShellRunner)
    }
}

#[async_trait]
impl<R: ScriptRunner> ClipboardSource for ClipboardCapture<R> {
    async fn capture(&self) -> Result<CaptureOutcome> {
        if self.platform != SUPPORTED_OS {
            return Err(Error::PlatformUnsupported(self.platform.clone()));
        }

        let target: TempPath = tempfile::Builder::new()
            .prefix(&format!(
                "redmine-clipboard-{}-",
                chrono::Utc::now().timestamp_millis()
            ))
            .suffix(".png")
            .tempfile()?
            .into_temp_path();

        let result = self.run(&target).await;

        if let Err(e) = target.close() {
            warn!(error = %e, "failed to remove clipboard temp file");
        }
        result
    }
}
