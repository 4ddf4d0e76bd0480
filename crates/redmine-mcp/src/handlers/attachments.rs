//! Attachment download and upload.
//!
//! Downloads pick one of three response shapes from the declared content
//! type and filename:
//!
//! - spreadsheets are decoded into row records, falling back to base64 with
//!   a note when decoding fails
//! - images become an image item plus a text summary
//! - everything else is returned as base64 text

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use redmine_core::{AttachmentProvider, Result};
use redmine_format::attachments::{
    format_attachment, format_attachment_deleted, format_attachment_updated,
    format_binary_download, format_image_download, format_tabular_download, format_upload,
};
use redmine_format::{classify, render_tabular, ContentKind, TabularRender};
use tracing::{debug, info};

use crate::args::{IdArgs, UpdateAttachmentArgs, UploadArgs, UploadFromClipboardArgs, UploadFromPathArgs};
use crate::protocol::{ToolCallResult, ToolResultContent};
use crate::sources::{read_local_file, CaptureOutcome, ClipboardSource};

pub(crate) const NO_IMAGE_MESSAGE: &str =
    "No image found in the clipboard. Copy an image to the clipboard first, then try again.";

pub async fn download<P>(provider: &P, args: IdArgs) -> Result<ToolCallResult>
where
    P: AttachmentProvider + ?Sized,
{
    let attachment = provider.get_attachment(args.id).await?;
    let content = provider.download_content(&attachment).await?;
    let kind = classify(&attachment.content_type, &attachment.filename);
    debug!(id = attachment.id, bytes = content.len(), ?kind, "downloaded attachment");

    let result = match kind {
        ContentKind::Tabular => match render_tabular(&content) {
            TabularRender::Decoded(table) => {
                ToolCallResult::text(format_tabular_download(&attachment, &table))
            }
            TabularRender::Fallback(reason) => ToolCallResult::text(format_binary_download(
                &attachment,
                &content,
                Some(&reason),
            )),
        },
        ContentKind::Image => ToolCallResult::items(vec![
            ToolResultContent::Image {
                data: STANDARD.encode(&content),
                mime_type: attachment.content_type.trim().to_ascii_lowercase(),
            },
            ToolResultContent::Text {
                text: format_image_download(&attachment),
            },
        ]),
        ContentKind::Binary => {
            ToolCallResult::text(format_binary_download(&attachment, &content, None))
        }
    };
    Ok(result)
}

pub async fn upload_from_path<P>(provider: &P, args: UploadFromPathArgs) -> Result<ToolCallResult>
where
    P: AttachmentProvider + ?Sized,
{
    let file = read_local_file(Path::new(&args.file_path), args.filename.as_deref()).await?;
    push(provider, &file.filename, file.content).await
}

pub async fn upload_from_clipboard<P>(
    provider: &P,
    clipboard: &dyn ClipboardSource,
    args: UploadFromClipboardArgs,
) -> Result<ToolCallResult>
where
    P: AttachmentProvider + ?Sized,
{
    let content = match clipboard.capture().await? {
        CaptureOutcome::Captured(bytes) => bytes,
        CaptureOutcome::NoImage => return Ok(ToolCallResult::error(NO_IMAGE_MESSAGE)),
    };

    let filename = args
        .filename
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| {
            format!(
                "clipboard-image-{}.png",
                chrono::Utc::now().timestamp_millis()
            )
        });
    push(provider, &filename, content).await
}

pub async fn upload<P>(provider: &P, args: UploadArgs) -> Result<ToolCallResult>
where
    P: AttachmentProvider + ?Sized,
{
    push(provider, &args.filename, args.content).await
}

async fn push<P>(provider: &P, filename: &str, content: Vec<u8>) -> Result<ToolCallResult>
where
    P: AttachmentProvider + ?Sized,
{
    let size = content.len();
    let token = provider.upload(filename, content).await?;
    info!(filename, bytes = size, "uploaded file");
    Ok(ToolCallResult::text(format_upload(&token, filename)))
}

pub async fn get<P>(provider: &P, args: IdArgs) -> Result<ToolCallResult>
where
    P: AttachmentProvider + ?Sized,
{
    let attachment = provider.get_attachment(args.id).await?;
    Ok(ToolCallResult::text(format_attachment(&attachment)))
}

pub async fn update<P>(provider: &P, args: UpdateAttachmentArgs) -> Result<ToolCallResult>
where
    P: AttachmentProvider + ?Sized,
{
    provider.update_attachment(args.id, args.input).await?;
    Ok(ToolCallResult::text(format_attachment_updated(args.id)))
}

pub async fn delete<P>(provider: &P, args: IdArgs) -> Result<ToolCallResult>
where
    P: AttachmentProvider + ?Sized,
{
    provider.delete_attachment(args.id).await?;
    Ok(ToolCallResult::text(format_attachment_deleted(args.id)))
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    use redmine_format::testing::xlsx;
    use serde_json::json;

    use super::super::fake::{attachment, FakeClipboard, FakeProvider};
    use super::super::ToolHandler;
    use super::*;
    use crate::sources::clipboard::MockScriptRunner;
    use crate::sources::{ClipboardCapture, ScriptOutput};

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake image";

    fn handler(fake: &Arc<FakeProvider>) -> ToolHandler {
        ToolHandler::new(fake.clone())
    }

    #[tokio::test]
    async fn test_download_image_returns_two_items() {
        let fake = Arc::new(FakeProvider::new());
        fake.add_attachment(attachment(42, "screenshot.png", "image/png"), PNG.to_vec());

        let result = handler(&fake)
            .execute("download_attachment", Some(json!({"id": 42})))
            .await;

        assert!(!result.is_error);
        assert_eq!(result.content.len(), 2);
        assert_eq!(
            result.content[0],
            ToolResultContent::Image {
                data: STANDARD.encode(PNG),
                mime_type: "image/png".into(),
            }
        );
        let text = result.first_text().unwrap();
        assert!(text.contains("42"));
        assert!(text.contains("already supplied"));
    }

    #[tokio::test]
    async fn test_download_spreadsheet_is_decoded() {
        let bytes = xlsx(&[("Sheet1", &[&["Name", "Qty"], &["Widget", "3"]])]).unwrap();
        let fake = Arc::new(FakeProvider::new());
        fake.add_attachment(
            attachment(7, "report.xlsx", "application/octet-stream"),
            bytes,
        );

        let result = handler(&fake)
            .execute("download_attachment", Some(json!({"id": 7})))
            .await;

        assert!(!result.is_error);
        assert_eq!(result.content.len(), 1);
        let text = result.first_text().unwrap();
        assert!(text.starts_with("Attachment #7: report.xlsx"));
        assert!(text.contains("Excel File: 1 sheet(s)"));
        assert!(text.contains("=== Sheet: \"Sheet1\" (2 rows, 2 columns) ==="));
        assert!(text.contains("\"Name\": \"Widget\""));
        assert!(text.contains("\"Qty\": 3"));
    }

    #[tokio::test]
    async fn test_download_corrupt_spreadsheet_falls_back_to_base64() {
        let fake = Arc::new(FakeProvider::new());
        fake.add_attachment(
            attachment(
                8,
                "broken.xlsx",
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ),
            b"not a workbook".to_vec(),
        );

        let result = handler(&fake)
            .execute("download_attachment", Some(json!({"id": 8})))
            .await;

        assert!(!result.is_error);
        let text = result.first_text().unwrap();
        assert!(text.contains("<note>Spreadsheet could not be parsed"));
        assert!(text.contains(&format!(
            "<content_base64>{}</content_base64>",
            STANDARD.encode(b"not a workbook")
        )));
    }

    #[tokio::test]
    async fn test_download_binary() {
        let fake = Arc::new(FakeProvider::new());
        fake.add_attachment(attachment(9, "notes.pdf", "application/pdf"), b"%PDF".to_vec());

        let result = handler(&fake)
            .execute("download_attachment", Some(json!({"id": 9})))
            .await;

        assert!(!result.is_error);
        let text = result.first_text().unwrap();
        assert!(text.contains("<content_base64>JVBERg==</content_base64>"));
        assert!(!text.contains("<note>"));
    }

    #[tokio::test]
    async fn test_download_transfer_failure_is_error_result() {
        let fake = Arc::new(FakeProvider::new());
        fake.add_attachment(attachment(10, "gone.bin", "application/octet-stream"), Vec::new());
        fake.fail_downloads();

        let result = handler(&fake)
            .execute("download_attachment", Some(json!({"id": 10})))
            .await;

        assert!(result.is_error);
        assert_eq!(result.first_text(), Some("Download failed: 404 Not Found"));
    }

    #[tokio::test]
    async fn test_upload_from_path() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(b"a,b\n1,2\n").unwrap();
        let fake = Arc::new(FakeProvider::new());

        let result = handler(&fake)
            .execute(
                "upload_file_from_path",
                Some(json!({"file_path": file.path().to_string_lossy()})),
            )
            .await;

        assert!(!result.is_error);
        let expected_name = file.path().file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(fake.uploads(), vec![(expected_name.clone(), b"a,b\n1,2\n".to_vec())]);
        let text = result.first_text().unwrap();
        assert!(text.contains("<token>token-1</token>"));
        assert!(text.contains(&expected_name));
    }

    #[tokio::test]
    async fn test_upload_from_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.png");
        let fake = Arc::new(FakeProvider::new());

        let result = handler(&fake)
            .execute(
                "upload_file_from_path",
                Some(json!({"file_path": path.to_string_lossy()})),
            )
            .await;

        assert!(result.is_error);
        let text = result.first_text().unwrap();
        assert!(text.contains("not found"));
        assert!(text.contains(&*path.to_string_lossy()));
        assert!(fake.uploads().is_empty());
    }

    #[tokio::test]
    async fn test_upload_base64_content() {
        let fake = Arc::new(FakeProvider::new());
        let result = handler(&fake)
            .execute(
                "upload_file",
                Some(json!({"filename": "hello.txt", "content_base64": "aGVsbG8="})),
            )
            .await;

        assert!(!result.is_error);
        assert_eq!(fake.uploads(), vec![("hello.txt".to_string(), b"hello".to_vec())]);
    }

    #[tokio::test]
    async fn test_clipboard_upload_with_default_filename() {
        let fake = Arc::new(FakeProvider::new());
        let handler = handler(&fake).with_clipboard(Arc::new(FakeClipboard::image(PNG)));

        let result = handler.execute("upload_file_from_clipboard", None).await;

        assert!(!result.is_error);
        let uploads = fake.uploads();
        assert_eq!(uploads.len(), 1);
        assert!(uploads[0].0.starts_with("clipboard-image-"));
        assert!(uploads[0].0.ends_with(".png"));
        assert_eq!(uploads[0].1, PNG);
    }

    #[tokio::test]
    async fn test_clipboard_upload_with_filename() {
        let fake = Arc::new(FakeProvider::new());
        let handler = handler(&fake).with_clipboard(Arc::new(FakeClipboard::image(PNG)));

        handler
            .execute(
                "upload_file_from_clipboard",
                Some(json!({"filename": "bug.png"})),
            )
            .await;
        assert_eq!(fake.uploads()[0].0, "bug.png");
    }

    #[tokio::test]
    async fn test_clipboard_without_image_cleans_up() {
        let seen: Arc<Mutex<Option<PathBuf>>> = Arc::new(Mutex::new(None));
        let seen_in_mock = seen.clone();
        let mut runner = MockScriptRunner::new();
        runner
            .expect_save_clipboard_image()
            .times(1)
            .returning(move |target| {
                *seen_in_mock.lock().unwrap() = Some(target.to_path_buf());
                Ok(ScriptOutput {
                    success: true,
                    code: Some(0),
                    stdout: "NO_IMAGE\r\n".into(),
                    stderr: String::new(),
                })
            });
        let fake = Arc::new(FakeProvider::new());
        let handler = handler(&fake).with_clipboard(Arc::new(ClipboardCapture::with_platform(
            runner, "windows",
        )));

        let result = handler.execute("upload_file_from_clipboard", None).await;

        assert!(result.is_error);
        assert!(result.first_text().unwrap().contains("Copy an image"));
        let path = seen.lock().unwrap().clone().unwrap();
        assert!(!path.exists());
        assert!(fake.uploads().is_empty());
    }

    #[tokio::test]
    async fn test_clipboard_on_unsupported_platform() {
        let mut runner = MockScriptRunner::new();
        runner.expect_save_clipboard_image().never();
        let fake = Arc::new(FakeProvider::new());
        let handler = handler(&fake).with_clipboard(Arc::new(ClipboardCapture::with_platform(
            runner, "macos",
        )));

        let result = handler.execute("upload_file_from_clipboard", None).await;

        assert!(result.is_error);
        assert!(result
            .first_text()
            .unwrap()
            .contains("only supported on Windows (current platform: macos)"));
    }

    #[tokio::test]
    async fn test_update_and_delete_attachment() {
        let fake = Arc::new(FakeProvider::new());
        fake.add_attachment(attachment(5, "a.txt", "text/plain"), Vec::new());
        let handler = handler(&fake);

        let result = handler
            .execute(
                "update_attachment",
                Some(json!({"id": 5, "filename": "b.txt"})),
            )
            .await;
        assert_eq!(result.first_text(), Some("Attachment #5 updated successfully"));

        let result = handler.execute("delete_attachment", Some(json!({"id": 5}))).await;
        assert_eq!(result.first_text(), Some("Attachment #5 deleted successfully"));

        let result = handler.execute("get_attachment", Some(json!({"id": 5}))).await;
        assert!(result.is_error);
    }
}
