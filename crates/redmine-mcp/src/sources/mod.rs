//! Local sources of upload content.

pub mod clipboard;
pub mod file;

pub use clipboard::{
    CaptureOutcome, ClipboardCapture, ClipboardSource, PowerShellRunner, ScriptOutput,
    ScriptRunner,
};
pub use file::{read_local_file, LocalFile};
