//! Output rendering for redmine-tools.
//!
//! - [`content`]: decide how downloaded bytes are presented
//! - [`spreadsheet`]: decode `.xlsx`/`.xls` payloads into row records
//! - the resource modules render Redmine payloads as XML-like text

pub mod attachments;
pub mod catalog;
pub mod content;
pub mod issues;
pub mod projects;
pub mod spreadsheet;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;
pub mod xml;

pub use content::{classify, ContentKind};
pub use spreadsheet::{render_tabular, FallbackReason, TabularRender};
