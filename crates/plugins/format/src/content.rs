//! Content classification for downloaded attachments.

/// How downloaded bytes are presented to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// Spreadsheet, decoded into row records
    Tabular,
    /// Image the client can display inline
    Image,
    /// Anything else, returned base64-encoded
    Binary,
}

const SPREADSHEET_TYPES: &[&str] = &[
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-excel",
    "application/excel",
    "application/x-excel",
    "application/x-msexcel",
];

const IMAGE_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/jpg",
    "image/gif",
    "image/webp",
    "image/bmp",
];

const SPREADSHEET_EXTENSIONS: &[&str] = &[".xlsx", ".xls"];

/// Classify by declared content type, with the filename extension as a
/// fallback for spreadsheets served under a generic type.
pub fn classify(content_type: &str, filename: &str) -> ContentKind {
    let content_type = content_type.trim().to_ascii_lowercase();

    if SPREADSHEET_TYPES.contains(&content_type.as_str()) || has_spreadsheet_extension(filename) {
        return ContentKind::Tabular;
    }

    if IMAGE_TYPES.contains(&content_type.as_str()) {
        return ContentKind::Image;
    }

    ContentKind::Binary
}

fn has_spreadsheet_extension(filename: &str) -> bool {
    let lower = filename.to_ascii_lowercase();
    SPREADSHEET_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}
