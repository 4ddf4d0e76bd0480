//! Attachment rendering.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use redmine_core::{Attachment, UploadToken};

use crate::spreadsheet::FallbackReason;
use crate::xml::{escape_xml, format_file_size, optional_element, ref_element};

const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>";

/// Detailed attachment block.
pub fn format_attachment(attachment: &Attachment) -> String {
    let mut out = String::from("<attachment>\n");
    out.push_str(&format!("  <id>{}</id>\n", attachment.id));
    out.push_str(&format!(
        "  <filename>{}</filename>\n",
        escape_xml(&attachment.filename)
    ));
    out.push_str(&format!(
        "  <filesize>{}</filesize>\n",
        format_file_size(attachment.filesize)
    ));
    out.push_str(&format!(
        "  <content_type>{}</content_type>\n",
        escape_xml(&attachment.content_type)
    ));
    optional_element(&mut out, 2, "description", attachment.description.as_deref());
    if let Some(author) = &attachment.author {
        ref_element(&mut out, 2, "author", author.id, &author.name);
    }
    optional_element(&mut out, 2, "created_on", attachment.created_on.as_deref());
    optional_element(&mut out, 2, "content_url", Some(attachment.content_url.as_str()));
    optional_element(&mut out, 2, "thumbnail_url", attachment.thumbnail_url.as_deref());
    out.push_str("</attachment>");
    out
}

/// One-line identity used as a prefix for downloaded content.
pub fn attachment_summary(attachment: &Attachment) -> String {
    format!(
        "Attachment #{}: {} ({}, {})",
        attachment.id,
        attachment.filename,
        format_file_size(attachment.filesize),
        attachment.content_type
    )
}

/// Text accompanying an inline image item.
pub fn format_image_download(attachment: &Attachment) -> String {
    format!(
        "{}\n[Image content already supplied as a separate image item]",
        attachment_summary(attachment)
    )
}

/// Decoded spreadsheet text with the attachment identity on top.
pub fn format_tabular_download(attachment: &Attachment, table: &str) -> String {
    format!("{}\n\n{}", attachment_summary(attachment), table)
}

/// Raw content as base64, optionally noting why a spreadsheet was not decoded.
pub fn format_binary_download(
    attachment: &Attachment,
    content: &[u8],
    fallback: Option<&FallbackReason>,
) -> String {
    let mut out = format!("{}\n<download>\n  <status>success</status>\n", XML_HEADER);
    out.push_str("  <attachment>\n");
    out.push_str(&format!("    <id>{}</id>\n", attachment.id));
    out.push_str(&format!(
        "    <filename>{}</filename>\n",
        escape_xml(&attachment.filename)
    ));
    out.push_str(&format!(
        "    <filesize>{}</filesize>\n",
        format_file_size(attachment.filesize)
    ));
    out.push_str(&format!(
        "    <content_type>{}</content_type>\n",
        escape_xml(&attachment.content_type)
    ));
    out.push_str("  </attachment>\n");
    if let Some(reason) = fallback {
        out.push_str(&format!(
            "  <note>Spreadsheet could not be parsed ({}); returning raw content instead</note>\n",
            escape_xml(&reason.message)
        ));
    }
    out.push_str(&format!(
        "  <content_base64>{}</content_base64>\n",
        STANDARD.encode(content)
    ));
    out.push_str("</download>");
    out
}

/// Upload token plus a snippet showing how to attach it to an issue.
pub fn format_upload(token: &UploadToken, filename: &str) -> String {
    let token = escape_xml(token.as_str());
    let filename = escape_xml(filename);
    format!(
        "{XML_HEADER}
<upload>
  <status>success</status>
  <message>File \"{filename}\" uploaded successfully</message>
  <token>{token}</token>
  <usage>Use this token with create_issue or update_issue to attach the file:
    {{
      \"uploads\": [
        {{
          \"token\": \"{token}\",
          \"filename\": \"{filename}\",
          \"content_type\": \"application/octet-stream\"
        }}
      ]
    }}
  </usage>
</upload>"
    )
}

pub fn format_attachment_updated(id: u64) -> String {
    format!("Attachment #{} updated successfully", id)
}

pub fn format_attachment_deleted(id: u64) -> String {
    format!("Attachment #{} deleted successfully", id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use redmine_core::NamedRef;

    fn sample() -> Attachment {
        Attachment {
            id: 42,
            filename: "a&b.png".into(),
            filesize: 2048,
            content_type: "image/png".into(),
            description: None,
            author: Some(NamedRef {
                id: 1,
                name: "Admin".into(),
            }),
            created_on: Some("2024-01-01T00:00:00Z".into()),
            content_url: "https://redmine.example.com/attachments/download/42/a%26b.png".into(),
            thumbnail_url: None,
        }
    }

    #[test]
    fn test_format_attachment() {
        let text = format_attachment(&sample());
        assert!(text.starts_with("<attachment>\n  <id>42</id>\n"));
        assert!(text.contains("<filename>a&amp;b.png</filename>"));
        assert!(text.contains("<filesize>2 KB</filesize>"));
        assert!(text.contains("<author id=\"1\">Admin</author>"));
        assert!(!text.contains("<description>"));
        assert!(!text.contains("<thumbnail_url>"));
    }

    #[test]
    fn test_image_download_text() {
        let text = format_image_download(&sample());
        assert!(text.contains("#42"));
        assert!(text.contains("already supplied"));
    }

    #[test]
    fn test_binary_download() {
        let text = format_binary_download(&sample(), b"hello", None);
        assert!(text.contains("<content_base64>aGVsbG8=</content_base64>"));
        assert!(!text.contains("<note>"));

        let reason = FallbackReason {
            message: "bad zip".into(),
        };
        let text = format_binary_download(&sample(), b"hello", Some(&reason));
        assert!(text.contains("<note>Spreadsheet could not be parsed (bad zip)"));
    }

    #[test]
    fn test_format_upload() {
        let text = format_upload(&UploadToken("7.abc".into()), "report \"q1\".pdf");
        assert!(text.contains("<token>7.abc</token>"));
        assert!(text.contains("\"token\": \"7.abc\""));
        assert!(text.contains("File \"report &quot;q1&quot;.pdf\" uploaded successfully"));
    }
}
