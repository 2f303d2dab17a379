//! Header lookup and body extraction
//!
//! Turns a provider part tree into one text body. Selection runs in three
//! tiers: every `text/plain` descendant, otherwise every `text/html`
//! descendant, otherwise the recursive bodies of the direct children.
//! Results within a tier are joined with a blank line.

use crate::mail_client::{Header, MessagePart};

pub const TEXT_PLAIN: &str = "text/plain";
pub const TEXT_HTML: &str = "text/html";

/// Separator placed between collected body fragments
const PART_SEPARATOR: &str = "\n\n";

/// Value of the first header named exactly `name`, or `default`
///
/// Name comparison is case-sensitive and values are returned untrimmed.
pub fn header_or(headers: &[Header], name: &str, default: &str) -> String {
    headers
        .iter()
        .find(|h| h.name == name)
        .map_or_else(|| default.to_owned(), |h| h.value.clone())
}

/// Extract the display body for a part tree
///
/// Never fails; containers without any usable leaf produce an empty string.
pub fn extract_body(part: &MessagePart) -> String {
    if !part.has_children() {
        return decode_body(part.body.as_deref());
    }

    let plain = collect_parts(part, TEXT_PLAIN);
    if !plain.is_empty() {
        return plain.join(PART_SEPARATOR);
    }

    let html = collect_parts(part, TEXT_HTML);
    if !html.is_empty() {
        return html.join(PART_SEPARATOR);
    }

    part.children()
        .iter()
        .map(extract_body)
        .filter(|body| !body.is_empty())
        .collect::<Vec<_>>()
        .join(PART_SEPARATOR)
}

/// Decoded bodies of every descendant with content type `mime_type`
///
/// Walks depth-first, a part before its own children, siblings left to
/// right. The root itself is never a candidate. Parts without body data are
/// skipped but their children are still visited.
fn collect_parts(root: &MessagePart, mime_type: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut stack: Vec<&MessagePart> = root.children().iter().rev().collect();

    while let Some(part) = stack.pop() {
        if part.mime_type.as_deref() == Some(mime_type)
            && let Some(data) = part.body.as_deref()
            && !data.is_empty()
        {
            found.push(decode_body(Some(data)));
        }
        stack.extend(part.children().iter().rev());
    }

    found
}

/// Convert body bytes to text
///
/// Absent or empty data yields an empty string. Each invalid UTF-8 sequence
/// is replaced with a single `?`.
pub fn decode_body(data: Option<&[u8]>) -> String {
    let Some(data) = data else {
        return String::new();
    };

    let mut out = String::with_capacity(data.len());
    for chunk in data.utf8_chunks() {
        out.push_str(chunk.valid());
        if !chunk.invalid().is_empty() {
            out.push('?');
        }
    }
    out
}
