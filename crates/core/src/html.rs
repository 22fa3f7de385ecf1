//! Plain text to HTML conversion for email bodies
//!
//! The upstream email renderer collapses raw line breaks, so bodies written as
//! plain text need paragraph and break markup before they are submitted.

/// Inline break marker placed where a single line break appeared.
pub const LINE_BREAK: &str = "<br />";

/// Normalize every line-ending variant (`\r\n`, `\r`) to `\n`.
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Convert plain text with line breaks into an HTML fragment
///
/// Double line breaks start a new `<p>` block; single line breaks inside a
/// paragraph become `<br />`. Paragraphs that are empty after trimming are
/// dropped and the blocks are concatenated without a separator.
///
/// This is not idempotent: feed it original plain text only, never its own output.
///
/// # Examples
///
/// ```
/// use instantly_core::html::convert_line_breaks_to_html;
///
/// assert_eq!(convert_line_breaks_to_html("a\n\nb"), "<p>a</p><p>b</p>");
/// assert_eq!(convert_line_breaks_to_html("a\nb"), "<p>a<br />b</p>");
/// assert_eq!(convert_line_breaks_to_html(""), "");
/// ```
pub fn convert_line_breaks_to_html(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let normalized = normalize_line_endings(text);

    normalized
        .split("\n\n")
        .map(str::trim)
        .filter(|paragraph| !paragraph.is_empty())
        .map(|paragraph| format!("<p>{}</p>", paragraph.replace('\n', LINE_BREAK)))
        .collect()
}

/// Collapse any line breaks in a subject line into single spaces
pub fn flatten_subject(subject: &str) -> String {
    normalize_line_endings(subject.trim())
        .split('\n')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
