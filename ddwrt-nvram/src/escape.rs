//! Reserved-character escaping for free-text fields.
//!
//! The firmware's web interface stores rule names inside colon-delimited
//! records, so four characters that would break the record structure are
//! replaced by named entities before storage: space, `:`, `<`, and `>`.
//! This mirrors the `httpd_filter_name` routine in the firmware's httpd.
//!
//! The two functions are inverses only across one application each:
//! escaping already-escaped text mangles the entity ampersands and is not
//! undone by a single unescape.

/// Escape the four reserved characters into their named entities.
pub fn escape_name(name: &str) -> String {
    name.replace(' ', "&nbsp;")
        .replace(':', "&semi;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Reverse [`escape_name`].
pub fn unescape_name(name: &str) -> String {
    name.replace("&nbsp;", " ")
        .replace("&semi;", ":")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}
