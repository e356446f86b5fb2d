use common::storage::{FilenameError, validate_flat_filename};

/// Reduce a client-supplied upload name to a safe flat filename.
///
/// Only the last path component survives (browsers on Windows may send
/// `C:\Users\...\file.txt`), control characters are dropped, whitespace runs
/// become `_` and leading dots are stripped so the result is never hidden.
pub fn sanitize_upload_filename(raw: &str) -> Result<String, FilenameError> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let visible: String = base.chars().filter(|c| !c.is_control()).collect();
    let joined = visible.split_whitespace().collect::<Vec<_>>().join("_");
    let trimmed = joined.trim_start_matches('.').trim_matches('_');

    validate_flat_filename(trimmed).map(str::to_string)
}

/// Build a safe `Content-Disposition` header value that forces a download.
pub fn content_disposition_value(filename: &str) -> String {
    let ascii_safe: String = filename
        .chars()
        .filter(|c| c.is_ascii_graphic() && !matches!(c, '"' | ';' | '\\'))
        .collect();
    let ascii_name = if ascii_safe.is_empty() {
        "download".to_string()
    } else {
        ascii_safe
    };

    // RFC 5987 percent-encoding for filename*.
    let encoded: String = filename
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'!'
            | b'#'
            | b'$'
            | b'&'
            | b'+'
            | b'-'
            | b'.'
            | b'^'
            | b'_'
            | b'`'
            | b'|'
            | b'~' => String::from(b as char),
            _ => format!("%{b:02X}"),
        })
        .collect();

    format!("attachment; filename=\"{ascii_name}\"; filename*=UTF-8''{encoded}")
}
