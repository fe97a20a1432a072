/// Pull the file body out of raw model output.
///
/// Takes the first fenced block when there is one (an unterminated fence runs
/// to the end of the text), otherwise the trimmed text itself.
pub fn extract_code(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let Some(start) = trimmed.find("```") else {
        return Some(trimmed.to_string());
    };
    let after_fence = &trimmed[start + 3..];
    // Skip the info string (e.g. "tsx") on the opening fence line.
    let body = match after_fence.find('\n') {
        Some(nl) => &after_fence[nl + 1..],
        None => return None,
    };
    let code = match body.find("```") {
        Some(end) => &body[..end],
        None => body,
    };

    let code = code.trim_end();
    if code.trim().is_empty() {
        None
    } else {
        Some(format!("{code}\n"))
    }
}
