use std::borrow::Cow;

/// Strip characters that may not appear in block text.
///
/// Carriage returns and other control characters are removed; tabs are
/// kept. Newlines are normally already consumed as block delimiters.
pub fn sanitize_text(text: &str) -> Cow<'_, str> {
    if text.chars().any(is_forbidden) {
        Cow::Owned(text.chars().filter(|c| !is_forbidden(*c)).collect())
    } else {
        Cow::Borrowed(text)
    }
}

fn is_forbidden(c: char) -> bool {
    c.is_control() && c != '\t'
}
