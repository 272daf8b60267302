/// Bytes up to (not including) the first NUL.
pub fn until_nul(buf: &[u8]) -> &[u8] {
    match buf.iter().position(|&b| b == 0) {
        Some(end) => &buf[..end],
        None => buf,
    }
}

/// Split a packed CHAR buffer into tokens.
///
/// A token is a maximal run of printable, non-space ASCII bytes. Every other
/// byte separates tokens; a NUL ends the buffer. Field widths are ignored.
pub fn split_words(buf: &[u8]) -> Vec<String> {
    until_nul(buf)
        .split(|b| !b.is_ascii_graphic())
        .filter(|w| !w.is_empty())
        .map(|w| String::from_utf8_lossy(w).into_owned())
        .collect()
}

/// Number of tokens `split_words` would return.
pub fn count_words(buf: &[u8]) -> usize {
    until_nul(buf)
        .split(|b| !b.is_ascii_graphic())
        .filter(|w| !w.is_empty())
        .count()
}

/// CHAR buffer as text, cut at the first NUL.
pub fn char_text(buf: &[u8]) -> String {
    String::from_utf8_lossy(until_nul(buf)).into_owned()
}
