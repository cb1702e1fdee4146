pub(super) fn is_line_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'-') && bytes.get(idx + 1) == Some(&b'-')
}

pub(super) fn is_block_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'/') && bytes.get(idx + 1) == Some(&b'*')
}

pub(super) fn is_block_comment_end(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'*') && bytes.get(idx + 1) == Some(&b'/')
}

/// Returns the tag and the index of the closing `$` of a dollar-quote opener.
pub(super) fn try_start_dollar_quote(bytes: &[u8], start: usize) -> Option<(&[u8], usize)> {
    // `$1` is a positional parameter, never a tag
    if bytes.get(start + 1).is_some_and(u8::is_ascii_digit) {
        return None;
    }
    let mut idx = start + 1;
    while idx < bytes.len() && bytes[idx] != b'$' {
        let b = bytes[idx];
        if !(b.is_ascii_alphanumeric() || b == b'_') {
            return None;
        }
        idx += 1;
    }

    if idx < bytes.len() && bytes[idx] == b'$' {
        Some((&bytes[start + 1..idx], idx))
    } else {
        None
    }
}

pub(super) fn matches_tag(bytes: &[u8], idx: usize, tag: &[u8]) -> bool {
    let end = idx + 1 + tag.len();
    end < bytes.len()
        && bytes[idx] == b'$'
        && &bytes[idx + 1..end] == tag
        && bytes.get(end) == Some(&b'$')
}

/// Skip a quoted literal, quoted identifier, comment or dollar-quoted block starting at
/// `position`.
///
/// Returns the first index after the skipped region, or `position` itself when nothing
/// starts there. An unterminated region consumes the rest of the input.
pub(super) fn skip_comments_and_quotes(bytes: &[u8], position: usize) -> usize {
    let len = bytes.len();
    match bytes[position] {
        quote @ (b'\'' | b'"') => bytes[position + 1..]
            .iter()
            .position(|&b| b == quote)
            .map_or(len, |offset| position + 1 + offset + 1),
        _ if is_line_comment_start(bytes, position) => bytes[position + 2..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(len, |offset| position + 2 + offset + 1),
        _ if is_block_comment_start(bytes, position) => (position + 2..len)
            .find(|&idx| is_block_comment_end(bytes, idx))
            .map_or(len, |idx| idx + 2),
        b'$' => match try_start_dollar_quote(bytes, position) {
            Some((tag, open_end)) => (open_end + 1..len)
                .find(|&idx| matches_tag(bytes, idx, tag))
                .map_or(len, |idx| idx + tag.len() + 2),
            None => position,
        },
        _ => position,
    }
}
