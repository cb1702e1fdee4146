/// Characters that end an unbraced parameter name, besides whitespace.
const PARAMETER_SEPARATORS: &[u8] = b"\"':&,;()|=+-*%/\\<>^";

const fn separator_index() -> [bool; 128] {
    let mut index = [false; 128];
    let mut i = 0;
    while i < PARAMETER_SEPARATORS.len() {
        index[PARAMETER_SEPARATORS[i] as usize] = true;
        i += 1;
    }
    index
}

static SEPARATOR_INDEX: [bool; 128] = separator_index();

/// Whether the character starting at byte `idx` terminates a parameter name.
///
/// Bytes inside a multi-byte character never terminate a name.
pub(super) fn is_parameter_separator(sql: &str, idx: usize) -> bool {
    let b = sql.as_bytes()[idx];
    if b.is_ascii() {
        return SEPARATOR_INDEX[b as usize] || (b as char).is_whitespace();
    }
    sql.get(idx..)
        .and_then(|rest| rest.chars().next())
        .is_some_and(char::is_whitespace)
}

/// End index (exclusive) of an unbraced parameter name starting at `start`.
pub(super) fn scan_parameter_name(sql: &str, start: usize) -> usize {
    let mut idx = start;
    while idx < sql.len() && !is_parameter_separator(sql, idx) {
        idx += 1;
    }
    idx
}

/// Whether a `?` at `idx` is the first half of a two-character Postgres operator
/// (`??`, `?|`, `?&`).
pub(super) fn is_question_operator(bytes: &[u8], idx: usize) -> bool {
    matches!(bytes.get(idx + 1), Some(b'?' | b'|' | b'&'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_stop_at_separators_and_whitespace() {
        assert_eq!(scan_parameter_name(":id)", 1), 3);
        assert_eq!(scan_parameter_name(":id and", 1), 3);
        assert_eq!(scan_parameter_name(":id\u{00a0}x", 1), 3);
        assert_eq!(scan_parameter_name(":naïve", 1), ":naïve".len());
        assert_eq!(scan_parameter_name(":a.b", 1), 4);
    }

    #[test]
    fn question_operators() {
        assert!(is_question_operator(b"a ?| b", 2));
        assert!(is_question_operator(b"a ?? b", 2));
        assert!(is_question_operator(b"a ?& b", 2));
        assert!(!is_question_operator(b"a ? b", 2));
        assert!(!is_question_operator(b"?", 0));
    }
}
