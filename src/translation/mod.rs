//! Named-parameter parsing and positional substitution.
//!
//! `parse_sql` finds `:name`, `&name` and `:{name}` placeholders outside quoted literals,
//! quoted identifiers, comments and dollar-quoted blocks. `substitute_named_parameters`
//! rewrites each occurrence into `$1`, `$2`, ... in encounter order.

use std::collections::HashSet;

mod parsers;
mod scanner;
mod substitute;

use parsers::skip_comments_and_quotes;
use scanner::{is_question_operator, scan_parameter_name};

pub use substitute::substitute_named_parameters;

use crate::error::PgNamedError;

/// One occurrence of a named parameter; offsets are byte offsets into the cleaned SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterOccurrence {
    pub name: String,
    pub start: usize,
    pub end: usize,
}

/// Parsed representation of a statement.
///
/// Repeated names keep one occurrence each; `named_parameter_count` counts distinct names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSql {
    original_sql: String,
    sql: String,
    occurrences: Vec<ParameterOccurrence>,
    named_parameter_count: usize,
    unnamed_parameter_count: usize,
    total_parameter_count: usize,
}

impl ParsedSql {
    /// The statement as passed in.
    #[must_use]
    pub fn original_sql(&self) -> &str {
        &self.original_sql
    }

    /// The statement with escaped `\:` unescaped; occurrence offsets refer to this text.
    #[must_use]
    pub fn cleaned_sql(&self) -> &str {
        &self.sql
    }

    #[must_use]
    pub fn occurrences(&self) -> &[ParameterOccurrence] {
        &self.occurrences
    }

    /// Parameter names in occurrence order, repeats included.
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.occurrences.iter().map(|occ| occ.name.as_str())
    }

    #[must_use]
    pub fn named_parameter_count(&self) -> usize {
        self.named_parameter_count
    }

    #[must_use]
    pub fn unnamed_parameter_count(&self) -> usize {
        self.unnamed_parameter_count
    }

    #[must_use]
    pub fn total_parameter_count(&self) -> usize {
        self.total_parameter_count
    }
}

impl std::fmt::Display for ParsedSql {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Locate the named and unnamed placeholders of `sql`.
///
/// Unterminated quotes and comments run to the end of the input. A literal `::` is a
/// cast, and `??`, `?|`, `?&` are operators rather than placeholders.
///
/// # Errors
/// Returns `PgNamedError::Parse` for an unterminated `:{name` or a brace that contains
/// `:` or `{`.
///
/// ```rust
/// use pg_named::translation::parse_sql;
///
/// let parsed = parse_sql("select * from t where id = :id and created > :since::date").unwrap();
/// let names: Vec<&str> = parsed.parameter_names().collect();
/// assert_eq!(names, ["id", "since"]);
/// ```
pub fn parse_sql(sql: &str) -> Result<ParsedSql, PgNamedError> {
    let bytes = sql.as_bytes();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut occurrences = Vec::new();
    let mut escapes: Vec<usize> = Vec::new();
    let mut unnamed_parameter_count = 0;
    let mut total_parameter_count = 0;

    let mut record = |name: &str, start: usize, end: usize, shift: usize| {
        occurrences.push(ParameterOccurrence {
            name: name.to_string(),
            start: start - shift,
            end: end - shift,
        });
    };

    let mut idx = 0;
    while idx < bytes.len() {
        let skip_to = skip_comments_and_quotes(bytes, idx);
        if skip_to != idx {
            idx = skip_to;
            continue;
        }

        match bytes[idx] {
            b':' if bytes.get(idx + 1) == Some(&b':') => {
                idx += 2;
            }
            b':' if bytes.get(idx + 1) == Some(&b'{') => {
                let mut end = idx + 2;
                loop {
                    match bytes.get(end) {
                        None => {
                            return Err(PgNamedError::Parse {
                                position: idx,
                                message: format!(
                                    "non-terminated named parameter declaration in statement: {sql}"
                                ),
                            });
                        }
                        Some(b'}') => break,
                        Some(&c) if c == b':' || c == b'{' => {
                            return Err(PgNamedError::Parse {
                                position: idx,
                                message: format!(
                                    "parameter name contains invalid character '{}' in statement: {sql}",
                                    c as char
                                ),
                            });
                        }
                        Some(_) => end += 1,
                    }
                }
                if end - idx > 2 {
                    let name = &sql[idx + 2..end];
                    seen.insert(name);
                    record(name, idx, end + 1, escapes.len());
                    total_parameter_count += 1;
                }
                idx = end + 1;
            }
            b':' | b'&' => {
                let end = scan_parameter_name(sql, idx + 1);
                if end - idx > 1 {
                    let name = &sql[idx + 1..end];
                    seen.insert(name);
                    record(name, idx, end, escapes.len());
                    total_parameter_count += 1;
                }
                idx = end;
            }
            b'\\' if bytes.get(idx + 1) == Some(&b':') => {
                escapes.push(idx);
                idx += 2;
            }
            b'?' if is_question_operator(bytes, idx) => {
                idx += 2;
            }
            b'?' => {
                unnamed_parameter_count += 1;
                total_parameter_count += 1;
                idx += 1;
            }
            _ => idx += 1,
        }
    }

    Ok(ParsedSql {
        original_sql: sql.to_string(),
        sql: remove_escapes(sql, &escapes),
        occurrences,
        named_parameter_count: seen.len(),
        unnamed_parameter_count,
        total_parameter_count,
    })
}

fn remove_escapes(sql: &str, escapes: &[usize]) -> String {
    if escapes.is_empty() {
        return sql.to_string();
    }
    let mut cleaned = String::with_capacity(sql.len() - escapes.len());
    let mut last = 0;
    for &pos in escapes {
        cleaned.push_str(&sql[last..pos]);
        last = pos + 1;
    }
    cleaned.push_str(&sql[last..]);
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(parsed: &ParsedSql) -> Vec<&str> {
        parsed.parameter_names().collect()
    }

    #[test]
    fn finds_named_parameters_with_offsets() {
        let sql = "select * from t where a = :one and b = :two";
        let parsed = parse_sql(sql).unwrap();
        assert_eq!(names(&parsed), ["one", "two"]);
        let first = &parsed.occurrences()[0];
        assert_eq!(&sql[first.start..first.end], ":one");
        let second = &parsed.occurrences()[1];
        assert_eq!(&sql[second.start..second.end], ":two");
        assert_eq!(parsed.named_parameter_count(), 2);
        assert_eq!(parsed.total_parameter_count(), 2);
    }

    #[test]
    fn cast_operator_is_not_a_parameter() {
        let parsed = parse_sql("select :v::text, now()::date").unwrap();
        assert_eq!(names(&parsed), ["v"]);
        let parsed = parse_sql("select 1::int").unwrap();
        assert!(parsed.occurrences().is_empty());
    }

    #[test]
    fn repeated_names_keep_every_occurrence() {
        let parsed = parse_sql("select :a, :b, :a").unwrap();
        assert_eq!(names(&parsed), ["a", "b", "a"]);
        assert_eq!(parsed.named_parameter_count(), 2);
        assert_eq!(parsed.total_parameter_count(), 3);
    }

    #[test]
    fn skips_quotes_comments_and_dollar_blocks() {
        let sql = "select ':x', \":y\" -- :z\n/* :w */ $b$ :v $b$ from t where id = :id";
        let parsed = parse_sql(sql).unwrap();
        assert_eq!(names(&parsed), ["id"]);
    }

    #[test]
    fn braced_parameters() {
        let sql = "select :{first name} from t";
        let parsed = parse_sql(sql).unwrap();
        assert_eq!(names(&parsed), ["first name"]);
        let occ = &parsed.occurrences()[0];
        assert_eq!(&sql[occ.start..occ.end], ":{first name}");

        assert!(parse_sql("select :{}").unwrap().occurrences().is_empty());
    }

    #[test]
    fn malformed_braces_report_position() {
        let err = parse_sql("select :{open").unwrap_err();
        assert!(matches!(err, PgNamedError::Parse { position: 7, .. }));

        let err = parse_sql("select x, :{a:b}").unwrap_err();
        match err {
            PgNamedError::Parse { position, message } => {
                assert_eq!(position, 10);
                assert!(message.contains("':'"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn escaped_colon_is_unescaped_and_shifts_offsets() {
        let sql = r"select '\:' || \:lit, :p";
        let parsed = parse_sql(sql).unwrap();
        assert_eq!(parsed.cleaned_sql(), r"select '\:' || :lit, :p");
        assert_eq!(names(&parsed), ["p"]);
        let occ = &parsed.occurrences()[0];
        assert_eq!(&parsed.cleaned_sql()[occ.start..occ.end], ":p");
    }

    #[test]
    fn postgres_question_operators_are_skipped() {
        let parsed = parse_sql("select data ?| array['a'], data ?& array['b'], data ?? 'c'").unwrap();
        assert_eq!(parsed.unnamed_parameter_count(), 0);

        let parsed = parse_sql("select * from t where a = ? and b = ?").unwrap();
        assert_eq!(parsed.unnamed_parameter_count(), 2);
        assert_eq!(parsed.total_parameter_count(), 2);
    }

    #[test]
    fn ampersand_prefix_and_separators() {
        let parsed = parse_sql("select &amp, a && b, x & y, :n+1, :m)").unwrap();
        assert_eq!(names(&parsed), ["amp", "n", "m"]);
    }

    #[test]
    fn parsing_is_deterministic() {
        let sql = "update t set a = :a, b = :{b} where c = :a -- :d";
        assert_eq!(parse_sql(sql).unwrap(), parse_sql(sql).unwrap());
    }
}
