use std::fmt::Write;

use super::ParsedSql;
use crate::params::ParameterSource;
use crate::types::SqlValue;

/// Rewrite every named occurrence into a positional `$n` placeholder.
///
/// Numbers are handed out left to right, so a name used twice gets two placeholders. A
/// `List` value expands to one placeholder per element, and `Tuple` elements of a list
/// become parenthesized groups. Names missing from `source` still receive a single
/// placeholder. A statement without named parameters is returned unchanged.
///
/// ```rust
/// use pg_named::prelude::*;
/// use pg_named::translation::{parse_sql, substitute_named_parameters};
///
/// let parsed = parse_sql("select * from t where id in (:ids) and owner = :owner").unwrap();
/// let source = MapParameterSource::new()
///     .with_value("ids", SqlValue::list([1i64, 2, 3]))
///     .with_value("owner", "ann");
/// assert_eq!(
///     substitute_named_parameters(&parsed, Some(&source)),
///     "select * from t where id in ($1, $2, $3) and owner = $4"
/// );
/// ```
#[must_use]
pub fn substitute_named_parameters<S>(parsed: &ParsedSql, source: Option<&S>) -> String
where
    S: ParameterSource + ?Sized,
{
    let sql = parsed.cleaned_sql();
    if parsed.occurrences().is_empty() {
        return sql.to_string();
    }

    let mut out = String::with_capacity(sql.len() + parsed.occurrences().len() * 2);
    let mut last = 0;
    let mut number = 1;
    for occ in parsed.occurrences() {
        out.push_str(&sql[last..occ.start]);
        match source.and_then(|s| s.value(&occ.name)) {
            Some(SqlValue::List(items)) => {
                for (k, item) in items.iter().enumerate() {
                    if k > 0 {
                        out.push_str(", ");
                    }
                    if let SqlValue::Tuple(members) = item {
                        out.push('(');
                        for m in 0..members.len() {
                            if m > 0 {
                                out.push_str(", ");
                            }
                            push_placeholder(&mut out, &mut number);
                        }
                        out.push(')');
                    } else {
                        push_placeholder(&mut out, &mut number);
                    }
                }
            }
            _ => push_placeholder(&mut out, &mut number),
        }
        last = occ.end;
    }
    out.push_str(&sql[last..]);
    out
}

fn push_placeholder(out: &mut String, number: &mut usize) {
    // writing into a String cannot fail
    let _ = write!(out, "${number}");
    *number += 1;
}
