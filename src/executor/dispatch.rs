use tracing::debug;

use crate::error::PgNamedError;
use crate::params::{ParameterSource, build_value_array};
use crate::query_builder::QueryBuilder;
use crate::results::ResultCursor;
use crate::session::{Connector, TabularResult, WireParam};
use crate::translation::{parse_sql, substitute_named_parameters};

use super::targets::QueryTarget;

/// A statement ready for the wire: positional SQL plus encoded parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedCall {
    pub sql: String,
    pub params: Vec<WireParam>,
}

/// Parse, bind and substitute `sql` against `source`.
///
/// `NoParams` skips parsing and sends `sql` unchanged. Any other source, even an empty
/// one, is parsed and bound; a statement without placeholders is then sent unchanged.
///
/// # Errors
/// Parse and binding errors; nothing has been sent to the server when this fails.
///
/// ```rust
/// use pg_named::prelude::*;
///
/// let source = MapParameterSource::new().with_value("one", "john");
/// let call = prepare_call("select name from t where name = :one", &source).unwrap();
/// assert_eq!(call.sql, "select name from t where name = $1");
/// assert_eq!(call.params.len(), 1);
/// ```
pub fn prepare_call<S>(sql: &str, source: &S) -> Result<PreparedCall, PgNamedError>
where
    S: ParameterSource + ?Sized,
{
    if source.bypasses_parsing() {
        return Ok(PreparedCall {
            sql: sql.to_string(),
            params: Vec::new(),
        });
    }

    let parsed = parse_sql(sql)?;
    if parsed.total_parameter_count() == 0 {
        return Ok(PreparedCall {
            sql: sql.to_string(),
            params: Vec::new(),
        });
    }
    let values = build_value_array(&parsed, source)?;
    let substituted = substitute_named_parameters(&parsed, Some(source));
    let params = values
        .iter()
        .map(crate::params::BoundValue::to_wire)
        .collect::<Result<Vec<_>, _>>()?;
    debug!(sql = %substituted, params = params.len(), "prepared statement");
    Ok(PreparedCall {
        sql: substituted,
        params,
    })
}

/// Run `handler` once per row of `result`, in order.
pub(crate) fn collect_rows<T, F>(
    result: TabularResult,
    mut handler: F,
) -> Result<Vec<T>, PgNamedError>
where
    F: FnMut(&ResultCursor) -> Result<T, PgNamedError>,
{
    let mut cursor = ResultCursor::new(result);
    let mut rows = Vec::with_capacity(cursor.row_count());
    while cursor.next() {
        rows.push(handler(&cursor)?);
    }
    Ok(rows)
}

/// Start a fluent builder for either a single connection or a pool.
pub fn query<'a, C: Connector>(
    target: impl Into<QueryTarget<'a, C>>,
    sql: &'a str,
) -> QueryBuilder<'a, C> {
    QueryBuilder::new_target(target.into(), sql)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{MapParameterSource, NoParams};
    use crate::session::ColumnInfo;
    use crate::types::{SqlValue, oid};

    #[test]
    fn no_params_sends_the_statement_verbatim() {
        // would be a parse error if it were scanned
        let sql = "select :{broken";
        let call = prepare_call(sql, &NoParams).unwrap();
        assert_eq!(call.sql, sql);
        assert!(call.params.is_empty());
    }

    #[test]
    fn empty_sources_are_still_parsed_and_bound() {
        let empty = MapParameterSource::new();
        assert!(matches!(
            prepare_call("select :{broken", &empty),
            Err(PgNamedError::Parse { .. })
        ));
        assert!(matches!(
            prepare_call("select name from t where name = :one", &empty),
            Err(PgNamedError::MissingParameter { ref name }) if name == "one"
        ));
        let pairs: &[(&str, SqlValue)] = &[];
        assert!(matches!(
            prepare_call("update t set a = :a where b = ?", pairs),
            Err(PgNamedError::InvalidParameterUsage(_))
        ));

        let sql = "select 1 from t where note = 'a :quoted name'";
        let call = prepare_call(sql, &empty).unwrap();
        assert_eq!(call.sql, sql);
        assert!(call.params.is_empty());
    }

    #[test]
    fn repeated_names_bind_the_same_value_twice() {
        let source = MapParameterSource::new().with_value("v", 7i64);
        let call = prepare_call("select :v + :v", &source).unwrap();
        assert_eq!(call.sql, "select $1 + $2");
        assert_eq!(call.params[0], call.params[1]);
        assert_eq!(call.params[0].value.as_deref(), Some(&b"7"[..]));
        assert_eq!(call.params[0].type_oid, oid::INT8);
    }

    #[test]
    fn binding_errors_surface_before_execution() {
        let source = [("a", SqlValue::Int(1))];
        assert!(matches!(
            prepare_call("select :a, ?", &source),
            Err(PgNamedError::InvalidParameterUsage(_))
        ));
        assert!(matches!(
            prepare_call("select :b", &source),
            Err(PgNamedError::MissingParameter { .. })
        ));
    }

    #[test]
    fn handler_sees_every_row() {
        let result = TabularResult::tuples(
            vec![ColumnInfo::new("n", oid::INT4)],
            vec![vec![Some(b"1".to_vec())], vec![Some(b"2".to_vec())]],
        );
        let rows = collect_rows(result, |row| row.get_int(0)).unwrap();
        assert_eq!(rows, [Some(1), Some(2)]);
    }
}
