use std::borrow::Cow;

use crate::executor::QueryTarget;
use crate::params::MapParameterSource;
use crate::session::Connector;
use crate::types::{Oid, SqlValue};

mod dml;
mod select;

/// Fluent builder collecting named parameters for one statement.
///
/// ```rust,no_run
/// # use pg_named::prelude::*;
/// # async fn demo(pool: &PgPool) -> Result<(), PgNamedError> {
/// let names = pool
///     .query("select name from users where age > :age")
///     .param("age", 30i32)
///     .select(|row| row.get_string(0))
///     .await?;
/// # let _ = names;
/// # Ok(())
/// # }
/// ```
pub struct QueryBuilder<'a, C: Connector> {
    pub(crate) target: QueryTarget<'a, C>,
    pub(crate) sql: Cow<'a, str>,
    pub(crate) params: MapParameterSource,
}

impl<'a, C: Connector> QueryBuilder<'a, C> {
    pub(crate) fn new_target(target: QueryTarget<'a, C>, sql: &'a str) -> Self {
        Self {
            target,
            sql: Cow::Borrowed(sql),
            params: MapParameterSource::new(),
        }
    }

    /// Bind one named parameter; its type is inferred from the value.
    #[must_use]
    pub fn param(mut self, name: &str, value: impl Into<SqlValue>) -> Self {
        self.params.add_value(name, value);
        self
    }

    /// Bind one named parameter with an explicit type identifier.
    #[must_use]
    pub fn typed_param(mut self, name: &str, value: impl Into<SqlValue>, sql_type: Oid) -> Self {
        self.params.add_typed_value(name, value, sql_type);
        self
    }

    /// Replace all parameters collected so far.
    #[must_use]
    pub fn params(mut self, params: MapParameterSource) -> Self {
        self.params = params;
        self
    }
}
