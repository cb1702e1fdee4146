use std::collections::HashMap;

use super::ParameterSource;
use crate::types::{Oid, SqlValue, type_name};

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    value: SqlValue,
    sql_type: Option<Oid>,
    type_name: Option<String>,
}

/// `ParameterSource` backed by an insertion-ordered map.
///
/// Adding a name twice replaces its value in place; the original position is kept for
/// the `Display` listing.
/// ```rust
/// use pg_named::prelude::*;
/// use pg_named::types::oid;
///
/// let mut source = MapParameterSource::new();
/// source
///     .add_value("name", "john")
///     .add_typed_value("age", "35", oid::INT4);
/// assert_eq!(source.to_string(), "MapParameterSource {name=john (type:text), age=35 (type:int4)}");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MapParameterSource {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl MapParameterSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value whose type will be inferred from its shape.
    pub fn add_value(&mut self, name: impl Into<String>, value: impl Into<SqlValue>) -> &mut Self {
        self.insert(name.into(), value.into(), None, None);
        self
    }

    /// Add a value with an explicit type identifier.
    pub fn add_typed_value(
        &mut self,
        name: impl Into<String>,
        value: impl Into<SqlValue>,
        sql_type: Oid,
    ) -> &mut Self {
        self.insert(name.into(), value.into(), Some(sql_type), None);
        self
    }

    /// Add a value with an explicit type identifier and type name.
    pub fn add_typed_value_with_name(
        &mut self,
        name: impl Into<String>,
        value: impl Into<SqlValue>,
        sql_type: Oid,
        type_name: impl Into<String>,
    ) -> &mut Self {
        self.insert(
            name.into(),
            value.into(),
            Some(sql_type),
            Some(type_name.into()),
        );
        self
    }

    pub fn add_values<I, K, V>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<SqlValue>,
    {
        for (name, value) in values {
            self.insert(name.into(), value.into(), None, None);
        }
        self
    }

    /// Owned-chaining variant of `add_value`.
    #[must_use]
    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.add_value(name, value);
        self
    }

    #[must_use]
    pub fn with_typed_value(
        mut self,
        name: impl Into<String>,
        value: impl Into<SqlValue>,
        sql_type: Oid,
    ) -> Self {
        self.add_typed_value(name, value, sql_type);
        self
    }

    /// Declare the type of a parameter that has already been added. Names not present
    /// yet are ignored; use `add_typed_value` to add and type in one step.
    pub fn register_sql_type(&mut self, name: &str, sql_type: Oid) -> &mut Self {
        if let Some(&pos) = self.index.get(name) {
            self.entries[pos].sql_type = Some(sql_type);
        }
        self
    }

    pub fn register_type_name(&mut self, name: &str, type_name: impl Into<String>) -> &mut Self {
        if let Some(&pos) = self.index.get(name) {
            self.entries[pos].type_name = Some(type_name.into());
        }
        self
    }

    /// Current values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.entries
            .iter()
            .map(|entry| (entry.name.as_str(), &entry.value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn insert(
        &mut self,
        name: String,
        value: SqlValue,
        sql_type: Option<Oid>,
        type_name: Option<String>,
    ) {
        match self.index.get(&name) {
            Some(&pos) => {
                let entry = &mut self.entries[pos];
                entry.value = value;
                entry.sql_type = sql_type;
                entry.type_name = type_name;
            }
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push(Entry {
                    name,
                    value,
                    sql_type,
                    type_name,
                });
            }
        }
    }

    fn entry(&self, name: &str) -> Option<&Entry> {
        self.index.get(name).map(|&pos| &self.entries[pos])
    }
}

impl ParameterSource for MapParameterSource {
    fn has_value(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    fn value(&self, name: &str) -> Option<&SqlValue> {
        self.entry(name).map(|entry| &entry.value)
    }

    fn sql_type(&self, name: &str) -> Option<Oid> {
        self.entry(name).and_then(|entry| entry.sql_type)
    }

    fn type_name(&self, name: &str) -> Option<&str> {
        self.entry(name).and_then(|entry| entry.type_name.as_deref())
    }

    fn parameter_names(&self) -> Option<Vec<&str>> {
        Some(self.entries.iter().map(|entry| entry.name.as_str()).collect())
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for MapParameterSource
where
    K: Into<String>,
    V: Into<SqlValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut source = MapParameterSource::new();
        source.add_values(iter);
        source
    }
}

impl From<HashMap<String, SqlValue>> for MapParameterSource {
    fn from(values: HashMap<String, SqlValue>) -> Self {
        values.into_iter().collect()
    }
}

impl std::fmt::Display for MapParameterSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MapParameterSource {")?;
        for (idx, entry) in self.entries.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", entry.name, entry.value)?;
            let declared = entry.type_name.clone().or_else(|| {
                entry
                    .sql_type
                    .or_else(|| entry.value.inferred_oid())
                    .filter(|&id| id != crate::types::TYPE_UNKNOWN)
                    .map(|id| type_name(id).map_or_else(|| id.to_string(), str::to_string))
            });
            if let Some(name) = declared {
                write!(f, " (type:{name})")?;
            }
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::oid;

    #[test]
    fn lookups_and_declared_types() {
        let mut source = MapParameterSource::new();
        source
            .add_value("a", 1i64)
            .add_typed_value_with_name("b", "{1,2}", 1016, "int8[]")
            .add_value("n", SqlValue::Null);

        assert!(source.has_value("a"));
        assert!(source.has_value("n"));
        assert!(!source.has_value("zzz"));
        assert_eq!(source.value("a"), Some(&SqlValue::BigInt(1)));
        assert_eq!(source.sql_type("a"), None);
        assert_eq!(source.sql_type("b"), Some(1016));
        assert_eq!(source.type_name("b"), Some("int8[]"));
        assert_eq!(source.parameter_names(), Some(vec!["a", "b", "n"]));
    }

    #[test]
    fn replacing_keeps_position() {
        let mut source = MapParameterSource::new();
        source.add_value("x", 1i32).add_value("y", 2i32).add_value("x", 3i32);
        let names: Vec<&str> = source.values().map(|(name, _)| name).collect();
        assert_eq!(names, ["x", "y"]);
        assert_eq!(source.value("x"), Some(&SqlValue::Int(3)));
        assert_eq!(source.len(), 2);
    }

    #[test]
    fn register_type_after_adding() {
        let mut source = MapParameterSource::new().with_value("d", "2024-01-01");
        source.register_sql_type("d", oid::DATE);
        assert_eq!(source.sql_type("d"), Some(oid::DATE));
        assert_eq!(source.to_string(), "MapParameterSource {d=2024-01-01 (type:date)}");
    }

    #[test]
    fn registering_an_unknown_name_is_ignored() {
        let mut source = MapParameterSource::new();
        source.register_sql_type("d", oid::DATE);
        assert!(source.is_empty());
        assert!(!source.has_value("d"));

        source.add_value("d", "2024-01-01");
        assert_eq!(source.sql_type("d"), None);
    }

    #[test]
    fn display_omits_unknown_types() {
        let source: MapParameterSource = [("n", SqlValue::Null)].into_iter().collect();
        assert_eq!(source.to_string(), "MapParameterSource {n=null}");
    }
}
