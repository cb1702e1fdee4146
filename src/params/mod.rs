// Parameter sources and value binding
//
// - map: ordered map-backed `MapParameterSource`
// - values: `build_value_array` and wire encoding of bound values

use std::collections::{BTreeMap, HashMap};

mod map;
mod values;

pub use map::MapParameterSource;
pub use values::{BoundValue, build_value_array};

use crate::types::{Oid, SqlValue};

/// Supplies values for named SQL parameters.
///
/// Every name referenced by a statement must resolve through `value`, otherwise binding
/// fails with `PgNamedError::MissingParameter`.
pub trait ParameterSource {
    /// Whether a value (possibly `SqlValue::Null`) is registered for `name`.
    fn has_value(&self, name: &str) -> bool {
        self.value(name).is_some()
    }

    fn value(&self, name: &str) -> Option<&SqlValue>;

    /// Declared type for `name`; `None` means infer it from the value.
    fn sql_type(&self, _name: &str) -> Option<Oid> {
        None
    }

    fn type_name(&self, _name: &str) -> Option<&str> {
        None
    }

    /// All registered names, when the source can enumerate them.
    fn parameter_names(&self) -> Option<Vec<&str>> {
        None
    }

    fn is_empty(&self) -> bool {
        false
    }

    /// Send the statement exactly as written, without scanning it for placeholders.
    ///
    /// Only `NoParams` opts out; every other source, empty or not, is parsed and bound.
    fn bypasses_parsing(&self) -> bool {
        false
    }
}

/// A source with no values, for statements without named parameters.
///
/// Statements executed with `NoParams` reach the server byte-for-byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoParams;

impl ParameterSource for NoParams {
    fn value(&self, _name: &str) -> Option<&SqlValue> {
        None
    }

    fn is_empty(&self) -> bool {
        true
    }

    fn bypasses_parsing(&self) -> bool {
        true
    }
}

impl<S: ParameterSource + ?Sized> ParameterSource for &S {
    fn has_value(&self, name: &str) -> bool {
        (**self).has_value(name)
    }

    fn value(&self, name: &str) -> Option<&SqlValue> {
        (**self).value(name)
    }

    fn sql_type(&self, name: &str) -> Option<Oid> {
        (**self).sql_type(name)
    }

    fn type_name(&self, name: &str) -> Option<&str> {
        (**self).type_name(name)
    }

    fn parameter_names(&self) -> Option<Vec<&str>> {
        (**self).parameter_names()
    }

    fn is_empty(&self) -> bool {
        (**self).is_empty()
    }

    fn bypasses_parsing(&self) -> bool {
        (**self).bypasses_parsing()
    }
}

impl<S: std::hash::BuildHasher> ParameterSource for HashMap<String, SqlValue, S> {
    fn value(&self, name: &str) -> Option<&SqlValue> {
        self.get(name)
    }

    fn parameter_names(&self) -> Option<Vec<&str>> {
        Some(self.keys().map(String::as_str).collect())
    }

    fn is_empty(&self) -> bool {
        HashMap::is_empty(self)
    }
}

impl ParameterSource for BTreeMap<String, SqlValue> {
    fn value(&self, name: &str) -> Option<&SqlValue> {
        self.get(name)
    }

    fn parameter_names(&self) -> Option<Vec<&str>> {
        Some(self.keys().map(String::as_str).collect())
    }

    fn is_empty(&self) -> bool {
        BTreeMap::is_empty(self)
    }
}

/// Slices of `(name, value)` pairs, e.g. `&[("id", SqlValue::BigInt(1))]`.
impl ParameterSource for [(&str, SqlValue)] {
    fn value(&self, name: &str) -> Option<&SqlValue> {
        self.iter().find(|(key, _)| *key == name).map(|(_, value)| value)
    }

    fn parameter_names(&self) -> Option<Vec<&str>> {
        Some(self.iter().map(|(key, _)| *key).collect())
    }

    fn is_empty(&self) -> bool {
        <[(&str, SqlValue)]>::is_empty(self)
    }
}

impl<const N: usize> ParameterSource for [(&str, SqlValue); N] {
    fn value(&self, name: &str) -> Option<&SqlValue> {
        self.as_slice().value(name)
    }

    fn parameter_names(&self) -> Option<Vec<&str>> {
        self.as_slice().parameter_names()
    }

    fn is_empty(&self) -> bool {
        N == 0
    }
}
