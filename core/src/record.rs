//! Ordered column → value rows.

use compact_str::CompactString;

use crate::value::Value;

/// One row of query output.
///
/// Columns keep insertion order, which is the projection order of the query
/// that produced the row. Rows coming from the adapter and rows produced by
/// the fallback executor use the same type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Record {
    fields: Vec<(CompactString, Value)>,
}

impl Record {
    /// Creates an empty record.
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Creates an empty record with room for `capacity` columns.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Sets `column` to `value`. An existing column keeps its position.
    pub fn insert(&mut self, column: impl Into<CompactString>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((column, value)),
        }
    }

    /// Builder form of [`Record::insert`].
    pub fn with(mut self, column: impl Into<CompactString>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    /// Returns the value stored under `column`.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Returns true if the record has a column named `column`.
    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    /// The value of the first column, if any.
    pub fn first_value(&self) -> Option<&Value> {
        self.fields.first().map(|(_, value)| value)
    }

    /// Removes `column`, returning its value.
    pub fn remove(&mut self, column: &str) -> Option<Value> {
        let index = self.fields.iter().position(|(name, _)| name == column)?;
        Some(self.fields.remove(index).1)
    }

    /// Column names in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// `(column, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<CompactString>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (column, value) in iter {
            record.insert(column, value);
        }
        record
    }
}

impl IntoIterator for Record {
    type Item = (CompactString, Value);
    type IntoIter = std::vec::IntoIter<(CompactString, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Record {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (column, value) in &self.fields {
            map.serialize_entry(column.as_str(), value)?;
        }
        map.end()
    }
}

/// Builds a [`Record`] from `column => value` pairs.
///
/// ```
/// use quarry_core::record;
///
/// let row = record! { "id" => 1, "name" => "alice" };
/// assert_eq!(row.columns().collect::<Vec<_>>(), ["id", "name"]);
/// ```
#[macro_export]
macro_rules! record {
    () => { $crate::Record::new() };
    ($($column:expr => $value:expr),+ $(,)?) => {{
        let mut record = $crate::Record::new();
        $( record.insert($column, $value); )+
        record
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_position() {
        let mut row = Record::new().with("a", 1).with("b", 2);
        row.insert("a", 10);
        assert_eq!(row.columns().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(row.get("a"), Some(&Value::Integer(10)));
        assert_eq!(row.first_value(), Some(&Value::Integer(10)));
    }

    #[test]
    fn test_remove_and_contains() {
        let mut row: Record = [("x", 1), ("y", 2)].into_iter().collect();
        assert!(row.contains("y"));
        assert_eq!(row.remove("x"), Some(Value::Integer(1)));
        assert!(!row.contains("x"));
        assert_eq!(row.len(), 1);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serializes_in_column_order() {
        let row = Record::new().with("b", 1).with("a", "x");
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"b":1,"a":"x"}"#);
    }
}
