//! Minimal ordered columnar table used as map and layer payload.

use indexmap::IndexMap;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::{Error, Result};

/// Named columns of JSON scalar values, all of the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataFrame {
    columns: IndexMap<String, Vec<Value>>,
}

impl DataFrame {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a frame from `(name, values)` pairs, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RaggedFrame`] if the columns differ in length.
    pub fn from_columns<I, K>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Vec<Value>)>,
        K: Into<String>,
    {
        let mut frame = Self::new();
        for (name, values) in columns {
            frame.push_column(name, values)?;
        }
        Ok(frame)
    }

    /// Build a frame from row objects such as `[{"lat": 1, "lon": 10}, ...]`.
    ///
    /// Columns appear in order of first occurrence; cells a row does not
    /// mention are `null`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if a record is not a JSON object.
    pub fn from_records(records: &[Value]) -> Result<Self> {
        let mut columns: IndexMap<String, Vec<Value>> = IndexMap::new();

        for (row, record) in records.iter().enumerate() {
            let object = record.as_object().ok_or_else(|| Error::InvalidParameter {
                name: format!("records[{row}]"),
                reason: format!("expected a JSON object, got {record}"),
            })?;

            for key in object.keys() {
                columns
                    .entry(key.clone())
                    .or_insert_with(|| vec![Value::Null; row]);
            }
            for (name, values) in &mut columns {
                values.push(object.get(name).cloned().unwrap_or(Value::Null));
            }
        }

        Ok(Self { columns })
    }

    /// Append a column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RaggedFrame`] if the frame already has columns of a
    /// different length.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<Value>) -> Result<()> {
        let name = name.into();
        if let Some(expected) = self.columns.values().next().map(Vec::len) {
            if values.len() != expected {
                return Err(Error::RaggedFrame {
                    column: name,
                    expected,
                    actual: values.len(),
                });
            }
        }
        self.columns.insert(name, values);
        Ok(())
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.values().next().map_or(0, Vec::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Project onto `names`, in the order given.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingColumns`] if any of `names` is absent.
    pub fn select(&self, names: &[&str]) -> Result<Self> {
        if names.iter().any(|name| !self.has_column(name)) {
            return Err(self.missing_columns(names));
        }

        let columns = names
            .iter()
            .filter_map(|name| {
                self.columns
                    .get_key_value(*name)
                    .map(|(key, values)| (key.clone(), values.clone()))
            })
            .collect();

        Ok(Self { columns })
    }

    pub(crate) fn missing_columns(&self, expected: &[&str]) -> Error {
        let quote = |name: &str| format!("\"{name}\"");
        Error::MissingColumns {
            expected: expected.iter().map(|name| quote(name)).collect::<Vec<_>>().join(", "),
            found: self.column_names().map(quote).collect::<Vec<_>>().join(", "),
        }
    }
}

#[derive(Serialize)]
struct ColumnRef<'a> {
    name: &'a str,
    values: &'a [Value],
}

impl Serialize for DataFrame {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let columns: Vec<ColumnRef<'_>> = self
            .columns
            .iter()
            .map(|(name, values)| ColumnRef { name, values })
            .collect();

        let mut state = serializer.serialize_struct("DataFrame", 1)?;
        state.serialize_field("columns", &columns)?;
        state.end()
    }
}
