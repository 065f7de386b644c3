use std::collections::HashSet;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::data_source::SourceError;

/// Field name to declared type, in the order the server declared them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<(String, String)>,
}

impl Schema {
    /// Pairs field names with type names positionally.
    ///
    /// # Errors
    ///
    /// Returns a schema mismatch when the two lists differ in length or a
    /// field name repeats.
    pub fn from_columns(fields: Vec<String>, types: Vec<String>) -> Result<Self, SourceError> {
        if fields.len() != types.len() {
            return Err(SourceError::schema_mismatch(format!(
                "{} field names but {} field types",
                fields.len(),
                types.len()
            )));
        }

        let mut seen = HashSet::with_capacity(fields.len());
        for field in &fields {
            if !seen.insert(field.as_str()) {
                return Err(SourceError::schema_mismatch(format!(
                    "field '{field}' is declared more than once"
                )));
            }
        }

        Ok(Self {
            columns: fields.into_iter().zip(types).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn type_of(&self, field: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, kind)| kind.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .map(|(name, kind)| (name.as_str(), kind.as_str()))
    }
}

impl Serialize for Schema {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, kind) in &self.columns {
            map.serialize_entry(name, kind)?;
        }
        map.end()
    }
}
