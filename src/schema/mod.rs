//! Topic schema descriptors
//!
//! Each topic ships one JSON file at `<schema-dir>/<topic>.json`: an ordered
//! array of `{name, field_type, mode, fields?}` objects, where `fields`
//! recurses for nested `RECORD` types. The descriptor is loaded once per run
//! and never mutated; the warehouse backend converts it into its native
//! column types at load time.

mod types;

pub use types::{FieldDescriptor, FieldMode, FieldType};

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Topic;

/// Ordered field list for one topic, loaded from its descriptor file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaDescriptor {
    fields: Vec<FieldDescriptor>,
}

impl SchemaDescriptor {
    /// Build a descriptor from an explicit field list
    pub fn from_fields(fields: Vec<FieldDescriptor>) -> Result<Self> {
        let descriptor = Self { fields };
        descriptor.validate("<inline>")?;
        Ok(descriptor)
    }

    /// Load and validate the descriptor file for a topic
    pub fn load(dir: &Path, topic: &Topic) -> Result<Self> {
        let path = dir.join(format!("{}.json", topic.name()));
        let text = std::fs::read_to_string(&path).map_err(|e| {
            Error::schema(topic.name(), format!("cannot read {}: {e}", path.display()))
        })?;
        let descriptor: SchemaDescriptor =
            serde_json::from_str(&text).map_err(|e| Error::schema(topic.name(), e.to_string()))?;
        descriptor.validate(topic.name())?;
        Ok(descriptor)
    }

    /// The ordered fields
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Number of top-level fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the descriptor has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn validate(&self, topic: &str) -> Result<()> {
        if self.fields.is_empty() {
            return Err(Error::schema(topic, "descriptor has no fields"));
        }
        for field in &self.fields {
            validate_field(topic, field)?;
        }
        Ok(())
    }
}

fn validate_field(topic: &str, field: &FieldDescriptor) -> Result<()> {
    if field.name.is_empty() {
        return Err(Error::schema(topic, "field with empty name"));
    }
    match (field.field_type, &field.fields) {
        (FieldType::Record, Some(nested)) if !nested.is_empty() => {
            for inner in nested {
                validate_field(topic, inner)?;
            }
            Ok(())
        }
        (FieldType::Record, _) => Err(Error::schema(
            topic,
            format!("RECORD field '{}' has no nested fields", field.name),
        )),
        (_, Some(_)) => Err(Error::schema(
            topic,
            format!("field '{}' is not RECORD but declares nested fields", field.name),
        )),
        (_, None) => Ok(()),
    }
}
