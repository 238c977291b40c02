use std::collections::{HashMap, HashSet};

use crate::errors::GenerationError;

/// One generated record: attribute name to rendered CSV value.
pub type Row = HashMap<String, String>;

/// Ordered per-entity row collection with a unique-key membership index.
///
/// `used_keys` keeps duplicate detection at O(1) amortized per insert;
/// `key_values` preserves insertion order so dependents can address
/// parent keys by index during cardinality-aware assignment.
#[derive(Debug, Clone)]
pub struct RowSet {
    pub entity_id: String,
    pub attribute_names: Vec<String>,
    pub rows: Vec<Row>,
    key_attribute: String,
    used_keys: HashSet<String>,
    key_values: Vec<String>,
}

impl RowSet {
    pub fn new(entity_id: &str, key_attribute: &str, attribute_names: Vec<String>) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            attribute_names,
            rows: Vec::new(),
            key_attribute: key_attribute.to_string(),
            used_keys: HashSet::new(),
            key_values: Vec::new(),
        }
    }

    pub fn key_attribute(&self) -> &str {
        &self.key_attribute
    }

    /// Append a generated row, enforcing unique-id distinctness.
    ///
    /// A duplicate key here means the generator itself is broken, so the
    /// failure is loud rather than tolerated.
    pub fn insert_row(&mut self, row: Row) -> Result<(), GenerationError> {
        let key = row.get(&self.key_attribute).cloned().ok_or_else(|| {
            GenerationError::Internal(format!(
                "row for '{}' is missing unique-id attribute '{}'",
                self.entity_id, self.key_attribute
            ))
        })?;
        if !self.used_keys.insert(key.clone()) {
            return Err(GenerationError::Internal(format!(
                "duplicate unique-id value '{}' generated for '{}'",
                key, self.entity_id
            )));
        }
        self.key_values.push(key);
        self.rows.push(row);
        Ok(())
    }

    /// Append a row loaded from external data without the duplicate check.
    ///
    /// Validation detects and reports duplicates itself; loading must not
    /// reject them.
    pub fn push_row(&mut self, row: Row) {
        if let Some(key) = row.get(&self.key_attribute) {
            self.used_keys.insert(key.clone());
            self.key_values.push(key.clone());
        }
        self.rows.push(row);
    }

    /// O(1) membership test against the unique-id values.
    pub fn contains_key(&self, value: &str) -> bool {
        self.used_keys.contains(value)
    }

    /// Unique-id values in insertion order.
    pub fn key_values(&self) -> &[String] {
        &self.key_values
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
