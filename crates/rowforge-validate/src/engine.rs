use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use rowforge_generate::rows::{Row, RowSet};
use rowforge_generate::values::LIST_DELIMITER;
use rowforge_schema::{
    AttributeCatalog, EdgeDirection, Entity, SchemaModel, edge_direction,
};

use crate::errors::ValidateError;
use crate::model::{ValidationResult, Violation};

/// Checks uniqueness and referential integrity for a dataset.
///
/// The same check logic serves freshly generated in-memory rows and CSV
/// files reloaded from disk, so a generation bug cannot hide behind a
/// divergent validation path.
#[derive(Debug, Default)]
pub struct ValidationEngine;

impl ValidationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Validate in-memory row sets keyed by entity id.
    pub fn validate_rows(
        &self,
        schema: &SchemaModel,
        row_sets: &BTreeMap<String, RowSet>,
    ) -> ValidationResult {
        let mut violations = Vec::new();

        for (entity_id, entity) in &schema.entities {
            if !row_sets.contains_key(entity_id) {
                violations.push(Violation {
                    code: "missing_entity".to_string(),
                    path: entity_id.clone(),
                    message: format!("no rows present for entity '{}'", entity_id),
                    row_index: None,
                    example: None,
                });
            } else {
                check_uniqueness(entity, &row_sets[entity_id], &mut violations);
            }
        }

        check_referential_integrity(schema, row_sets, &mut violations);
        sort_violations(&mut violations);
        ValidationResult { violations }
    }

    /// Validation-only mode: reload CSVs from `dataset_dir` and validate.
    ///
    /// A missing CSV is a violation, not an error; the remaining entities
    /// are still checked. Only infrastructure failures (unreadable
    /// directory, unparseable CSV) surface as errors.
    pub fn validate_dir(
        &self,
        schema: &SchemaModel,
        dataset_dir: &Path,
    ) -> Result<ValidationResult, ValidateError> {
        if !dataset_dir.is_dir() {
            return Err(ValidateError::InvalidDirectory(
                dataset_dir.display().to_string(),
            ));
        }

        let mut violations = Vec::new();
        let mut row_sets: BTreeMap<String, RowSet> = BTreeMap::new();

        for (entity_id, entity) in &schema.entities {
            let file_name = format!("{}.csv", entity.file_stem());
            let path = dataset_dir.join(&file_name);
            if !path.exists() {
                violations.push(Violation {
                    code: "missing_file".to_string(),
                    path: entity_id.clone(),
                    message: format!("file not found: {}", path.display()),
                    row_index: None,
                    example: None,
                });
                continue;
            }

            let row_set = load_entity_csv(entity, &path)?;
            check_uniqueness(entity, &row_set, &mut violations);
            row_sets.insert(entity_id.clone(), row_set);
        }

        check_referential_integrity(schema, &row_sets, &mut violations);
        sort_violations(&mut violations);
        Ok(ValidationResult { violations })
    }
}

fn load_entity_csv(entity: &Entity, path: &Path) -> Result<RowSet, ValidateError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|header| header.to_string())
        .collect();

    let key_attribute = entity
        .unique_id_attribute()
        .map(|attribute| attribute.name.clone())
        .unwrap_or_default();
    let mut row_set = RowSet::new(&entity.id, &key_attribute, headers.clone());

    for record in reader.records() {
        let record = record?;
        let mut row = Row::new();
        for (index, header) in headers.iter().enumerate() {
            let value = record.get(index).unwrap_or_default();
            row.insert(header.clone(), value.to_string());
        }
        row_set.push_row(row);
    }

    Ok(row_set)
}

fn check_uniqueness(entity: &Entity, row_set: &RowSet, violations: &mut Vec<Violation>) {
    let Some(key_attribute) = entity.unique_id_attribute() else {
        return;
    };
    let file_name = format!("{}.csv", entity.file_stem());
    let mut seen = HashSet::new();

    for (row_index, row) in row_set.rows.iter().enumerate() {
        let value = row
            .get(&key_attribute.name)
            .map(String::as_str)
            .unwrap_or_default();
        if !seen.insert(value.to_string()) {
            violations.push(Violation {
                code: "duplicate_value".to_string(),
                path: format!("{}.{}", entity.id, key_attribute.name),
                message: format!(
                    "duplicate unique-id value '{}' for entity '{}' in '{}'",
                    value, entity.id, file_name
                ),
                row_index: Some(row_index as u64 + 1),
                example: Some(value.to_string()),
            });
        }
    }
}

fn check_referential_integrity(
    schema: &SchemaModel,
    row_sets: &BTreeMap<String, RowSet>,
    violations: &mut Vec<Violation>,
) {
    let catalog = AttributeCatalog::new(&schema.entities);

    for (relationship_id, direct) in schema.direct_relationships() {
        let (Some(from), Some(to)) = (
            catalog.resolve(&direct.from_attribute),
            catalog.resolve(&direct.to_attribute),
        ) else {
            continue;
        };
        if from.entity_id == to.entity_id {
            continue;
        }

        let (parent, child) = match edge_direction(from, to) {
            EdgeDirection::FromIsParent => (from, to),
            EdgeDirection::ToIsParent => (to, from),
        };

        // Either side missing was already reported as a missing file or
        // missing entity; the relationship cannot be checked without it.
        let (Some(parent_rows), Some(child_rows)) = (
            row_sets.get(&parent.entity_id),
            row_sets.get(&child.entity_id),
        ) else {
            continue;
        };

        let is_list = schema
            .entities
            .get(&child.entity_id)
            .and_then(|entity| entity.attribute(&child.attribute))
            .map(|attribute| attribute.is_list)
            .unwrap_or(false);

        for (row_index, row) in child_rows.rows.iter().enumerate() {
            let Some(value) = row.get(&child.attribute) else {
                continue;
            };
            let elements: Vec<&str> = if is_list {
                value.split(LIST_DELIMITER).collect()
            } else {
                vec![value.as_str()]
            };

            for element in elements {
                if element.is_empty() {
                    continue;
                }
                if !parent_rows.contains_key(element) {
                    violations.push(Violation {
                        code: "foreign_key".to_string(),
                        path: format!(
                            "{}.{} -> {}.{}",
                            child.entity_id, child.attribute, parent.entity_id, parent.attribute
                        ),
                        message: format!(
                            "value '{}' does not exist in '{}' (relationship '{}')",
                            element, parent.entity_id, relationship_id
                        ),
                        row_index: Some(row_index as u64 + 1),
                        example: Some(element.to_string()),
                    });
                }
            }
        }
    }
}

fn sort_violations(violations: &mut [Violation]) {
    violations.sort_by(|a, b| {
        (
            a.path.clone(),
            a.code.clone(),
            a.row_index.unwrap_or_default(),
        )
            .cmp(&(
                b.path.clone(),
                b.code.clone(),
                b.row_index.unwrap_or_default(),
            ))
    });
}
