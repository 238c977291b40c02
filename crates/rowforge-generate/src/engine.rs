use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use rowforge_schema::{
    AttributeCatalog, DependencyGraph, EdgeDirection, Entity, SchemaModel,
    build_dependency_graph, edge_direction, generation_order, validate_schema,
};

use crate::cardinality::{FkAssignment, resolve_assignment};
use crate::errors::GenerationError;
use crate::model::{EntityReport, GenerateOptions, GenerationIssue, GenerationReport, RowCounts};
use crate::output::write_entity_csv;
use crate::rows::{Row, RowSet};
use crate::values::{attribute_kind, synthesize, synthesize_list, unique_value};

/// Result of a generation run.
#[derive(Debug)]
pub struct GenerationResult {
    pub out_dir: PathBuf,
    pub report: GenerationReport,
    /// Generated rows by entity id, reusable for in-memory validation.
    pub row_sets: BTreeMap<String, RowSet>,
}

/// Entry point for generating datasets from a schema model.
#[derive(Debug, Clone)]
pub struct GenerationEngine {
    options: GenerateOptions,
}

/// Foreign-key obligation on a child entity attribute.
struct FkBinding {
    relationship: String,
    attribute: String,
    parent_entity: String,
    child_attribute_unique: bool,
}

impl GenerationEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    pub fn run(
        &self,
        schema: &SchemaModel,
        counts: &RowCounts,
    ) -> Result<GenerationResult, GenerationError> {
        let start = Instant::now();

        validate_schema(schema)?;
        self.check_counts(counts)?;

        let run_id = uuid::Uuid::new_v4().to_string();
        let mut report = GenerationReport::new(run_id.clone());

        let catalog = AttributeCatalog::new(&schema.entities);
        let outcome = build_dependency_graph(schema, &catalog, self.options.prevent_cycles);
        for warning in &outcome.warnings {
            warn!(
                code = %warning.code,
                relationship = %warning.relationship,
                message = %warning.message
            );
            report.record_warning(GenerationIssue {
                level: "warning".to_string(),
                code: warning.code.clone(),
                message: warning.message.clone(),
                entity: None,
                relationship: Some(warning.relationship.clone()),
            });
        }

        let order = generation_order(&outcome.graph)?;
        let bindings = collect_fk_bindings(schema, &catalog, &outcome.graph);
        self.warn_unknown_count_entities(schema, counts, &mut report);

        std::fs::create_dir_all(&self.options.out_dir)?;

        let mut row_sets: BTreeMap<String, RowSet> = BTreeMap::new();

        info!(
            run_id = %run_id,
            entities = order.len(),
            seed = self.options.seed,
            "generation started"
        );

        for entity_id in &order {
            let entity = schema.entities.get(entity_id).ok_or_else(|| {
                GenerationError::Internal(format!(
                    "ordered entity '{}' missing from schema",
                    entity_id
                ))
            })?;
            let rows_requested = counts.rows_for(&entity.external_id, self.options.default_rows);

            let row_set = self.generate_entity(
                entity,
                rows_requested,
                bindings.get(entity_id).map(Vec::as_slice).unwrap_or(&[]),
                &row_sets,
                &mut report,
            )?;

            let file_name = format!("{}.csv", entity.file_stem());
            let path = self.options.out_dir.join(&file_name);
            report.bytes_written += write_entity_csv(&path, &row_set)?;
            report.files_written += 1;
            report.total_rows += row_set.len() as u64;
            report.entities.push(EntityReport {
                entity: entity.id.clone(),
                external_id: entity.external_id.clone(),
                rows_requested,
                rows_generated: row_set.len() as u64,
                file: file_name.clone(),
            });

            info!(
                entity = %entity.id,
                rows = row_set.len(),
                file = %file_name,
                "entity generated"
            );

            row_sets.insert(entity_id.clone(), row_set);
        }

        report.duration_ms = start.elapsed().as_millis() as u64;

        if self.options.write_report {
            let report_path = self.options.out_dir.join("generation_report.json");
            std::fs::write(&report_path, serde_json::to_vec_pretty(&report)?)?;
        }

        info!(
            run_id = %run_id,
            total_rows = report.total_rows,
            files_written = report.files_written,
            duration_ms = report.duration_ms,
            "generation completed"
        );

        Ok(GenerationResult {
            out_dir: self.options.out_dir.clone(),
            report,
            row_sets,
        })
    }

    /// Reject zero counts before any file is touched.
    fn check_counts(&self, counts: &RowCounts) -> Result<(), GenerationError> {
        if self.options.default_rows == 0 {
            return Err(GenerationError::InvalidCounts(
                "default row count must be positive".to_string(),
            ));
        }
        for (external_id, rows) in &counts.counts {
            if *rows == 0 {
                return Err(GenerationError::InvalidCounts(format!(
                    "row count for '{}' must be positive",
                    external_id
                )));
            }
        }
        Ok(())
    }

    fn warn_unknown_count_entities(
        &self,
        schema: &SchemaModel,
        counts: &RowCounts,
        report: &mut GenerationReport,
    ) {
        for external_id in counts.counts.keys() {
            let known = schema
                .entities
                .values()
                .any(|entity| &entity.external_id == external_id);
            if !known {
                let message =
                    format!("row count configured for unknown entity '{}'", external_id);
                warn!(entity = %external_id, "{}", message);
                report.record_warning(GenerationIssue {
                    level: "warning".to_string(),
                    code: "unknown_count_entity".to_string(),
                    message,
                    entity: Some(external_id.clone()),
                    relationship: None,
                });
            }
        }
    }

    fn generate_entity(
        &self,
        entity: &Entity,
        rows_requested: u64,
        bindings: &[FkBinding],
        row_sets: &BTreeMap<String, RowSet>,
        report: &mut GenerationReport,
    ) -> Result<RowSet, GenerationError> {
        let key_attribute = entity.unique_id_attribute().ok_or_else(|| {
            GenerationError::Internal(format!(
                "entity '{}' reached generation without a unique-id attribute",
                entity.id
            ))
        })?;

        let attribute_names: Vec<String> = entity
            .attributes
            .iter()
            .map(|attribute| attribute.name.clone())
            .collect();
        let mut row_set = RowSet::new(&entity.id, &key_attribute.name, attribute_names);
        let mut rng = ChaCha8Rng::seed_from_u64(hash_seed(self.options.seed, &entity.id));

        let resolved = self.resolve_bindings(entity, rows_requested, bindings, row_sets, report)?;

        let kinds: Vec<_> = entity
            .attributes
            .iter()
            .map(|attribute| (attribute, attribute_kind(attribute)))
            .collect();

        for index in 0..rows_requested {
            let mut row = Row::new();

            for binding in &resolved {
                if let Some(value) = binding.value_for(index) {
                    row.insert(binding.attribute.clone(), value);
                }
            }

            for (attribute, kind) in &kinds {
                if row.contains_key(&attribute.name) {
                    continue;
                }
                let value = if attribute.unique_id {
                    unique_value(attribute, *kind, index)
                } else if attribute.is_list {
                    synthesize_list(attribute, *kind, &mut rng)
                } else {
                    synthesize(attribute, *kind, &mut rng)
                };
                row.insert(attribute.name.clone(), value);
            }

            row_set.insert_row(row)?;
        }

        Ok(row_set)
    }

    fn resolve_bindings<'a>(
        &self,
        entity: &Entity,
        rows_requested: u64,
        bindings: &'a [FkBinding],
        row_sets: &'a BTreeMap<String, RowSet>,
        report: &mut GenerationReport,
    ) -> Result<Vec<ResolvedBinding<'a>>, GenerationError> {
        let mut resolved = Vec::with_capacity(bindings.len());

        for binding in bindings {
            let parent = row_sets.get(&binding.parent_entity).ok_or_else(|| {
                GenerationError::Internal(format!(
                    "parent '{}' not generated before child '{}'",
                    binding.parent_entity, entity.id
                ))
            })?;
            if parent.is_empty() {
                return Err(GenerationError::Internal(format!(
                    "parent '{}' has no rows to reference",
                    binding.parent_entity
                )));
            }

            let (assignment, warning) = resolve_assignment(
                &binding.parent_entity,
                &entity.id,
                parent.len() as u64,
                rows_requested,
                self.options.auto_cardinality,
            );
            if let Some(warning) = warning {
                warn!(
                    parent = %warning.parent_entity,
                    child = %warning.child_entity,
                    parent_rows = warning.parent_rows,
                    child_rows = warning.child_rows,
                    "cardinality imbalance"
                );
                report.record_warning(GenerationIssue {
                    level: "warning".to_string(),
                    code: "cardinality_imbalance".to_string(),
                    message: warning.detail,
                    entity: Some(entity.id.clone()),
                    relationship: Some(binding.relationship.clone()),
                });
            }

            // A foreign key landing on the child's own unique attribute can
            // only reuse each parent key once; overflow rows fall back to
            // synthesized unique values and the gap is reported.
            if binding.child_attribute_unique && rows_requested > parent.len() as u64 {
                let message = format!(
                    "relationship '{}' maps unique attribute '{}.{}' onto {} parent keys for {} rows; \
                     overflow rows will not reference '{}'",
                    binding.relationship,
                    entity.id,
                    binding.attribute,
                    parent.len(),
                    rows_requested,
                    binding.parent_entity
                );
                warn!(relationship = %binding.relationship, "{}", message);
                report.record_warning(GenerationIssue {
                    level: "warning".to_string(),
                    code: "unique_fk_overflow".to_string(),
                    message,
                    entity: Some(entity.id.clone()),
                    relationship: Some(binding.relationship.clone()),
                });
            }

            resolved.push(ResolvedBinding {
                attribute: binding.attribute.clone(),
                pool: parent.key_values(),
                assignment,
                unique: binding.child_attribute_unique,
            });
        }

        Ok(resolved)
    }
}

struct ResolvedBinding<'a> {
    attribute: String,
    pool: &'a [String],
    assignment: FkAssignment,
    unique: bool,
}

impl ResolvedBinding<'_> {
    /// Parent key for the given child row, or `None` when a unique child
    /// attribute has exhausted the pool (caller synthesizes instead).
    fn value_for(&self, child_index: u64) -> Option<String> {
        let pool_len = self.pool.len() as u64;
        if self.unique {
            if child_index < pool_len {
                return Some(self.pool[child_index as usize].clone());
            }
            return None;
        }
        let index = self.assignment.parent_index(child_index, pool_len) % pool_len;
        Some(self.pool[index as usize].clone())
    }
}

/// Collect which attributes of each entity are foreign keys.
///
/// Only relationships whose edge survived graph construction bind a
/// foreign key; a dropped cycle edge leaves the child attribute to plain
/// synthesis (and validation will report the dangling references).
fn collect_fk_bindings(
    schema: &SchemaModel,
    catalog: &AttributeCatalog,
    graph: &DependencyGraph,
) -> BTreeMap<String, Vec<FkBinding>> {
    let mut bindings: BTreeMap<String, Vec<FkBinding>> = BTreeMap::new();

    for (id, direct) in schema.direct_relationships() {
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

        if !graph.contains_edge(&parent.entity_id, &child.entity_id) {
            continue;
        }

        bindings
            .entry(child.entity_id.clone())
            .or_default()
            .push(FkBinding {
                relationship: id.clone(),
                attribute: child.attribute.clone(),
                parent_entity: parent.entity_id.clone(),
                child_attribute_unique: child.is_unique,
            });
    }

    bindings
}

fn hash_seed(seed: u64, key: &str) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in key.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}
