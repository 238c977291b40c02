use std::collections::{BTreeMap, HashMap};

use crate::model::Entity;

/// Resolved relationship endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRef {
    pub entity_id: String,
    pub attribute: String,
    pub is_unique: bool,
}

/// Read-only lookup tables over every attribute in the schema.
///
/// Built once at load time so relationship resolution never re-scans the
/// attribute lists. Aliases take precedence over dotted references.
#[derive(Debug, Default)]
pub struct AttributeCatalog {
    by_alias: HashMap<String, AttributeRef>,
    by_dotted: HashMap<String, AttributeRef>,
}

impl AttributeCatalog {
    pub fn new(entities: &BTreeMap<String, Entity>) -> Self {
        let mut by_alias = HashMap::new();
        let mut by_dotted = HashMap::new();

        for entity in entities.values() {
            for attribute in &entity.attributes {
                let reference = AttributeRef {
                    entity_id: entity.id.clone(),
                    attribute: attribute.name.clone(),
                    is_unique: attribute.unique_id,
                };

                if let Some(alias) = attribute.alias.as_ref() {
                    by_alias.insert(alias.clone(), reference.clone());
                }

                by_dotted.insert(
                    dotted_key(&entity.id, &attribute.name),
                    reference.clone(),
                );
                // Definitions may also spell the entity by its external
                // name segment.
                let name_segment = entity.file_stem();
                if name_segment != entity.id {
                    by_dotted.insert(dotted_key(name_segment, &attribute.name), reference);
                }
            }
        }

        Self { by_alias, by_dotted }
    }

    /// Resolve an endpoint reference: alias first, dotted form second.
    pub fn resolve(&self, reference: &str) -> Option<&AttributeRef> {
        self.by_alias
            .get(reference)
            .or_else(|| self.by_dotted.get(reference))
    }

    /// True when `alias` is already claimed by some attribute.
    pub fn has_alias(&self, alias: &str) -> bool {
        self.by_alias.contains_key(alias)
    }
}

fn dotted_key(entity: &str, attribute: &str) -> String {
    format!("{entity}.{attribute}")
}
