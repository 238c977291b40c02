use serde::{Deserialize, Serialize};

use crate::lookup::AttributeCatalog;
use crate::model::SchemaModel;

/// Entity/relationship lists for diagram rendering.
///
/// Deliberately decoupled from [`crate::graph::DependencyGraph`]: renderers
/// consume plain lists, not the generation engine's internals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagramData {
    pub entities: Vec<DiagramEntity>,
    pub relations: Vec<DiagramRelation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagramEntity {
    pub id: String,
    pub name: String,
    pub attributes: Vec<DiagramAttribute>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagramAttribute {
    pub name: String,
    pub data_type: String,
    pub unique_id: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagramRelation {
    pub relationship: String,
    pub from_entity: String,
    pub to_entity: String,
    pub label: String,
}

/// Collect diagram data from the schema.
///
/// Unlike validation, relationships with unresolvable endpoints are
/// soft-skipped so a partially broken schema can still be drawn.
pub fn diagram_data(schema: &SchemaModel, catalog: &AttributeCatalog) -> DiagramData {
    let entities = schema
        .entities
        .values()
        .map(|entity| DiagramEntity {
            id: entity.id.clone(),
            name: entity.display_name.clone(),
            attributes: entity
                .attributes
                .iter()
                .map(|attribute| DiagramAttribute {
                    name: attribute.name.clone(),
                    data_type: attribute.data_type.clone(),
                    unique_id: attribute.unique_id,
                })
                .collect(),
        })
        .collect();

    let mut relations = Vec::new();
    for (id, direct) in schema.direct_relationships() {
        let (Some(from), Some(to)) = (
            catalog.resolve(&direct.from_attribute),
            catalog.resolve(&direct.to_attribute),
        ) else {
            continue;
        };
        relations.push(DiagramRelation {
            relationship: id.clone(),
            from_entity: from.entity_id.clone(),
            to_entity: to.entity_id.clone(),
            label: format!("{} -> {}", direct.from_attribute, direct.to_attribute),
        });
    }

    DiagramData { entities, relations }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attribute, DirectRelationship, Entity, Relationship};
    use std::collections::BTreeMap;

    #[test]
    fn unresolved_relationship_is_soft_skipped() {
        let schema = SchemaModel {
            entities: BTreeMap::from([(
                "user".to_string(),
                Entity {
                    id: "user".to_string(),
                    external_id: "Example/User".to_string(),
                    display_name: "User".to_string(),
                    description: None,
                    attributes: vec![Attribute {
                        name: "id".to_string(),
                        external_id: String::new(),
                        data_type: "int".to_string(),
                        is_list: false,
                        indexed: false,
                        unique_id: true,
                        alias: Some("userId".to_string()),
                    }],
                },
            )]),
            relationships: BTreeMap::from([(
                "broken".to_string(),
                Relationship::Direct(DirectRelationship {
                    from_attribute: "missing".to_string(),
                    to_attribute: "userId".to_string(),
                }),
            )]),
        };
        let catalog = AttributeCatalog::new(&schema.entities);
        let data = diagram_data(&schema, &catalog);
        assert_eq!(data.entities.len(), 1);
        assert!(data.relations.is_empty());
    }
}
