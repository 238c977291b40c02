use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::model::{Attribute, Entity, Relationship, SchemaModel};
use crate::validation::validate_schema;

/// Raw definition document as authored in YAML.
#[derive(Debug, Deserialize)]
struct SchemaDefinition {
    /// Optional contract version; rejected when it names another version.
    #[serde(default)]
    version: Option<String>,
    entities: Vec<EntityDefinition>,
    #[serde(default)]
    relationships: Vec<RelationshipDefinition>,
}

#[derive(Debug, Deserialize)]
struct EntityDefinition {
    id: String,
    external_id: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    attributes: Vec<Attribute>,
}

#[derive(Debug, Deserialize)]
struct RelationshipDefinition {
    id: String,
    #[serde(flatten)]
    relationship: Relationship,
}

/// Load and validate a schema definition from a YAML file.
pub fn load_definition_path(path: &Path) -> Result<SchemaModel> {
    let contents = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_definition_str(&contents)
}

/// Load and validate a schema definition from YAML text.
pub fn load_definition_str(contents: &str) -> Result<SchemaModel> {
    let schema = parse_definition_str(contents)?;
    validate_schema(&schema)?;
    Ok(schema)
}

/// Parse a definition file without running schema validation.
///
/// Diagram rendering uses this so a schema with broken relationships can
/// still be drawn; every other consumer loads through the validating
/// entry points.
pub fn parse_definition_path(path: &Path) -> Result<SchemaModel> {
    let contents = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_definition_str(&contents)
}

/// Parse definition text without running schema validation.
pub fn parse_definition_str(contents: &str) -> Result<SchemaModel> {
    let definition: SchemaDefinition = serde_yaml::from_str(contents)?;

    if let Some(version) = definition.version.as_deref() {
        if version != crate::SCHEMA_VERSION {
            return Err(Error::InvalidDefinition(format!(
                "unsupported definition version '{}', expected '{}'",
                version,
                crate::SCHEMA_VERSION
            )));
        }
    }

    let mut entities = BTreeMap::new();
    for entity in definition.entities {
        let display_name = entity
            .display_name
            .unwrap_or_else(|| entity.id.clone());
        let previous = entities.insert(
            entity.id.clone(),
            Entity {
                id: entity.id.clone(),
                external_id: entity.external_id,
                display_name,
                description: entity.description,
                attributes: entity.attributes,
            },
        );
        if previous.is_some() {
            return Err(Error::InvalidDefinition(format!(
                "duplicate entity id '{}'",
                entity.id
            )));
        }
    }

    let mut relationships = BTreeMap::new();
    for relationship in definition.relationships {
        let id = relationship.id.clone();
        if relationships
            .insert(id.clone(), relationship.relationship)
            .is_some()
        {
            return Err(Error::InvalidDefinition(format!(
                "duplicate relationship id '{}'",
                id
            )));
        }
    }

    Ok(SchemaModel {
        entities,
        relationships,
    })
}
