use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// In-memory schema for one system of record.
///
/// Maps are keyed by internal identifier and iterate in key order, which
/// keeps every derived artifact (graph, order, reports) deterministic.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SchemaModel {
    /// Entities keyed by internal identifier.
    pub entities: BTreeMap<String, Entity>,
    /// Relationships keyed by internal identifier.
    pub relationships: BTreeMap<String, Relationship>,
}

impl SchemaModel {
    /// Direct relationships in deterministic (key) order.
    pub fn direct_relationships(&self) -> impl Iterator<Item = (&String, &DirectRelationship)> {
        self.relationships.iter().filter_map(|(id, relationship)| {
            relationship.as_direct().map(|direct| (id, direct))
        })
    }
}

/// An entity captured from the system of record.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Entity {
    /// Internal identifier used as the map key and graph vertex.
    pub id: String,
    /// Namespaced external identifier, e.g. `Example/User`.
    pub external_id: String,
    /// Human-readable display name.
    pub display_name: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Attributes in declared order; drives the CSV header.
    pub attributes: Vec<Attribute>,
}

impl Entity {
    /// The attribute designated as this entity's primary key.
    ///
    /// Exactly one attribute carries the flag in a valid schema; callers
    /// run [`crate::validate_schema`] before relying on this.
    pub fn unique_id_attribute(&self) -> Option<&Attribute> {
        self.attributes.iter().find(|attribute| attribute.unique_id)
    }

    /// Named attribute lookup.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attribute| attribute.name == name)
    }

    /// Last path segment of the external identifier.
    ///
    /// Used as the CSV file stem and the dotted-reference entity name.
    pub fn file_stem(&self) -> &str {
        self.external_id
            .rsplit('/')
            .next()
            .unwrap_or(&self.external_id)
    }
}

/// A typed attribute of an entity. Immutable once the schema is loaded.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Attribute {
    pub name: String,
    #[serde(default)]
    pub external_id: String,
    /// Declared type, e.g. `string`, `int`, `date`.
    pub data_type: String,
    /// Attribute holds a delimited list of values rather than a scalar.
    #[serde(default)]
    pub is_list: bool,
    #[serde(default)]
    pub indexed: bool,
    /// Marks the entity's primary key; exactly one per entity.
    #[serde(default)]
    pub unique_id: bool,
    /// Schema-wide alias used by relationship endpoints.
    #[serde(default)]
    pub alias: Option<String>,
}

/// A relationship between two entity attributes.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Relationship {
    /// Single from-attribute/to-attribute pair.
    Direct(DirectRelationship),
    /// Ordered traversal over existing direct relationships.
    Path(PathRelationship),
}

impl Relationship {
    pub fn as_direct(&self) -> Option<&DirectRelationship> {
        match self {
            Relationship::Direct(direct) => Some(direct),
            Relationship::Path(_) => None,
        }
    }

    pub fn is_path(&self) -> bool {
        matches!(self, Relationship::Path(_))
    }
}

/// Endpoints are attribute aliases or dotted `Entity.Attribute` references.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DirectRelationship {
    pub from_attribute: String,
    pub to_attribute: String,
}

/// Path steps name existing direct relationships; nesting is rejected.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PathRelationship {
    pub steps: Vec<String>,
}
