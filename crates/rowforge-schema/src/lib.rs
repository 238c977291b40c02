//! Core contracts and helpers for Rowforge.
//!
//! This crate defines the canonical schema types, the attribute lookup
//! catalog, structural validation, and the dependency graph used to order
//! entity generation.

pub mod diagram;
pub mod error;
pub mod graph;
pub mod loader;
pub mod lookup;
pub mod model;
pub mod validation;

pub use diagram::{DiagramAttribute, DiagramData, DiagramEntity, DiagramRelation, diagram_data};
pub use error::{Error, Result};
pub use graph::{
    DependencyGraph, EdgeDirection, GraphOutcome, GraphWarning, build_dependency_graph,
    edge_direction, generation_order,
};
pub use loader::{
    load_definition_path, load_definition_str, parse_definition_path, parse_definition_str,
};
pub use lookup::{AttributeCatalog, AttributeRef};
pub use model::{
    Attribute, DirectRelationship, Entity, PathRelationship, Relationship, SchemaModel,
};
pub use validation::validate_schema;

/// Current contract version for schema definition documents.
pub const SCHEMA_VERSION: &str = "0.1";
