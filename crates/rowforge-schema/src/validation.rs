use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::lookup::AttributeCatalog;
use crate::model::{Relationship, SchemaModel};

/// Validate internal consistency of a schema model.
///
/// This checks:
/// - entities have at least one attribute and exactly one unique-id attribute
/// - attribute names and aliases are unique
/// - direct relationship endpoints resolve to known attributes
/// - path steps reference existing, non-path relationships
///
/// Failures here are fatal to a run; generation never starts on an
/// invalid schema.
pub fn validate_schema(schema: &SchemaModel) -> Result<()> {
    let mut aliases = BTreeSet::new();

    for entity in schema.entities.values() {
        if entity.attributes.is_empty() {
            return Err(Error::InvalidSchema(format!(
                "entity '{}' has no attributes",
                entity.id
            )));
        }

        let mut names = BTreeSet::new();
        let mut unique_count = 0usize;
        for attribute in &entity.attributes {
            if !names.insert(attribute.name.clone()) {
                return Err(Error::InvalidSchema(format!(
                    "duplicate attribute name: {}.{}",
                    entity.id, attribute.name
                )));
            }
            if attribute.unique_id {
                unique_count += 1;
            }
            if let Some(alias) = attribute.alias.as_ref() {
                if !aliases.insert(alias.clone()) {
                    return Err(Error::InvalidSchema(format!(
                        "duplicate attribute alias '{}' on {}.{}",
                        alias, entity.id, attribute.name
                    )));
                }
            }
        }

        if unique_count != 1 {
            return Err(Error::InvalidSchema(format!(
                "entity '{}' must have exactly one unique-id attribute, found {}",
                entity.id, unique_count
            )));
        }
    }

    let catalog = AttributeCatalog::new(&schema.entities);

    for (id, relationship) in &schema.relationships {
        match relationship {
            Relationship::Direct(direct) => {
                if direct.from_attribute.is_empty() || direct.to_attribute.is_empty() {
                    return Err(Error::InvalidSchema(format!(
                        "relationship '{}' has an empty endpoint",
                        id
                    )));
                }
                for endpoint in [&direct.from_attribute, &direct.to_attribute] {
                    if catalog.resolve(endpoint).is_none() {
                        return Err(Error::InvalidSchema(format!(
                            "relationship '{}' endpoint '{}' does not resolve to any attribute",
                            id, endpoint
                        )));
                    }
                }
            }
            Relationship::Path(path) => {
                if path.steps.is_empty() {
                    return Err(Error::InvalidSchema(format!(
                        "path relationship '{}' has no steps",
                        id
                    )));
                }
                for step in &path.steps {
                    match schema.relationships.get(step) {
                        None => {
                            return Err(Error::InvalidSchema(format!(
                                "path relationship '{}' references unknown relationship '{}'",
                                id, step
                            )));
                        }
                        Some(target) if target.is_path() => {
                            return Err(Error::InvalidSchema(format!(
                                "path relationship '{}' nests path relationship '{}'",
                                id, step
                            )));
                        }
                        Some(_) => {}
                    }
                }
            }
        }
    }

    Ok(())
}
