use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::lookup::{AttributeCatalog, AttributeRef};
use crate::model::SchemaModel;

/// Directed dependency graph over entity identifiers.
///
/// An edge `parent -> child` means the parent's rows must be generated
/// before the child's.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    adjacency: BTreeMap<String, BTreeSet<String>>,
}

impl DependencyGraph {
    pub fn insert_vertex(&mut self, id: &str) {
        self.adjacency.entry(id.to_string()).or_default();
    }

    /// Insert `parent -> child`; inserting an existing edge is a no-op.
    pub fn insert_edge(&mut self, parent: &str, child: &str) {
        self.adjacency.entry(child.to_string()).or_default();
        self.adjacency
            .entry(parent.to_string())
            .or_default()
            .insert(child.to_string());
    }

    pub fn contains_edge(&self, parent: &str, child: &str) -> bool {
        self.adjacency
            .get(parent)
            .map(|children| children.contains(child))
            .unwrap_or(false)
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(|children| children.len()).sum()
    }

    /// True when `to` is reachable from `from` by following edges.
    pub fn reaches(&self, from: &str, to: &str) -> bool {
        if from == to {
            return true;
        }
        let mut queue = VecDeque::from([from]);
        let mut visited = BTreeSet::from([from]);
        while let Some(node) = queue.pop_front() {
            if let Some(children) = self.adjacency.get(node) {
                for child in children {
                    if child == to {
                        return true;
                    }
                    if visited.insert(child) {
                        queue.push_back(child);
                    }
                }
            }
        }
        false
    }

    fn adjacency(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.adjacency
    }
}

/// Which relationship side generates first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeDirection {
    FromIsParent,
    ToIsParent,
}

/// Decide edge direction from endpoint uniqueness.
///
/// The unique side is the parent. When both sides are unique the
/// from-attribute name is checked for an identifier marker ("Id"/"ID"):
/// a marker means the from side references the to side, so the to side
/// is parent. PK-to-PK pairs with no marker keep the from side as parent;
/// that fixed fallback is a known limitation of the naming heuristic.
/// When neither side is unique the from side is treated as the child.
pub fn edge_direction(from: &AttributeRef, to: &AttributeRef) -> EdgeDirection {
    match (from.is_unique, to.is_unique) {
        (true, false) => EdgeDirection::FromIsParent,
        (false, true) => EdgeDirection::ToIsParent,
        (true, true) => {
            if has_id_marker(&from.attribute) {
                EdgeDirection::ToIsParent
            } else {
                EdgeDirection::FromIsParent
            }
        }
        (false, false) => EdgeDirection::ToIsParent,
    }
}

fn has_id_marker(name: &str) -> bool {
    name.contains("Id") || name.contains("ID")
}

/// Structured warning emitted during graph construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphWarning {
    pub code: String,
    pub relationship: String,
    pub message: String,
}

/// Graph construction result: the graph plus degraded-mode warnings.
#[derive(Debug, Default)]
pub struct GraphOutcome {
    pub graph: DependencyGraph,
    pub warnings: Vec<GraphWarning>,
}

/// Build the entity dependency graph from direct relationships.
///
/// Path relationships are derived dependencies and never contribute
/// edges. Unresolvable endpoints are skipped here with a warning; schema
/// validation reports them fatally before generation. With
/// `prevent_cycles` set, an edge whose child already reaches the parent
/// is dropped and reported instead of closing a cycle.
pub fn build_dependency_graph(
    schema: &SchemaModel,
    catalog: &AttributeCatalog,
    prevent_cycles: bool,
) -> GraphOutcome {
    let mut outcome = GraphOutcome::default();

    for entity_id in schema.entities.keys() {
        outcome.graph.insert_vertex(entity_id);
    }

    for (id, direct) in schema.direct_relationships() {
        let (from, to) = match (
            catalog.resolve(&direct.from_attribute),
            catalog.resolve(&direct.to_attribute),
        ) {
            (Some(from), Some(to)) => (from, to),
            _ => {
                outcome.warnings.push(GraphWarning {
                    code: "unresolved_endpoint".to_string(),
                    relationship: id.clone(),
                    message: format!(
                        "relationship '{}' skipped: endpoint '{}' or '{}' does not resolve",
                        id, direct.from_attribute, direct.to_attribute
                    ),
                });
                continue;
            }
        };

        if from.entity_id == to.entity_id {
            continue;
        }

        let (parent, child) = match edge_direction(from, to) {
            EdgeDirection::FromIsParent => (&from.entity_id, &to.entity_id),
            EdgeDirection::ToIsParent => (&to.entity_id, &from.entity_id),
        };

        if outcome.graph.contains_edge(parent, child) {
            continue;
        }

        if prevent_cycles && outcome.graph.reaches(child, parent) {
            outcome.warnings.push(GraphWarning {
                code: "cycle_edge_dropped".to_string(),
                relationship: id.clone(),
                message: format!(
                    "relationship '{}' dropped: edge {} -> {} would close a cycle",
                    id, parent, child
                ),
            });
            continue;
        }

        outcome.graph.insert_edge(parent, child);
    }

    outcome
}

/// Produce the deterministic generation order for the graph.
///
/// Kahn's algorithm with a `BTreeSet` ready-queue, so entities with no
/// ordering constraint between them come out in ascending lexicographic
/// order. Fails if the graph still contains a cycle.
pub fn generation_order(graph: &DependencyGraph) -> Result<Vec<String>> {
    let adjacency = graph.adjacency();
    let mut indegree: BTreeMap<&str, usize> = BTreeMap::new();

    for node in adjacency.keys() {
        indegree.entry(node).or_insert(0);
    }
    for children in adjacency.values() {
        for child in children {
            *indegree.entry(child).or_insert(0) += 1;
        }
    }

    let mut ready: BTreeSet<&str> = indegree
        .iter()
        .filter_map(|(node, count)| if *count == 0 { Some(*node) } else { None })
        .collect();

    let mut order = Vec::with_capacity(adjacency.len());

    while let Some(node) = ready.iter().next().copied() {
        ready.remove(node);
        order.push(node.to_string());

        if let Some(children) = adjacency.get(node) {
            for child in children {
                if let Some(count) = indegree.get_mut(child.as_str()) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        ready.insert(child);
                    }
                }
            }
        }
    }

    if order.len() == adjacency.len() {
        Ok(order)
    } else {
        let cycle: Vec<&str> = indegree
            .into_iter()
            .filter_map(|(node, count)| if count > 0 { Some(node) } else { None })
            .collect();
        Err(Error::CyclicDependencies(cycle.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attribute, DirectRelationship, Entity, Relationship};
    use std::collections::BTreeMap;

    fn attribute(name: &str, unique_id: bool, alias: Option<&str>) -> Attribute {
        Attribute {
            name: name.to_string(),
            external_id: String::new(),
            data_type: "string".to_string(),
            is_list: false,
            indexed: false,
            unique_id,
            alias: alias.map(|value| value.to_string()),
        }
    }

    fn entity(id: &str, attributes: Vec<Attribute>) -> (String, Entity) {
        (
            id.to_string(),
            Entity {
                id: id.to_string(),
                external_id: format!("Example/{id}"),
                display_name: id.to_string(),
                description: None,
                attributes,
            },
        )
    }

    fn direct(from: &str, to: &str) -> Relationship {
        Relationship::Direct(DirectRelationship {
            from_attribute: from.to_string(),
            to_attribute: to.to_string(),
        })
    }

    fn user_role_schema() -> SchemaModel {
        SchemaModel {
            entities: BTreeMap::from([
                entity("user", vec![attribute("id", true, Some("userId"))]),
                entity(
                    "role",
                    vec![
                        attribute("id", true, None),
                        attribute("user_id", false, Some("roleUserId")),
                    ],
                ),
            ]),
            relationships: BTreeMap::from([(
                "role_user".to_string(),
                direct("roleUserId", "userId"),
            )]),
        }
    }

    #[test]
    fn unique_side_becomes_parent() {
        let schema = user_role_schema();
        let catalog = AttributeCatalog::new(&schema.entities);
        let outcome = build_dependency_graph(&schema, &catalog, true);

        assert!(outcome.warnings.is_empty());
        assert!(outcome.graph.contains_edge("user", "role"));
        assert!(!outcome.graph.contains_edge("role", "user"));
    }

    #[test]
    fn order_puts_parents_first_and_is_deterministic() {
        let schema = user_role_schema();
        let catalog = AttributeCatalog::new(&schema.entities);
        let outcome = build_dependency_graph(&schema, &catalog, true);

        let first = generation_order(&outcome.graph).expect("order");
        let second = generation_order(&outcome.graph).expect("order");
        assert_eq!(first, second);

        let user_idx = first.iter().position(|id| id == "user").unwrap();
        let role_idx = first.iter().position(|id| id == "role").unwrap();
        assert!(user_idx < role_idx);
    }

    #[test]
    fn unrelated_entities_order_alphabetically() {
        let schema = SchemaModel {
            entities: BTreeMap::from([
                entity("zebra", vec![attribute("id", true, None)]),
                entity("alpha", vec![attribute("id", true, None)]),
                entity("mid", vec![attribute("id", true, None)]),
            ]),
            relationships: BTreeMap::new(),
        };
        let catalog = AttributeCatalog::new(&schema.entities);
        let outcome = build_dependency_graph(&schema, &catalog, true);
        let order = generation_order(&outcome.graph).expect("order");
        assert_eq!(order, vec!["alpha", "mid", "zebra"]);
    }

    #[test]
    fn cycle_edge_is_dropped_and_reported() {
        let schema = SchemaModel {
            entities: BTreeMap::from([
                entity(
                    "a",
                    vec![
                        attribute("id", true, Some("aId")),
                        attribute("b_ref", false, Some("aToB")),
                    ],
                ),
                entity(
                    "b",
                    vec![
                        attribute("id", true, Some("bId")),
                        attribute("a_ref", false, Some("bToA")),
                    ],
                ),
            ]),
            relationships: BTreeMap::from([
                ("a_needs_b".to_string(), direct("aToB", "bId")),
                ("b_needs_a".to_string(), direct("bToA", "aId")),
            ]),
        };
        let catalog = AttributeCatalog::new(&schema.entities);
        let outcome = build_dependency_graph(&schema, &catalog, true);

        assert_eq!(outcome.graph.edge_count(), 1);
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].code, "cycle_edge_dropped");
        assert!(generation_order(&outcome.graph).is_ok());
    }

    #[test]
    fn cycle_without_prevention_fails_ordering() {
        let mut graph = DependencyGraph::default();
        graph.insert_edge("a", "b");
        graph.insert_edge("b", "a");
        let err = generation_order(&graph).unwrap_err();
        assert!(err.to_string().contains("cyclic"));
    }

    #[test]
    fn self_referential_relationship_adds_no_edge() {
        let schema = SchemaModel {
            entities: BTreeMap::from([entity(
                "node",
                vec![
                    attribute("id", true, Some("nodeId")),
                    attribute("parent_id", false, Some("nodeParentId")),
                ],
            )]),
            relationships: BTreeMap::from([(
                "node_parent".to_string(),
                direct("nodeParentId", "nodeId"),
            )]),
        };
        let catalog = AttributeCatalog::new(&schema.entities);
        let outcome = build_dependency_graph(&schema, &catalog, true);
        assert_eq!(outcome.graph.edge_count(), 0);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn both_unique_with_id_marker_prefers_to_side() {
        let from = AttributeRef {
            entity_id: "role".to_string(),
            attribute: "userId".to_string(),
            is_unique: true,
        };
        let to = AttributeRef {
            entity_id: "user".to_string(),
            attribute: "id".to_string(),
            is_unique: true,
        };
        assert_eq!(edge_direction(&from, &to), EdgeDirection::ToIsParent);
    }

    #[test]
    fn both_unique_without_marker_keeps_from_side() {
        let from = AttributeRef {
            entity_id: "a".to_string(),
            attribute: "key".to_string(),
            is_unique: true,
        };
        let to = AttributeRef {
            entity_id: "b".to_string(),
            attribute: "key".to_string(),
            is_unique: true,
        };
        assert_eq!(edge_direction(&from, &to), EdgeDirection::FromIsParent);
    }
}
