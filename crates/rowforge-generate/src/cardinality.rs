use serde::{Deserialize, Serialize};

/// How child foreign keys draw from the parent key pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FkAssignment {
    /// Parent key `i` serves children `[i*k, (i+1)*k)`.
    EvenFanOut { per_parent: u64 },
    /// Cycle through the parent pool in order.
    RoundRobin,
}

impl FkAssignment {
    /// Parent pool index for the given child row index.
    pub fn parent_index(&self, child_index: u64, parent_count: u64) -> u64 {
        match self {
            FkAssignment::EvenFanOut { per_parent } => child_index / per_parent,
            FkAssignment::RoundRobin => child_index % parent_count,
        }
    }
}

/// Non-fatal notice that configured counts cannot be balanced exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardinalityWarning {
    pub parent_entity: String,
    pub child_entity: String,
    pub parent_rows: u64,
    pub child_rows: u64,
    pub detail: String,
}

/// Pick the key distribution for one relationship.
///
/// With auto-cardinality on, an exact multiple of the parent count gets
/// an even fan-out (one-to-one when the counts match); anything else
/// falls back to round-robin and flags the imbalance. With it off,
/// round-robin is used unconditionally and nothing is flagged.
pub fn resolve_assignment(
    parent_entity: &str,
    child_entity: &str,
    parent_rows: u64,
    child_rows: u64,
    auto: bool,
) -> (FkAssignment, Option<CardinalityWarning>) {
    if !auto {
        return (FkAssignment::RoundRobin, None);
    }

    if parent_rows > 0 && child_rows >= parent_rows && child_rows % parent_rows == 0 {
        return (
            FkAssignment::EvenFanOut {
                per_parent: child_rows / parent_rows,
            },
            None,
        );
    }

    let warning = CardinalityWarning {
        parent_entity: parent_entity.to_string(),
        child_entity: child_entity.to_string(),
        parent_rows,
        child_rows,
        detail: format!(
            "{child_rows} '{child_entity}' rows cannot be distributed evenly across \
             {parent_rows} '{parent_entity}' keys"
        ),
    };
    (FkAssignment::RoundRobin, Some(warning))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn reference_counts(assignment: FkAssignment, parent_rows: u64, child_rows: u64) -> HashMap<u64, u64> {
        let mut counts = HashMap::new();
        for child in 0..child_rows {
            *counts
                .entry(assignment.parent_index(child, parent_rows))
                .or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn equal_counts_resolve_one_to_one() {
        let (assignment, warning) = resolve_assignment("user", "role", 5, 5, true);
        assert_eq!(assignment, FkAssignment::EvenFanOut { per_parent: 1 });
        assert!(warning.is_none());

        let counts = reference_counts(assignment, 5, 5);
        assert!(counts.values().all(|count| *count == 1));
    }

    #[test]
    fn exact_multiple_resolves_even_fan_out() {
        let (assignment, warning) = resolve_assignment("user", "role", 2, 10, true);
        assert_eq!(assignment, FkAssignment::EvenFanOut { per_parent: 5 });
        assert!(warning.is_none());

        let counts = reference_counts(assignment, 2, 10);
        assert_eq!(counts.get(&0), Some(&5));
        assert_eq!(counts.get(&1), Some(&5));
    }

    #[test]
    fn uneven_counts_fall_back_with_warning() {
        let (assignment, warning) = resolve_assignment("user", "role", 3, 10, true);
        assert_eq!(assignment, FkAssignment::RoundRobin);
        let warning = warning.expect("imbalance warning");
        assert_eq!(warning.parent_rows, 3);
        assert_eq!(warning.child_rows, 10);
        assert!(warning.detail.contains("evenly"));

        let counts = reference_counts(assignment, 3, 10);
        assert_eq!(counts.values().sum::<u64>(), 10);
        assert!(counts.values().all(|count| *count >= 3));
    }

    #[test]
    fn fewer_children_than_parents_flags_imbalance() {
        let (assignment, warning) = resolve_assignment("user", "role", 10, 3, true);
        assert_eq!(assignment, FkAssignment::RoundRobin);
        assert!(warning.is_some());
    }

    #[test]
    fn uniform_mode_never_warns() {
        let (assignment, warning) = resolve_assignment("user", "role", 3, 10, false);
        assert_eq!(assignment, FkAssignment::RoundRobin);
        assert!(warning.is_none());
    }
}
