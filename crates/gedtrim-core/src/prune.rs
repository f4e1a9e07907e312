//! Reference reconciliation
//!
//! Turns a filter result into a pruned working copy of the graph whose
//! cross-references are internally consistent: every family membership an
//! individual claims is mirrored by the family, and vice versa. The source
//! graph is never mutated, so repeated exports from one loaded graph see
//! unaltered data.

use crate::graph::Graph;
use crate::traversal::FilterResult;
use crate::xref::FamilyId;
use std::collections::HashSet;

/// Build the reconciled subset graph for an inclusion set.
///
/// Retained families keep only included spouses and children, in their
/// original relative order; families left with neither are dropped
/// entirely. Retained individuals keep only membership links to families
/// that survived. By construction this only removes references, so it
/// cannot fail.
pub fn prune(graph: &Graph, result: &FilterResult) -> Graph {
    let mut pruned = Graph::new();

    // Families first: a family emptied by the individual filter is dropped,
    // and individuals must not keep links to it.
    let mut surviving_families: HashSet<FamilyId> = HashSet::new();
    let mut families = Vec::new();
    for family in graph.families() {
        if !result.contains_family(&family.id) {
            continue;
        }
        let mut kept = family.clone();
        kept.spouses.retain(|id| result.contains(id));
        kept.children.retain(|id| result.contains(id));
        if kept.is_empty() {
            tracing::debug!(id = %kept.id, "dropping emptied family");
            continue;
        }
        surviving_families.insert(kept.id.clone());
        families.push(kept);
    }

    for individual in graph.individuals() {
        if !result.contains(&individual.id) {
            continue;
        }
        let mut kept = individual.clone();
        kept.child_in.retain(|id| surviving_families.contains(id));
        kept.spouse_in.retain(|id| surviving_families.contains(id));
        // Inserting into a fresh graph in source order cannot collide
        pruned
            .insert_individual(kept)
            .expect("source graph has unique individual IDs");
    }

    for family in families {
        pruned
            .insert_family(family)
            .expect("source graph has unique family IDs");
    }

    tracing::info!(
        individuals = pruned.individual_count(),
        families = pruned.family_count(),
        "reconciled subset"
    );
    pruned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::Family;
    use crate::individual::Individual;
    use crate::traversal::{FilterEngine, FilterQuery};
    use crate::xref::IndividualId;

    fn id(s: &str) -> IndividualId {
        IndividualId::new(s)
    }

    fn union(graph: &mut Graph, fam: &str, spouses: &[&str], children: &[&str]) {
        let fam_id = FamilyId::new(fam);
        let mut family = Family::new(fam_id.clone());
        for spouse in spouses {
            family.add_spouse(id(spouse));
        }
        for child in children {
            family.add_child(id(child));
        }
        graph.insert_family(family).unwrap();
        for spouse in spouses {
            if graph.individual(&id(spouse)).is_none() {
                graph.insert_individual(Individual::new(id(spouse))).unwrap();
            }
            graph
                .individual_mut(&id(spouse))
                .unwrap()
                .add_spouse_in(fam_id.clone());
        }
        for child in children {
            if graph.individual(&id(child)).is_none() {
                graph.insert_individual(Individual::new(id(child))).unwrap();
            }
            graph
                .individual_mut(&id(child))
                .unwrap()
                .add_child_in(fam_id.clone());
        }
    }

    /// Symmetry invariant: for every (individual, family) pair in the
    /// pruned graph, the individual references the family iff the family
    /// references the individual.
    fn assert_symmetric(graph: &Graph) {
        for individual in graph.individuals() {
            for fam_id in &individual.child_in {
                let family = graph.family(fam_id).expect("dangling FAMC");
                assert!(
                    family.children.contains(&individual.id),
                    "{} claims child-in {} but is not listed",
                    individual.id,
                    fam_id
                );
            }
            for fam_id in &individual.spouse_in {
                let family = graph.family(fam_id).expect("dangling FAMS");
                assert!(
                    family.spouses.contains(&individual.id),
                    "{} claims spouse-in {} but is not listed",
                    individual.id,
                    fam_id
                );
            }
        }
        for family in graph.families() {
            for spouse in &family.spouses {
                let individual = graph.individual(spouse).expect("dangling HUSB/WIFE");
                assert!(individual.spouse_in.contains(&family.id));
            }
            for child in &family.children {
                let individual = graph.individual(child).expect("dangling CHIL");
                assert!(individual.child_in.contains(&family.id));
            }
        }
    }

    #[test]
    fn test_excluded_child_removed_in_place() {
        // Scenario: a family with two children where one falls outside the
        // generation bounds keeps exactly the survivor, in original
        // relative position.
        let mut graph = Graph::new();
        union(&mut graph, "@F1@", &["@P@"], &["@START@", "@SIB@"]);
        union(&mut graph, "@F2@", &["@SIB@"], &["@NEPHEW@"]);

        let query = FilterQuery::new(id("@START@"))
            .with_ancestor_generations(1)
            .with_descendant_generations(0);
        let result = FilterEngine::run(&graph, &query).unwrap();
        let pruned = prune(&graph, &result);

        let family = pruned.family(&FamilyId::new("@F1@")).unwrap();
        assert_eq!(family.children, vec![id("@START@")]);
        assert!(pruned.individual(&id("@SIB@")).is_none());
        assert_symmetric(&pruned);
    }

    #[test]
    fn test_child_order_is_subsequence_of_original() {
        let mut graph = Graph::new();
        union(
            &mut graph,
            "@F1@",
            &["@P@"],
            &["@SIB1@", "@START@", "@SIB2@", "@SIB3@"],
        );

        let query = FilterQuery::new(id("@START@"))
            .with_ancestor_generations(1)
            .with_descendant_generations(0)
            .with_siblings(true);
        let result = FilterEngine::run(&graph, &query).unwrap();
        let pruned = prune(&graph, &result);

        let family = pruned.family(&FamilyId::new("@F1@")).unwrap();
        assert_eq!(
            family.children,
            vec![id("@SIB1@"), id("@START@"), id("@SIB2@"), id("@SIB3@")]
        );
    }

    #[test]
    fn test_emptied_family_dropped() {
        let mut graph = Graph::new();
        union(&mut graph, "@F1@", &["@P@"], &["@START@"]);
        // An unrelated family that only touches the graph through the
        // parent's other marriage.
        union(&mut graph, "@F2@", &["@P@", "@EX@"], &[]);

        let query = FilterQuery::new(id("@START@"))
            .with_ancestor_generations(1)
            .with_descendant_generations(0);
        let result = FilterEngine::run(&graph, &query).unwrap();
        let pruned = prune(&graph, &result);

        // F2 survives with the parent alone; symmetric either way.
        assert!(pruned.family(&FamilyId::new("@F2@")).is_some());
        assert_symmetric(&pruned);

        // But a family whose every member is excluded disappears even if it
        // was in the initial inclusion set.
        let mut result = result;
        result.individuals.remove(&id("@P@"));
        let pruned = prune(&graph, &result);
        assert!(pruned.family(&FamilyId::new("@F2@")).is_none());
        let start = pruned.individual(&id("@START@")).unwrap();
        let f1 = pruned.family(&FamilyId::new("@F1@")).unwrap();
        assert!(f1.spouses.is_empty());
        assert_eq!(start.child_in, vec![FamilyId::new("@F1@")]);
        assert_symmetric(&pruned);
    }

    #[test]
    fn test_source_graph_untouched() {
        let mut graph = Graph::new();
        union(&mut graph, "@F1@", &["@P@"], &["@START@", "@SIB@"]);

        let query = FilterQuery::new(id("@START@"))
            .with_ancestor_generations(0)
            .with_descendant_generations(0);
        let result = FilterEngine::run(&graph, &query).unwrap();
        let _ = prune(&graph, &result);

        // Repeated exports from the same loaded graph see unaltered data.
        let family = graph.family(&FamilyId::new("@F1@")).unwrap();
        assert_eq!(family.children.len(), 2);
        assert_eq!(family.spouses.len(), 1);
        assert!(graph.individual(&id("@SIB@")).is_some());
    }

    #[test]
    fn test_symmetry_over_full_run() {
        let mut graph = Graph::new();
        union(&mut graph, "@F1@", &["@GP@"], &["@P@", "@UNCLE@"]);
        union(&mut graph, "@F2@", &["@P@", "@M@"], &["@START@", "@SIB@"]);
        union(&mut graph, "@F3@", &["@UNCLE@"], &["@COUSIN@"]);
        union(&mut graph, "@F4@", &["@START@"], &["@CHILD@"]);

        let query = FilterQuery::new(id("@START@"))
            .with_ancestor_generations(1)
            .with_descendant_generations(1)
            .with_partners(true)
            .with_siblings(true);
        let result = FilterEngine::run(&graph, &query).unwrap();
        let pruned = prune(&graph, &result);

        assert_symmetric(&pruned);
        assert!(pruned.individual(&id("@START@")).is_some());
    }
}
