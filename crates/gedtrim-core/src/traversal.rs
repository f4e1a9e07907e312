//! Generation-bounded filtering engine
//!
//! Computes, for a starting individual and a set of traversal parameters,
//! the subset of individuals and families that belongs in a filtered
//! export. Pure function of (graph, query): running it twice on the same
//! inputs yields the same sets.

use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::xref::{FamilyId, IndividualId};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet, VecDeque};

/// How far to chase descendants of the start's ancestors
/// (aunts/uncles, cousins and their lines).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WiderDescendants {
    /// Ancestors' wider lines are not followed at all
    #[default]
    None,
    /// Follow ancestors' siblings and their lines, staying strictly above
    /// the start's own generation
    Start,
    /// Follow ancestors' siblings and their lines down to the same depth
    /// the main descendant walk reaches below the start
    Deep,
}

/// Filter query builder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterQuery {
    /// Starting individual xref
    pub start: IndividualId,

    /// Ancestor generations to include (negative = unlimited)
    #[serde(default = "default_generations")]
    pub ancestor_generations: i32,

    /// Descendant generations to include (negative = unlimited)
    #[serde(default = "default_generations")]
    pub descendant_generations: i32,

    /// Wider-descendants mode
    #[serde(default)]
    pub wider_descendants: WiderDescendants,

    /// Include partners of every collected individual
    #[serde(default)]
    pub include_partners: bool,

    /// Include siblings of every collected individual
    #[serde(default)]
    pub include_siblings: bool,
}

fn default_generations() -> i32 {
    2
}

impl FilterQuery {
    /// Create a new query starting from an individual
    pub fn new(start: impl Into<IndividualId>) -> Self {
        Self {
            start: start.into(),
            ancestor_generations: default_generations(),
            descendant_generations: default_generations(),
            wider_descendants: WiderDescendants::default(),
            include_partners: false,
            include_siblings: false,
        }
    }

    /// Set the ancestor generation bound (negative = unlimited)
    pub fn with_ancestor_generations(mut self, generations: i32) -> Self {
        self.ancestor_generations = generations;
        self
    }

    /// Set the descendant generation bound (negative = unlimited)
    pub fn with_descendant_generations(mut self, generations: i32) -> Self {
        self.descendant_generations = generations;
        self
    }

    /// Set the wider-descendants mode
    pub fn with_wider_descendants(mut self, mode: WiderDescendants) -> Self {
        self.wider_descendants = mode;
        self
    }

    /// Also collect partners of every included individual
    pub fn with_partners(mut self, include: bool) -> Self {
        self.include_partners = include;
        self
    }

    /// Also collect siblings of every included individual
    pub fn with_siblings(mut self, include: bool) -> Self {
        self.include_siblings = include;
        self
    }
}

/// Why an individual made it into the inclusion set
///
/// Primary walks outrank the supplementary passes; the ordering matters
/// only for diagnostic metadata, never for set membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InclusionReason {
    Start,
    Ancestor,
    Descendant,
    #[serde(rename = "wider")]
    WiderDescendant,
    Partner,
    Sibling,
}

impl InclusionReason {
    /// Precedence when an individual is reachable via multiple paths
    fn primacy(self) -> u8 {
        match self {
            Self::Start => 3,
            Self::Ancestor | Self::Descendant => 2,
            Self::WiderDescendant => 1,
            Self::Partner | Self::Sibling => 0,
        }
    }
}

/// Per-individual traversal metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inclusion {
    /// Signed generation offset from the start
    /// (negative = ancestor, positive = descendant)
    pub generation: i32,
    pub reason: InclusionReason,
}

/// Summary counters for a filter run
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FilterStats {
    pub individuals: usize,
    pub families: usize,
    pub earliest_generation: i32,
    pub latest_generation: i32,
    /// True when only the start survived with no families: a valid but
    /// reportable degenerate result
    pub degenerate: bool,
}

/// The inclusion sets computed by a filter run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterResult {
    pub individuals: HashMap<IndividualId, Inclusion>,
    pub families: HashSet<FamilyId>,
    pub stats: FilterStats,
}

impl FilterResult {
    pub fn contains(&self, id: &IndividualId) -> bool {
        self.individuals.contains_key(id)
    }

    pub fn contains_family(&self, id: &FamilyId) -> bool {
        self.families.contains(id)
    }
}

/// The relationship filtering engine
pub struct FilterEngine;

impl FilterEngine {
    /// Compute the inclusion set for a query.
    ///
    /// Fails with [`Error::UnknownStart`] before any traversal work if the
    /// starting individual does not exist, and propagates
    /// [`Error::MalformedReference`] from adjacency lookups. Cycles in the
    /// source data are tolerated silently: each pass keeps its own visited
    /// set and never re-expands a node.
    pub fn run(graph: &Graph, query: &FilterQuery) -> Result<FilterResult> {
        if graph.individual(&query.start).is_none() {
            return Err(Error::UnknownStart(query.start.to_string()));
        }

        tracing::debug!(
            start = %query.start,
            ancestors = query.ancestor_generations,
            descendants = query.descendant_generations,
            wider = ?query.wider_descendants,
            partners = query.include_partners,
            siblings = query.include_siblings,
            "running filter"
        );

        let mut included: HashMap<IndividualId, Inclusion> = HashMap::new();
        include(
            &mut included,
            query.start.clone(),
            0,
            InclusionReason::Start,
        );

        let ancestors = Self::ancestor_pass(graph, query, &mut included)?;
        Self::descendant_pass(graph, query, &mut included)?;
        Self::wider_pass(graph, query, &ancestors, &mut included)?;
        if query.include_partners {
            Self::partner_pass(graph, &mut included)?;
        }
        if query.include_siblings {
            Self::sibling_pass(graph, &mut included)?;
        }

        let families = Self::derive_families(graph, &included);

        let earliest = included.values().map(|i| i.generation).min().unwrap_or(0);
        let latest = included.values().map(|i| i.generation).max().unwrap_or(0);
        let stats = FilterStats {
            individuals: included.len(),
            families: families.len(),
            earliest_generation: earliest,
            latest_generation: latest,
            degenerate: included.len() == 1 && families.is_empty(),
        };

        tracing::info!(
            individuals = stats.individuals,
            families = stats.families,
            earliest = stats.earliest_generation,
            latest = stats.latest_generation,
            "filter complete"
        );

        Ok(FilterResult {
            individuals: included,
            families,
            stats,
        })
    }

    /// Walk `parents_of` from the start, bounded by `ancestor_generations`.
    /// Returns every collected ancestor with its generation; this set
    /// anchors the wider-descendants pass.
    fn ancestor_pass(
        graph: &Graph,
        query: &FilterQuery,
        included: &mut HashMap<IndividualId, Inclusion>,
    ) -> Result<Vec<(IndividualId, i32)>> {
        let limit = query.ancestor_generations;
        let mut ancestors = Vec::new();
        let mut visited: HashSet<IndividualId> = HashSet::new();
        visited.insert(query.start.clone());
        let mut queue: VecDeque<(IndividualId, i32)> = VecDeque::new();
        queue.push_back((query.start.clone(), 0));

        while let Some((current, generation)) = queue.pop_front() {
            // Parents would sit at depth 1 - generation; respect the bound
            if limit >= 0 && (1 - generation) > limit {
                continue;
            }
            for parent in graph.parents_of(&current)? {
                if visited.insert(parent.clone()) {
                    tracing::debug!(gen = generation - 1, id = %parent, "collecting ancestor");
                    include(
                        included,
                        parent.clone(),
                        generation - 1,
                        InclusionReason::Ancestor,
                    );
                    ancestors.push((parent.clone(), generation - 1));
                    queue.push_back((parent, generation - 1));
                }
            }
        }
        Ok(ancestors)
    }

    /// Walk `children_of` from the start, bounded by `descendant_generations`
    fn descendant_pass(
        graph: &Graph,
        query: &FilterQuery,
        included: &mut HashMap<IndividualId, Inclusion>,
    ) -> Result<()> {
        let floor = (query.descendant_generations >= 0).then_some(query.descendant_generations);
        Self::descend(
            graph,
            vec![(query.start.clone(), 0)],
            floor,
            InclusionReason::Descendant,
            included,
        )
    }

    /// Chase the wider family: each ancestor's siblings and the lines below
    /// them. `Start` mode stays strictly above the start's generation;
    /// `Deep` mode descends as far as the main descendant walk does.
    fn wider_pass(
        graph: &Graph,
        query: &FilterQuery,
        ancestors: &[(IndividualId, i32)],
        included: &mut HashMap<IndividualId, Inclusion>,
    ) -> Result<()> {
        let floor = match query.wider_descendants {
            WiderDescendants::None => return Ok(()),
            WiderDescendants::Start => Some(-1),
            WiderDescendants::Deep => {
                (query.descendant_generations >= 0).then_some(query.descendant_generations)
            }
        };

        let mut seeds: Vec<(IndividualId, i32)> = Vec::new();
        for (ancestor, generation) in ancestors {
            seeds.push((ancestor.clone(), *generation));
            for sibling in graph.siblings_of(ancestor)? {
                tracing::debug!(gen = generation, id = %sibling, "collecting wider relative");
                include(
                    included,
                    sibling.clone(),
                    *generation,
                    InclusionReason::WiderDescendant,
                );
                seeds.push((sibling, *generation));
            }
        }

        Self::descend(
            graph,
            seeds,
            floor,
            InclusionReason::WiderDescendant,
            included,
        )
    }

    /// Shared generation-indexed BFS over `children_of`.
    ///
    /// `floor` is the deepest generation a collected node may occupy
    /// (None = unlimited). The walk expands through already-included nodes
    /// but keeps a per-pass visited set, so cyclic data terminates.
    fn descend(
        graph: &Graph,
        seeds: Vec<(IndividualId, i32)>,
        floor: Option<i32>,
        reason: InclusionReason,
        included: &mut HashMap<IndividualId, Inclusion>,
    ) -> Result<()> {
        let mut visited: HashSet<IndividualId> =
            seeds.iter().map(|(id, _)| id.clone()).collect();
        let mut queue: VecDeque<(IndividualId, i32)> = seeds.into();

        while let Some((current, generation)) = queue.pop_front() {
            if floor.is_some_and(|f| generation >= f) {
                continue;
            }
            for child in graph.children_of(&current)? {
                if visited.insert(child.clone()) {
                    tracing::debug!(gen = generation + 1, id = %child, "collecting {:?}", reason);
                    include(included, child.clone(), generation + 1, reason);
                    queue.push_back((child, generation + 1));
                }
            }
        }
        Ok(())
    }

    /// Add partners of everything collected so far; one hop, no expansion
    fn partner_pass(
        graph: &Graph,
        included: &mut HashMap<IndividualId, Inclusion>,
    ) -> Result<()> {
        let snapshot: Vec<(IndividualId, i32)> = included
            .iter()
            .map(|(id, inc)| (id.clone(), inc.generation))
            .collect();
        for (id, generation) in snapshot {
            for partner in graph.partners_of(&id)? {
                tracing::debug!(gen = generation, id = %partner, "collecting partner");
                include(included, partner, generation, InclusionReason::Partner);
            }
        }
        Ok(())
    }

    /// Add siblings of everything collected so far; one hop, no expansion
    fn sibling_pass(
        graph: &Graph,
        included: &mut HashMap<IndividualId, Inclusion>,
    ) -> Result<()> {
        let snapshot: Vec<(IndividualId, i32)> = included
            .iter()
            .map(|(id, inc)| (id.clone(), inc.generation))
            .collect();
        for (id, generation) in snapshot {
            for sibling in graph.siblings_of(&id)? {
                tracing::debug!(gen = generation, id = %sibling, "collecting sibling");
                include(included, sibling, generation, InclusionReason::Sibling);
            }
        }
        Ok(())
    }

    /// A family is included iff at least one of its spouses or children is.
    /// This direction only flows individual -> family; family membership
    /// never pulls in new individuals.
    fn derive_families(
        graph: &Graph,
        included: &HashMap<IndividualId, Inclusion>,
    ) -> HashSet<FamilyId> {
        graph
            .families()
            .filter(|family| {
                family
                    .spouses
                    .iter()
                    .chain(family.children.iter())
                    .any(|id| included.contains_key(id))
            })
            .map(|family| family.id.clone())
            .collect()
    }
}

/// Insert or upgrade an inclusion record. Membership is never revoked;
/// metadata is overwritten only by a more primary reason.
fn include(
    map: &mut HashMap<IndividualId, Inclusion>,
    id: IndividualId,
    generation: i32,
    reason: InclusionReason,
) {
    match map.entry(id) {
        Entry::Vacant(entry) => {
            entry.insert(Inclusion { generation, reason });
        }
        Entry::Occupied(mut entry) => {
            if reason.primacy() > entry.get().reason.primacy() {
                entry.insert(Inclusion { generation, reason });
            }
        }
    }
}
