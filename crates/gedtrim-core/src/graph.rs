//! Kinship graph: arena storage plus adjacency queries
//!
//! Individuals and families are owned by two flat, insertion-ordered arenas
//! keyed by xref. Every relation (parent, child, partner, sibling) is an
//! index lookup across the two arenas rather than an embedded reference, so
//! there is no cyclic ownership and source-file record order is stable.

use crate::error::{Error, Result};
use crate::family::Family;
use crate::individual::Individual;
use crate::xref::{FamilyId, IndividualId};
use std::collections::HashMap;

/// In-memory graph of all parsed individuals and families
#[derive(Debug, Clone, Default)]
pub struct Graph {
    individuals: Vec<Individual>,
    families: Vec<Family>,
    individual_index: HashMap<IndividualId, usize>,
    family_index: HashMap<FamilyId, usize>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an individual, failing on duplicate xrefs
    pub fn insert_individual(&mut self, individual: Individual) -> Result<()> {
        if self.individual_index.contains_key(&individual.id) {
            return Err(Error::DuplicateId(individual.id.to_string()));
        }
        self.individual_index
            .insert(individual.id.clone(), self.individuals.len());
        self.individuals.push(individual);
        Ok(())
    }

    /// Add a family, failing on duplicate xrefs
    pub fn insert_family(&mut self, family: Family) -> Result<()> {
        if self.family_index.contains_key(&family.id) {
            return Err(Error::DuplicateId(family.id.to_string()));
        }
        self.family_index
            .insert(family.id.clone(), self.families.len());
        self.families.push(family);
        Ok(())
    }

    pub fn individual(&self, id: &IndividualId) -> Option<&Individual> {
        self.individual_index.get(id).map(|&i| &self.individuals[i])
    }

    pub fn individual_mut(&mut self, id: &IndividualId) -> Option<&mut Individual> {
        self.individual_index
            .get(id)
            .copied()
            .map(|i| &mut self.individuals[i])
    }

    pub fn family(&self, id: &FamilyId) -> Option<&Family> {
        self.family_index.get(id).map(|&i| &self.families[i])
    }

    pub fn family_mut(&mut self, id: &FamilyId) -> Option<&mut Family> {
        self.family_index
            .get(id)
            .copied()
            .map(|i| &mut self.families[i])
    }

    /// All individuals in source-file order
    pub fn individuals(&self) -> impl Iterator<Item = &Individual> {
        self.individuals.iter()
    }

    /// All families in source-file order
    pub fn families(&self) -> impl Iterator<Item = &Family> {
        self.families.iter()
    }

    pub fn individual_count(&self) -> usize {
        self.individuals.len()
    }

    pub fn family_count(&self) -> usize {
        self.families.len()
    }

    fn require_individual(&self, id: &IndividualId, referenced_from: &str) -> Result<&Individual> {
        self.individual(id).ok_or_else(|| Error::MalformedReference {
            from: referenced_from.to_string(),
            to: id.to_string(),
        })
    }

    fn require_family(&self, id: &FamilyId, referenced_from: &str) -> Result<&Family> {
        self.family(id).ok_or_else(|| Error::MalformedReference {
            from: referenced_from.to_string(),
            to: id.to_string(),
        })
    }

    /// Parents: spouses of each family this individual is a child in.
    /// Fails fast on references to records absent from the parsed graph.
    pub fn parents_of(&self, id: &IndividualId) -> Result<Vec<IndividualId>> {
        let indi = self.require_individual(id, id.as_str())?;
        let mut parents = Vec::new();
        for fam_id in &indi.child_in {
            let family = self.require_family(fam_id, id.as_str())?;
            for spouse in &family.spouses {
                self.require_individual(spouse, fam_id.as_str())?;
                if !parents.contains(spouse) {
                    parents.push(spouse.clone());
                }
            }
        }
        Ok(parents)
    }

    /// Children: all children of every family this individual is a spouse in
    pub fn children_of(&self, id: &IndividualId) -> Result<Vec<IndividualId>> {
        let indi = self.require_individual(id, id.as_str())?;
        let mut children = Vec::new();
        for fam_id in &indi.spouse_in {
            let family = self.require_family(fam_id, id.as_str())?;
            for child in &family.children {
                self.require_individual(child, fam_id.as_str())?;
                if !children.contains(child) {
                    children.push(child.clone());
                }
            }
        }
        Ok(children)
    }

    /// Partners: co-spouses across this individual's spouse families
    pub fn partners_of(&self, id: &IndividualId) -> Result<Vec<IndividualId>> {
        let indi = self.require_individual(id, id.as_str())?;
        let mut partners = Vec::new();
        for fam_id in &indi.spouse_in {
            let family = self.require_family(fam_id, id.as_str())?;
            for spouse in &family.spouses {
                self.require_individual(spouse, fam_id.as_str())?;
                if spouse != id && !partners.contains(spouse) {
                    partners.push(spouse.clone());
                }
            }
        }
        Ok(partners)
    }

    /// Siblings: co-children across this individual's child families,
    /// excluding the individual itself
    pub fn siblings_of(&self, id: &IndividualId) -> Result<Vec<IndividualId>> {
        let indi = self.require_individual(id, id.as_str())?;
        let mut siblings = Vec::new();
        for fam_id in &indi.child_in {
            let family = self.require_family(fam_id, id.as_str())?;
            for child in &family.children {
                self.require_individual(child, fam_id.as_str())?;
                if child != id && !siblings.contains(child) {
                    siblings.push(child.clone());
                }
            }
        }
        Ok(siblings)
    }

    /// Find individuals by name, exact (case-insensitive) or substring match
    pub fn find_by_name(&self, name: &str, exact: bool) -> Vec<&Individual> {
        let needle = name.trim().to_lowercase();
        self.individuals
            .iter()
            .filter(|indi| {
                indi.name.as_ref().is_some_and(|n| {
                    let haystack = n.to_lowercase();
                    if exact {
                        haystack == needle
                    } else {
                        haystack.contains(&needle)
                    }
                })
            })
            .collect()
    }
}
