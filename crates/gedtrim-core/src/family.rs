//! Family (union) record type

use crate::individual::PayloadLine;
use crate::xref::{FamilyId, IndividualId};
use serde::{Deserialize, Serialize};

/// A family in the kinship graph
///
/// Spouses are semantically two roles (HUSB/WIFE) but are represented as a
/// uniform ordered list; multiple-marriage records can carry more than two.
/// Child order is birth order and must survive pruning and re-emission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Family {
    /// GEDCOM xref, unique within the file
    pub id: FamilyId,

    /// Spouse/partner xrefs in record order (0-2 typically)
    pub spouses: Vec<IndividualId>,

    /// Child xrefs in record order (birth order)
    pub children: Vec<IndividualId>,

    /// Opaque event payload (MARR etc.), re-emitted verbatim
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub payload: Vec<PayloadLine>,
}

impl Family {
    /// Create a new family with the given xref
    pub fn new(id: impl Into<FamilyId>) -> Self {
        Self {
            id: id.into(),
            spouses: Vec::new(),
            children: Vec::new(),
            payload: Vec::new(),
        }
    }

    pub fn add_spouse(&mut self, spouse: IndividualId) {
        if !self.spouses.contains(&spouse) {
            self.spouses.push(spouse);
        }
    }

    pub fn add_child(&mut self, child: IndividualId) {
        if !self.children.contains(&child) {
            self.children.push(child);
        }
    }

    /// A family with neither spouses nor children serializes as a dangling,
    /// meaningless record and is dropped by the reconciler.
    pub fn is_empty(&self) -> bool {
        self.spouses.is_empty() && self.children.is_empty()
    }
}
