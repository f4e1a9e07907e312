//! Gedtrim Core - Kinship graph engine for GEDCOM filtering
//!
//! This crate provides the in-memory graph model of a parsed GEDCOM file,
//! the generation-bounded traversal engine that decides which individuals
//! and families belong in a filtered export, and the reference reconciler
//! that keeps the pruned subset internally consistent.

pub mod error;
pub mod family;
pub mod graph;
pub mod individual;
pub mod prune;
pub mod traversal;
pub mod xref;

pub use error::{Error, Result};
pub use family::Family;
pub use graph::Graph;
pub use individual::{Individual, PayloadLine};
pub use prune::prune;
pub use traversal::{
    FilterEngine, FilterQuery, FilterResult, FilterStats, Inclusion, InclusionReason,
    WiderDescendants,
};
pub use xref::{FamilyId, IndividualId};
