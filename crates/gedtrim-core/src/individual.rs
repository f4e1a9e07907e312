//! Individual (person) record type

use crate::xref::{FamilyId, IndividualId};
use serde::{Deserialize, Serialize};

/// A raw GEDCOM sub-record line carried through unchanged.
///
/// Events, notes and sources are opaque to the traversal engine; they are
/// kept only so the writer can re-emit them verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadLine {
    pub level: u8,
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl PayloadLine {
    pub fn new(level: u8, tag: impl Into<String>, value: Option<String>) -> Self {
        Self {
            level,
            tag: tag.into(),
            value,
        }
    }
}

/// An individual in the kinship graph
///
/// Created once during parsing and never deleted; exclusion from an export
/// is represented by absence from the inclusion set. Membership lists are
/// shrunk only by the reconciler, on a working copy of the graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Individual {
    /// GEDCOM xref, unique within the file
    pub id: IndividualId,

    /// Full name from the first NAME record, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// SEX value (M/F/U), if recorded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex: Option<char>,

    /// Families this individual is a child in (FAMC).
    /// Normally 0 or 1, but multiple are tolerated (e.g. adoption).
    pub child_in: Vec<FamilyId>,

    /// Families this individual is a spouse/partner in (FAMS)
    pub spouse_in: Vec<FamilyId>,

    /// Photo file paths referenced by the record
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photos: Vec<String>,

    /// Preferred photo, if one was marked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_photo: Option<String>,

    /// Opaque event/attribute payload, re-emitted verbatim
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub payload: Vec<PayloadLine>,
}

impl Individual {
    /// Create a new individual with the given xref
    pub fn new(id: impl Into<IndividualId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            sex: None,
            child_in: Vec::new(),
            spouse_in: Vec::new(),
            photos: Vec::new(),
            primary_photo: None,
            payload: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Record membership as a child in a family (FAMC)
    pub fn add_child_in(&mut self, family: FamilyId) {
        if !self.child_in.contains(&family) {
            self.child_in.push(family);
        }
    }

    /// Record membership as a spouse in a family (FAMS)
    pub fn add_spouse_in(&mut self, family: FamilyId) {
        if !self.spouse_in.contains(&family) {
            self.spouse_in.push(family);
        }
    }

    /// Best photo to export: the marked primary, else the first found
    pub fn best_photo(&self) -> Option<&str> {
        self.primary_photo
            .as_deref()
            .or_else(|| self.photos.first().map(String::as_str))
    }

    /// Display name, falling back to the xref for unnamed records
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.id.as_str())
    }
}
