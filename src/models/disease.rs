//! Disease identity and disease groups
//!
//! A disease is identified by the specialty that registered it and the
//! specialty-local diagnosis code. The description is metadata only.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A disease as coded by a medical specialty
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Disease {
    /// Specialty code (e.g. `CAR` for cardiology)
    pub specialty: String,
    /// Diagnosis code within the specialty
    pub code: String,
    /// Human-readable description, not part of the identity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Disease {
    /// Create a new disease without description
    pub fn new(specialty: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            specialty: specialty.into(),
            code: code.into(),
            description: None,
        }
    }

    /// Attach a description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check whether this disease was registered by a specialty
    #[must_use]
    pub fn is_from_specialty(&self, specialty: &str) -> bool {
        self.specialty.eq_ignore_ascii_case(specialty)
    }
}

impl PartialEq for Disease {
    fn eq(&self, other: &Self) -> bool {
        self.specialty == other.specialty && self.code == other.code
    }
}

impl Eq for Disease {}

impl Hash for Disease {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.specialty.hash(state);
        self.code.hash(state);
    }
}

impl PartialOrd for Disease {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Disease {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (&self.specialty, &self.code).cmp(&(&other.specialty, &other.code))
    }
}

impl fmt::Display for Disease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.specialty, self.code)
    }
}

/// A named, ordered set of diseases
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseaseGroup {
    /// Name of the group
    pub name: String,
    /// Member diseases in catalog order
    pub diseases: Vec<Disease>,
}

impl DiseaseGroup {
    /// Create a group from a list of diseases, dropping repeated members
    pub fn new(name: impl Into<String>, diseases: Vec<Disease>) -> Self {
        let mut unique: Vec<Disease> = Vec::with_capacity(diseases.len());
        for disease in diseases {
            if !unique.contains(&disease) {
                unique.push(disease);
            }
        }

        Self {
            name: name.into(),
            diseases: unique,
        }
    }

    /// Check group membership by disease identity
    #[must_use]
    pub fn contains(&self, disease: &Disease) -> bool {
        self.diseases.contains(disease)
    }

    /// Iterate over the member diseases
    pub fn iter(&self) -> std::slice::Iter<'_, Disease> {
        self.diseases.iter()
    }

    /// Number of member diseases
    #[must_use]
    pub fn len(&self) -> usize {
        self.diseases.len()
    }

    /// Whether the group has no members
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diseases.is_empty()
    }
}

impl<'a> IntoIterator for &'a DiseaseGroup {
    type Item = &'a Disease;
    type IntoIter = std::slice::Iter<'a, Disease>;

    fn into_iter(self) -> Self::IntoIter {
        self.diseases.iter()
    }
}
