//! Domain models for the AF cohort
//!
//! This module contains the clinical record entities: diseases and disease
//! groups, diagnosis episodes, medications, patients and their derived risk
//! score timelines.

pub mod diagnosis;
pub mod disease;
pub mod medication;
pub mod patient;
pub mod timeline;

// Re-export commonly used types
pub use diagnosis::{Diagnosis, DiagnosisHistory};
pub use disease::{Disease, DiseaseGroup};
pub use medication::Medication;
pub use patient::{CareRange, Patient, PatientId};
pub use timeline::{ChadsVascChangeEvent, ChangeTimeline};
