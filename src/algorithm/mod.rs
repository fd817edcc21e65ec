//! Algorithms over the clinical record model
//!
//! This module contains interval merging, the CHA2DS2-VASc risk score,
//! the anticoagulation decision policies and the cohort simulation.

pub mod chads_vasc;
pub mod decision;
pub mod merging;
pub mod simulation;
