//! Shared helpers

pub mod dates;

pub use dates::{add_months, add_months_saturating, add_years, days_between};
