//! Common types used across poly-* crates

pub mod common;
pub mod period;

pub use common::{ApiLimit, SortOrder};
pub use period::{Period, PeriodBasis};
