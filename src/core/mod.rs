mod engine;
mod types;

pub use engine::{LARGE_CAP, MAX_TERM_YEARS, project};
pub use types::{CompoundingFrequency, ProjectionResult, YearlyAmount};
