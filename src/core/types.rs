use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How often interest is credited back into the principal.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompoundingFrequency {
    Annual,
    Quarterly,
    Monthly,
    Daily,
}

impl CompoundingFrequency {
    pub fn times_per_year(self) -> u32 {
        match self {
            CompoundingFrequency::Annual => 1,
            CompoundingFrequency::Quarterly => 4,
            CompoundingFrequency::Monthly => 12,
            CompoundingFrequency::Daily => 365,
        }
    }
}

/// Projected account value at the end of a given year.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyAmount {
    pub year: u32,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub principal: f64,
    pub rate_percent: f64,
    /// Term actually projected, after the 100-year cap.
    pub term_years: u32,
    pub frequency: CompoundingFrequency,
    pub final_amount: f64,
    pub total_interest: f64,
    /// One entry per projected year, ascending from year 1.
    pub yearly_series: Vec<YearlyAmount>,
    pub computed_at: DateTime<Utc>,
    /// Free-form annotation, filled in by the caller after the fact.
    pub note: String,
}
