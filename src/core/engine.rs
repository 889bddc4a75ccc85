use chrono::Utc;

use super::types::{CompoundingFrequency, ProjectionResult, YearlyAmount};

/// Largest amount the engine will ever report. Overflowing or otherwise
/// non-finite results are substituted with this value so downstream
/// arithmetic like `final_amount - principal` stays well inside f64 range.
pub const LARGE_CAP: f64 = f64::MAX / 1_000_000.0;

/// Projections never run past this many years, whatever the requested term.
pub const MAX_TERM_YEARS: u32 = 100;

/// Projects `principal` under compound interest for `term_years` years.
///
/// `rate_percent` is an annual percentage (5 means 5%). The function is
/// total: any finite inputs produce a well-formed result with every amount
/// finite and inside `[0, LARGE_CAP]`. Extreme inputs degrade to clamped
/// values rather than failing, since callers always need a displayable
/// number.
pub fn project(
    principal: f64,
    rate_percent: f64,
    term_years: u32,
    frequency: CompoundingFrequency,
) -> ProjectionResult {
    let rate_decimal = rate_percent / 100.0;
    let periods_per_year = frequency.times_per_year();
    let effective_years = term_years.min(MAX_TERM_YEARS);

    let mut yearly_series = Vec::with_capacity(effective_years as usize);
    for year in 1..=effective_years {
        yearly_series.push(YearlyAmount {
            year,
            amount: amount_at_year(principal, rate_decimal, periods_per_year, year),
        });
    }

    // Evaluated once at the full term rather than read back out of the
    // series, so a zero-year term still yields a finite final amount.
    let final_amount = amount_at_year(principal, rate_decimal, periods_per_year, effective_years);
    let total_interest = (final_amount - principal).max(0.0);

    ProjectionResult {
        principal,
        rate_percent,
        term_years: effective_years,
        frequency,
        final_amount,
        total_interest,
        yearly_series,
        computed_at: Utc::now(),
        note: String::new(),
    }
}

/// Projected value at the end of `year`, clamped into `[0, LARGE_CAP]`.
///
/// Uses the compound formula `principal * (1 + r/n)^(n * year)` when the
/// exponent base is meaningful (`n > 0` and a rate above -100%). Otherwise
/// falls back to simple interest `principal * (1 + r * year)`, which keeps
/// the output a usable number instead of NaN when compounding is undefined.
fn amount_at_year(principal: f64, rate_decimal: f64, periods_per_year: u32, year: u32) -> f64 {
    let n = f64::from(periods_per_year);
    let amount = if n > 0.0 && rate_decimal > -1.0 {
        let power = (1.0 + rate_decimal / n).powf(n * f64::from(year));
        if power.is_finite() {
            principal * power
        } else {
            LARGE_CAP
        }
    } else {
        principal * (1.0 + rate_decimal * f64::from(year))
    };

    if !amount.is_finite() {
        return LARGE_CAP;
    }
    amount.clamp(0.0, LARGE_CAP)
}
