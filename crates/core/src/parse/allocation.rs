use crate::domain::recommendation::StockRecommendation;
use crate::domain::warning::{ClearReason, ParseWarning};

/// Sums within this distance of 100 are accepted as written.
pub const EXACT_TOLERANCE: f64 = 0.1;
/// Sums within this distance of 100 are rescaled; anything further is discarded.
pub const RESCALE_TOLERANCE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AllocationOutcome {
    Empty,
    Unchanged,
    Rescaled { original_sum: f64 },
    Cleared(ClearReason),
}

impl AllocationOutcome {
    pub fn warning(self) -> Option<ParseWarning> {
        match self {
            Self::Empty | Self::Unchanged => None,
            Self::Rescaled { original_sum } => Some(ParseWarning::AllocationsRescaled { original_sum }),
            Self::Cleared(reason) => Some(ParseWarning::AllocationsCleared { reason }),
        }
    }
}

fn round_one_decimal(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// One-decimal rounding of many small shares can push the total past the
/// exact tolerance again; the largest holding absorbs the difference.
fn absorb_rounding_residual(recs: &mut [StockRecommendation]) {
    let total: f64 = recs.iter().filter_map(|r| r.allocation_percentage).sum();
    let residual = round_one_decimal(100.0 - total);
    if residual.abs() <= EXACT_TOLERANCE + 1e-9 {
        return;
    }

    let largest = recs.iter_mut().max_by(|a, b| {
        let a = a.allocation_percentage.unwrap_or_default();
        let b = b.allocation_percentage.unwrap_or_default();
        a.total_cmp(&b)
    });
    if let Some(rec) = largest {
        rec.allocation_percentage = rec
            .allocation_percentage
            .map(|p| round_one_decimal((p + residual).max(0.0)));
    }
}

fn clear_all(recs: &mut [StockRecommendation]) {
    for rec in recs.iter_mut() {
        rec.allocation_percentage = None;
    }
}

/// Makes a batch's allocation percentages consistent.
///
/// After this returns, either every recommendation carries an allocation and
/// the batch sums to 100 (up to one-decimal rounding), or none does and
/// callers fall back to an equal split.
pub fn reconcile_allocations(recs: &mut [StockRecommendation]) -> AllocationOutcome {
    if recs.is_empty() {
        return AllocationOutcome::Empty;
    }

    let all_defined = recs.iter().all(|r| {
        r.allocation_percentage
            .is_some_and(|p| p.is_finite() && p >= 0.0)
    });
    if !all_defined {
        tracing::warn!(
            count = recs.len(),
            "not every recommendation has a valid allocation; clearing allocations"
        );
        clear_all(recs);
        return AllocationOutcome::Cleared(ClearReason::Incomplete);
    }

    let sum: f64 = recs.iter().filter_map(|r| r.allocation_percentage).sum();
    let drift = (sum - 100.0).abs();

    if drift > RESCALE_TOLERANCE {
        tracing::warn!(
            sum,
            "allocation total is far from 100%; clearing allocations"
        );
        clear_all(recs);
        return AllocationOutcome::Cleared(ClearReason::OutOfTolerance { sum });
    }

    if drift > EXACT_TOLERANCE {
        tracing::warn!(sum, "normalizing allocation percentages to 100%");
        let factor = 100.0 / sum;
        for rec in recs.iter_mut() {
            rec.allocation_percentage = rec
                .allocation_percentage
                .map(|p| round_one_decimal(p * factor));
        }
        absorb_rounding_residual(recs);
        return AllocationOutcome::Rescaled { original_sum: sum };
    }

    AllocationOutcome::Unchanged
}
