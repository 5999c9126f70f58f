use crate::error::Result;
use crate::vector::TermVector;

/// Weights of the single-positive-example Rocchio update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RocchioWeights {
    /// Pull of the original query.
    pub alpha: f32,
    /// Pull of the relevant document.
    pub beta: f32,
}

impl RocchioWeights {
    pub const ALPHA: f32 = 1.0;
    pub const BETA: f32 = 0.75;
}

impl Default for RocchioWeights {
    fn default() -> Self {
        Self { alpha: Self::ALPHA, beta: Self::BETA }
    }
}

/// `alpha * query + beta * relevant`. No negative term, no renormalization.
///
/// Both vectors must come from the same corpus build; anything else is rejected as stale.
pub fn refine(query: &TermVector, relevant: &TermVector, weights: RocchioWeights) -> Result<TermVector> {
    query.linear_combination(weights.alpha, relevant, weights.beta)
}
