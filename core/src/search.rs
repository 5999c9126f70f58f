use crate::corpus::Corpus;
use crate::error::{MatchError, Result};
use crate::feedback::{refine, RocchioWeights};
use crate::ranker::rank;
use crate::RankedResult;
use serde::Serialize;

/// Rankings for one job description. `refined` is only present when feedback was applied.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub initial: Vec<RankedResult>,
    pub refined: Option<Vec<RankedResult>>,
    pub feedback: Option<String>,
}

/// Rank `corpus` for `query`, refining with the document named `feedback` when it exists.
///
/// A missing or unknown feedback id is the ordinary unrefined path, not an error.
pub fn search(corpus: &Corpus, query: &str, feedback: Option<&str>) -> Result<SearchOutcome> {
    search_with(corpus, query, feedback, RocchioWeights::default())
}

pub fn search_with(corpus: &Corpus, query: &str, feedback: Option<&str>, weights: RocchioWeights) -> Result<SearchOutcome> {
    let q = corpus.transform(query)?;
    let initial = rank(&q, corpus)?;

    let feedback = feedback.map(str::trim).filter(|id| !id.is_empty());
    let relevant = match feedback.map(|id| corpus.document_vector(id)) {
        Some(Ok(v)) => Some(v),
        Some(Err(MatchError::UnknownFeedbackDocument(id))) => {
            tracing::debug!(%id, "feedback document not indexed, skipping refinement");
            None
        }
        Some(Err(e)) => return Err(e),
        None => None,
    };

    match relevant {
        Some(v) => {
            let refined = rank(&refine(&q, v, weights)?, corpus)?;
            Ok(SearchOutcome { initial, refined: Some(refined), feedback: feedback.map(str::to_string) })
        }
        None => Ok(SearchOutcome { initial, refined: None, feedback: None }),
    }
}
