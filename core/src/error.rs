use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MatchError {
    /// Nothing has been indexed yet; search is unavailable rather than broken.
    #[error("search unavailable: no documents have been indexed")]
    EmptyCorpus,

    #[error("feedback document not in current corpus: {0}")]
    UnknownFeedbackDocument(String),

    #[error("malformed document {id}: {reason}")]
    MalformedDocument { id: String, reason: String },

    /// A vector from one vector space was combined with another. Always a programming error.
    #[error("stale vector: built for generation {found_generation} ({found_dim} terms), corpus is generation {expected_generation} ({expected_dim} terms)")]
    StaleVectorMismatch {
        expected_generation: u64,
        expected_dim: usize,
        found_generation: u64,
        found_dim: usize,
    },
}

pub type Result<T> = std::result::Result<T, MatchError>;
