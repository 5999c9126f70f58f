use serde::{Deserialize, Serialize};

pub mod corpus;
pub mod error;
pub mod feedback;
pub mod ingest;
pub mod ranker;
pub mod search;
pub mod shared;
pub mod tokenizer;
pub mod vector;

pub use corpus::Corpus;
pub use error::MatchError;
pub use feedback::{refine, RocchioWeights};
pub use ranker::rank;
pub use search::{search, SearchOutcome};
pub use shared::SharedCorpus;
pub use vector::TermVector;

pub type TermId = u32;
/// Position of a document in its corpus. Only meaningful for the corpus that assigned it.
pub type DocIndex = usize;

/// A document as handed over by ingestion, before decoding and normalization.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub id: String,
    pub bytes: Vec<u8>,
}

impl RawDocument {
    pub fn new(id: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { id: id.into(), bytes }
    }

    pub fn text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), bytes: text.into().into_bytes() }
    }
}

/// An indexed document. Immutable once it belongs to a corpus.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub text: String,
    pub normalized: String,
}

#[derive(Debug, Clone)]
pub struct Posting {
    pub doc: DocIndex,
    pub weight: f32, // l2-normalized tf-idf weight
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub score: f32,
    pub document_id: String,
}
