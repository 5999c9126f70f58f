use crate::corpus::Corpus;
use crate::error::Result;
use crate::search::{search, SearchOutcome};
use crate::RawDocument;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// Process-wide corpus handle.
///
/// Readers take an `Arc` snapshot and work against it for the whole request. Rebuilds run
/// outside the read lock, one at a time, and publish by swapping the pointer, so no reader ever
/// sees a half-built matrix.
pub struct SharedCorpus {
    current: RwLock<Arc<Corpus>>,
    build_guard: Mutex<()>,
}

impl Default for SharedCorpus {
    fn default() -> Self { Self::new() }
}

impl SharedCorpus {
    pub fn new() -> Self {
        Self::from_corpus(Corpus::unindexed())
    }

    pub fn from_corpus(corpus: Corpus) -> Self {
        Self { current: RwLock::new(Arc::new(corpus)), build_guard: Mutex::new(()) }
    }

    pub fn snapshot(&self) -> Arc<Corpus> {
        self.current.read().clone()
    }

    /// Build a fresh corpus over the complete document set and make it current.
    pub fn rebuild<I>(&self, documents: I) -> Arc<Corpus>
    where
        I: IntoIterator<Item = RawDocument>,
    {
        let _guard = self.build_guard.lock();
        let corpus = Arc::new(Corpus::build(documents));
        let previous = std::mem::replace(&mut *self.current.write(), corpus.clone());
        tracing::info!(
            from_generation = previous.generation(),
            to_generation = corpus.generation(),
            num_docs = corpus.len(),
            "corpus swapped"
        );
        corpus
    }

    pub fn search(&self, query: &str, feedback: Option<&str>) -> Result<SearchOutcome> {
        search(&self.snapshot(), query, feedback)
    }
}
