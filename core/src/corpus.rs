//! Corpus index: vocabulary, smoothed idf weights and the document matrix.
//!
//! A corpus is built in one go from the complete document set and never mutated afterwards.
//! Adding or removing a document means building a new corpus.

use crate::error::{MatchError, Result};
use crate::tokenizer::normalize;
use crate::vector::TermVector;
use crate::{DocIndex, Document, Posting, RawDocument, TermId};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Terms shorter than this never enter the vocabulary.
const MIN_TERM_CHARS: usize = 2;

pub struct Corpus {
    generation: u64,
    documents: Vec<Document>,
    positions: HashMap<String, DocIndex>,
    space: Option<VectorSpace>,
    skipped: Vec<MatchError>,
}

/// Fitted model. Row `i` of `rows` always belongs to `documents[i]`.
struct VectorSpace {
    dictionary: HashMap<String, TermId>,
    idf: Vec<f32>,
    rows: Vec<TermVector>,
    row_norms: Vec<f32>,
    postings: Vec<Vec<Posting>>, // indexed by term id, sorted by doc
}

impl Corpus {
    /// Empty, unindexed corpus. Search is unavailable until a build with documents.
    pub fn unindexed() -> Self {
        Self {
            generation: 0,
            documents: Vec::new(),
            positions: HashMap::new(),
            space: None,
            skipped: Vec::new(),
        }
    }

    /// Normalize every document and fit the vector space from scratch.
    ///
    /// Documents that cannot be decoded, or whose id was already taken earlier in the input, are
    /// skipped and reported through [`Corpus::skipped`]. No surviving documents leaves the corpus
    /// unindexed.
    pub fn build<I>(input: I) -> Corpus
    where
        I: IntoIterator<Item = RawDocument>,
    {
        let mut documents: Vec<Document> = Vec::new();
        let mut positions: HashMap<String, DocIndex> = HashMap::new();
        let mut skipped = Vec::new();

        for raw in input {
            if positions.contains_key(&raw.id) {
                tracing::warn!(id = %raw.id, "duplicate document id, keeping the first");
                skipped.push(MatchError::MalformedDocument { id: raw.id, reason: "duplicate id".into() });
                continue;
            }
            let text = match String::from_utf8(raw.bytes) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(id = %raw.id, error = %e, "skipping undecodable document");
                    skipped.push(MatchError::MalformedDocument { id: raw.id, reason: e.to_string() });
                    continue;
                }
            };
            let normalized = normalize(&text);
            positions.insert(raw.id.clone(), documents.len());
            documents.push(Document { id: raw.id, text, normalized });
        }

        if documents.is_empty() {
            tracing::warn!(skipped = skipped.len(), "no documents to index, search unavailable");
            return Corpus { skipped, ..Corpus::unindexed() };
        }

        let generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
        let space = VectorSpace::fit(generation, &documents);
        tracing::info!(
            generation,
            num_docs = documents.len(),
            num_terms = space.dictionary.len(),
            skipped = skipped.len(),
            "corpus indexed"
        );
        Corpus { generation, documents, positions, space: Some(space), skipped }
    }

    pub fn is_indexed(&self) -> bool { self.space.is_some() }

    pub fn generation(&self) -> u64 { self.generation }

    pub fn len(&self) -> usize { self.documents.len() }

    pub fn is_empty(&self) -> bool { self.documents.is_empty() }

    pub fn documents(&self) -> &[Document] { &self.documents }

    pub fn skipped(&self) -> &[MatchError] { &self.skipped }

    pub fn vocabulary_size(&self) -> usize {
        self.space.as_ref().map_or(0, |s| s.dictionary.len())
    }

    pub fn position(&self, id: &str) -> Option<DocIndex> { self.positions.get(id).copied() }

    pub fn term_id(&self, term: &str) -> Option<TermId> {
        self.space.as_ref()?.dictionary.get(term).copied()
    }

    pub fn idf(&self, term: TermId) -> Option<f32> {
        self.space.as_ref()?.idf.get(term as usize).copied()
    }

    /// Project `text` into the fitted vocabulary. Unknown terms are dropped.
    pub fn transform(&self, text: &str) -> Result<TermVector> {
        let space = self.space.as_ref().ok_or(MatchError::EmptyCorpus)?;
        Ok(space.vectorize(self.generation, &normalize(text)))
    }

    /// Matrix row of the document called `id`.
    pub fn document_vector(&self, id: &str) -> Result<&TermVector> {
        let space = self.space.as_ref().ok_or(MatchError::EmptyCorpus)?;
        let pos = self.position(id).ok_or_else(|| MatchError::UnknownFeedbackDocument(id.to_string()))?;
        Ok(&space.rows[pos])
    }

    pub(crate) fn rows(&self) -> Result<(&[TermVector], &[f32])> {
        let space = self.space.as_ref().ok_or(MatchError::EmptyCorpus)?;
        Ok((&space.rows, &space.row_norms))
    }

    pub(crate) fn postings(&self, term: TermId) -> &[Posting] {
        self.space
            .as_ref()
            .and_then(|s| s.postings.get(term as usize))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Fails unless `v` was produced against this corpus.
    pub fn check_vector(&self, v: &TermVector) -> Result<()> {
        if !self.is_indexed() { return Err(MatchError::EmptyCorpus); }
        v.ensure_space(self.generation, self.vocabulary_size())
    }
}

fn analyzed_terms(normalized: &str) -> impl Iterator<Item = &str> {
    normalized.split(' ').filter(|t| t.chars().count() >= MIN_TERM_CHARS)
}

impl VectorSpace {
    fn fit(generation: u64, documents: &[Document]) -> Self {
        // Lexicographic term ids.
        let terms: BTreeSet<&str> = documents.iter().flat_map(|d| analyzed_terms(&d.normalized)).collect();
        let dictionary: HashMap<String, TermId> = terms
            .into_iter()
            .enumerate()
            .map(|(i, t)| (t.to_string(), i as TermId))
            .collect();

        let counts: Vec<HashMap<TermId, u32>> = documents
            .iter()
            .map(|d| term_counts(&dictionary, &d.normalized))
            .collect();

        let mut df = vec![0u32; dictionary.len()];
        for doc_counts in &counts {
            for tid in doc_counts.keys() { df[*tid as usize] += 1; }
        }
        let n = documents.len() as f32;
        let idf: Vec<f32> = df
            .iter()
            .map(|&df_t| ((1.0 + n) / (1.0 + df_t as f32)).ln() + 1.0)
            .collect();

        let dim = dictionary.len();
        let rows: Vec<TermVector> = counts
            .iter()
            .map(|c| weigh(generation, dim, &idf, c))
            .collect();
        let row_norms = rows.iter().map(TermVector::norm).collect();

        let mut postings: Vec<Vec<Posting>> = vec![Vec::new(); dim];
        for (doc, row) in rows.iter().enumerate() {
            for &(tid, weight) in row.entries() {
                postings[tid as usize].push(Posting { doc, weight });
            }
        }

        Self { dictionary, idf, rows, row_norms, postings }
    }

    fn vectorize(&self, generation: u64, normalized: &str) -> TermVector {
        let counts = term_counts(&self.dictionary, normalized);
        weigh(generation, self.dictionary.len(), &self.idf, &counts)
    }
}

fn term_counts(dictionary: &HashMap<String, TermId>, normalized: &str) -> HashMap<TermId, u32> {
    let mut counts = HashMap::new();
    for term in analyzed_terms(normalized) {
        if let Some(&tid) = dictionary.get(term) {
            *counts.entry(tid).or_insert(0) += 1;
        }
    }
    counts
}

fn weigh(generation: u64, dim: usize, idf: &[f32], counts: &HashMap<TermId, u32>) -> TermVector {
    let mut entries: Vec<(TermId, f32)> = counts
        .iter()
        .map(|(&tid, &tf)| (tid, tf as f32 * idf[tid as usize]))
        .collect();
    entries.sort_by_key(|(tid, _)| *tid);
    TermVector::from_sorted(generation, dim, entries).l2_normalized()
}
