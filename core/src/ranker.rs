use crate::corpus::Corpus;
use crate::error::Result;
use crate::vector::{cosine_from_parts, TermVector};
use crate::RankedResult;

/// Score every document of `corpus` against `query` by cosine similarity.
///
/// All documents come back, highest score first. Equal scores keep corpus order.
pub fn rank(query: &TermVector, corpus: &Corpus) -> Result<Vec<RankedResult>> {
    corpus.check_vector(query)?;
    let (_, row_norms) = corpus.rows()?;

    // Aggregate dot products from postings; documents sharing no term stay at zero.
    let mut dots = vec![0.0f32; corpus.len()];
    for &(tid, q_w) in query.entries() {
        for p in corpus.postings(tid) {
            dots[p.doc] += p.weight * q_w;
        }
    }

    let q_norm = query.norm();
    let mut scored: Vec<(usize, f32)> = dots
        .into_iter()
        .enumerate()
        .map(|(i, dot)| (i, cosine_from_parts(dot, q_norm, row_norms[i])))
        .collect();
    // sort_by is stable, so ties stay in insertion order
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    let docs = corpus.documents();
    Ok(scored
        .into_iter()
        .map(|(i, score)| RankedResult { score, document_id: docs[i].id.clone() })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MatchError, RawDocument};

    #[test]
    fn ties_keep_insertion_order() {
        let corpus = Corpus::build(vec![
            RawDocument::text("first", "gardening"),
            RawDocument::text("second", "gardening"),
            RawDocument::text("third", "welding"),
        ]);
        let q = corpus.transform("cooking").unwrap();
        let ids: Vec<_> = rank(&q, &corpus).unwrap().into_iter().map(|r| r.document_id).collect();
        assert_eq!(ids, ["first", "second", "third"]);

        let q = corpus.transform("welding gardening").unwrap();
        let ranked = rank(&q, &corpus).unwrap();
        assert_eq!(ranked[0].document_id, "third");
        assert_eq!(ranked[1].document_id, "first");
        assert_eq!(ranked[2].document_id, "second");
        assert_eq!(ranked[1].score, ranked[2].score);
    }

    #[test]
    fn identical_text_scores_one() {
        let corpus = Corpus::build(vec![
            RawDocument::text("a", "rust compiler engineer"),
            RawDocument::text("b", "pastry chef"),
        ]);
        let q = corpus.transform("Rust compiler engineer").unwrap();
        let ranked = rank(&q, &corpus).unwrap();
        assert_eq!(ranked[0].document_id, "a");
        assert!((ranked[0].score - 1.0).abs() < 1e-5);
        assert_eq!(ranked[1].score, 0.0);
    }

    #[test]
    fn rejects_query_from_another_build() {
        let docs = || vec![RawDocument::text("a", "rust compiler")];
        let old = Corpus::build(docs());
        let new = Corpus::build(docs());
        let q = old.transform("rust").unwrap();
        assert!(matches!(rank(&q, &new), Err(MatchError::StaleVectorMismatch { .. })));
    }
}
