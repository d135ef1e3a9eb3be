//! Ranking primitives for the symptom corpus.
//!
//! Similarity is the plain dot product. It equals cosine similarity only when
//! both sides are unit length; corpus vectors are taken as stored.

use std::cmp::Ordering;

use crate::models::{RankedSymptom, SymptomCorpusEntry};

pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Scale `v` to unit length. Zero vectors are left untouched.
pub fn normalize(v: &mut [f32]) {
    let norm = l2_norm(v);
    if norm > f32::EPSILON {
        v.iter_mut().for_each(|x| *x /= norm);
    }
}

/// Score every entry against `query` and keep the best `top_n`.
///
/// Ordered by similarity descending, ties broken by ascending id.
pub fn rank<'a, I>(entries: I, query: &[f32], top_n: usize) -> Vec<RankedSymptom>
where
    I: IntoIterator<Item = &'a SymptomCorpusEntry>,
{
    let mut ranked: Vec<RankedSymptom> = entries
        .into_iter()
        .map(|entry| RankedSymptom::from_entry(entry, dot_product(query, &entry.embedding)))
        .collect();

    ranked.sort_by(compare_ranked);
    ranked.truncate(top_n);
    ranked
}

fn compare_ranked(a: &RankedSymptom, b: &RankedSymptom) -> Ordering {
    b.similarity
        .total_cmp(&a.similarity)
        .then_with(|| a.id.cmp(&b.id))
}

/// Trim and lowercase keywords, dropping blank ones.
pub fn normalize_keywords<S: AsRef<str>>(keywords: &[S]) -> Vec<String> {
    keywords
        .iter()
        .map(|k| k.as_ref().trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

/// Keep results whose path contains every keyword, case-insensitively.
/// Order is preserved; no keywords means no filtering.
pub fn filter_by_keywords(results: &[RankedSymptom], keywords: &[String]) -> Vec<RankedSymptom> {
    let needles: Vec<String> = keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();

    results
        .iter()
        .filter(|result| {
            let haystack = result.path.to_lowercase();
            needles.iter().all(|needle| haystack.contains(needle.as_str()))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(id: i64, path: &str, embedding: Vec<f32>) -> SymptomCorpusEntry {
        SymptomCorpusEntry {
            id,
            category: "Schlaf".to_string(),
            path: path.to_string(),
            embedding,
        }
    }

    fn ranked(id: i64, path: &str, similarity: f32) -> RankedSymptom {
        RankedSymptom {
            id,
            category: "Schlaf".to_string(),
            path: path.to_string(),
            similarity,
        }
    }

    #[test]
    fn test_dot_product() {
        assert_eq!(dot_product(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]), 32.0);
    }

    #[test]
    fn test_normalize() {
        let mut v = vec![3.0, 4.0];
        normalize(&mut v);
        assert!((l2_norm(&v) - 1.0).abs() < 1e-6);
        assert!((v[0] - 0.6).abs() < 1e-6);

        let mut zero = vec![0.0, 0.0];
        normalize(&mut zero);
        assert_eq!(zero, vec![0.0, 0.0]);
    }

    #[test]
    fn test_rank_sorts_descending_and_truncates() {
        let entries = vec![
            entry(1, "a", vec![0.1, 0.0]),
            entry(2, "b", vec![0.9, 0.0]),
            entry(3, "c", vec![0.5, 0.0]),
            entry(4, "d", vec![-0.3, 0.0]),
        ];

        let result = rank(&entries, &[1.0, 0.0], 3);
        let ids: Vec<i64> = result.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);

        for pair in result.windows(2) {
            assert!(pair[0].similarity >= pair[1].similarity);
        }
    }

    #[test]
    fn test_rank_breaks_ties_by_ascending_id() {
        let entries = vec![
            entry(9, "x", vec![0.5]),
            entry(3, "y", vec![0.5]),
            entry(5, "z", vec![0.5]),
        ];

        let ids: Vec<i64> = rank(&entries, &[1.0], 10).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 5, 9]);
    }

    #[test]
    fn test_rank_with_fewer_entries_than_top_n() {
        let entries = vec![entry(1, "a", vec![1.0])];
        assert_eq!(rank(&entries, &[1.0], 100).len(), 1);
        assert!(rank(Vec::<SymptomCorpusEntry>::new().iter(), &[1.0], 100).is_empty());
    }

    #[test]
    fn test_keyword_filter_uses_and_semantics() {
        let results = vec![
            ranked(1, "Schlaf, Schlaflosigkeit, Mitternacht, nach", 0.9),
            ranked(2, "Schlaf, Schlaflosigkeit, Morgens", 0.8),
            ranked(3, "Schlaf, Erwachen, Mitternacht", 0.7),
        ];

        let filtered = filter_by_keywords(
            &results,
            &["schlaflosigkeit".to_string(), "MITTERNACHT".to_string()],
        );
        assert_eq!(filtered, vec![results[0].clone()]);
    }

    #[test]
    fn test_keyword_filter_without_keywords_keeps_everything() {
        let results = vec![ranked(1, "a", 0.9), ranked(2, "b", 0.8)];
        assert_eq!(filter_by_keywords(&results, &[]), results);
        assert_eq!(filter_by_keywords(&results, &["  ".to_string()]), results);
    }

    #[test]
    fn test_normalize_keywords() {
        assert_eq!(
            normalize_keywords(&[" Kopf ", "", "  ", "SCHMERZ"]),
            vec!["kopf".to_string(), "schmerz".to_string()]
        );
    }
}
