//! Similarity search over a small corpus with a mocked embeddings endpoint.

mod common;

use std::io::Write;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use tempfile::{NamedTempFile, TempDir};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use remedia::config::SearchConfig;
use remedia::error::RemediaError;
use remedia::retry::RetryPolicy;
use remedia::search::{SimilaritySearchEngine, SymptomCorpus};
use remedia::taxonomy::{SubCategory, UpperCategory};

use common::{embedding_body, embedding_provider, mount_embedding, reference_db, sample_corpus};

fn engine(server: &MockServer, normalize_query: bool) -> SimilaritySearchEngine {
    let corpus = SymptomCorpus::new(sample_corpus()).unwrap();
    SimilaritySearchEngine::new(
        Arc::new(corpus),
        embedding_provider(server, RetryPolicy::fast(3)),
        &SearchConfig {
            top_n: 100,
            normalize_query,
        },
    )
}

fn ids(results: &[remedia::models::RankedSymptom]) -> Vec<i64> {
    results.iter().map(|r| r.id).collect()
}

#[tokio::test]
async fn ranks_only_the_classified_category() {
    let server = MockServer::start().await;
    mount_embedding(&server, &[1.0, 0.0, 0.0]).await;

    let results = engine(&server, true)
        .search(
            "Schlaf, Schlaflosigkeit, Mitternacht, nach",
            UpperCategory::Koerper,
            SubCategory::Schlaf,
            None,
        )
        .await
        .unwrap();

    assert_eq!(ids(&results), vec![42, 43, 44]);
    assert!(results.iter().all(|r| r.category == "Schlaf"));
    assert!((results[0].similarity - 1.0).abs() < 1e-6);
    assert!(results
        .windows(2)
        .all(|pair| pair[0].similarity >= pair[1].similarity));
}

#[tokio::test]
async fn top_n_truncates() {
    let server = MockServer::start().await;
    mount_embedding(&server, &[1.0, 0.0, 0.0]).await;

    let results = engine(&server, true)
        .search("Schlaf", UpperCategory::Koerper, SubCategory::Schlaf, Some(2))
        .await
        .unwrap();

    assert_eq!(ids(&results), vec![42, 43]);
}

#[tokio::test]
async fn out_of_range_top_n_is_rejected() {
    let server = MockServer::start().await;

    let err = engine(&server, true)
        .search("Schlaf", UpperCategory::Koerper, SubCategory::Schlaf, Some(0))
        .await
        .unwrap_err();

    assert!(matches!(err, RemediaError::Validation(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn upper_category_filters_non_body_symptoms() {
    let server = MockServer::start().await;
    mount_embedding(&server, &[0.0, 0.0, 1.0]).await;

    let results = engine(&server, true)
        .search(
            "Furcht, Gewitter, vor",
            UpperCategory::Gemuet,
            SubCategory::NichtAnwendbar,
            None,
        )
        .await
        .unwrap();

    assert_eq!(ids(&results), vec![7]);
}

#[tokio::test]
async fn empty_category_skips_embedding_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(embedding_body(&[1.0, 0.0, 0.0])))
        .expect(0)
        .mount(&server)
        .await;

    let results = engine(&server, true)
        .search("Husten, nachts", UpperCategory::Koerper, SubCategory::Husten, None)
        .await
        .unwrap();

    assert!(results.is_empty());
}

#[tokio::test]
async fn query_dimension_mismatch_is_embedding_error() {
    let server = MockServer::start().await;
    mount_embedding(&server, &[1.0, 0.0]).await;

    let err = engine(&server, true)
        .search("Schlaf", UpperCategory::Koerper, SubCategory::Schlaf, None)
        .await
        .unwrap_err();

    assert!(matches!(err, RemediaError::Embedding(_)), "got {err:?}");
}

#[tokio::test]
async fn raw_query_scores_without_normalization() {
    let server = MockServer::start().await;
    mount_embedding(&server, &[2.0, 0.0, 0.0]).await;

    let normalized = engine(&server, true)
        .search("Schlaf", UpperCategory::Koerper, SubCategory::Schlaf, Some(1))
        .await
        .unwrap();
    let raw = engine(&server, false)
        .search("Schlaf", UpperCategory::Koerper, SubCategory::Schlaf, Some(1))
        .await
        .unwrap();

    assert!((normalized[0].similarity - 1.0).abs() < 1e-6);
    assert!((raw[0].similarity - 2.0).abs() < 1e-6);
}

#[tokio::test]
async fn transient_embedding_failure_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    mount_embedding(&server, &[1.0, 0.0, 0.0]).await;

    let results = engine(&server, true)
        .search("Schlaf", UpperCategory::Koerper, SubCategory::Schlaf, Some(1))
        .await
        .unwrap();

    assert_eq!(ids(&results), vec![42]);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[test]
fn corpus_loads_from_jsonl_snapshot() {
    let mut file = NamedTempFile::new().unwrap();
    for entry in sample_corpus() {
        writeln!(file, "{}", serde_json::to_string(&entry).unwrap()).unwrap();
    }
    writeln!(file).unwrap();

    let corpus = SymptomCorpus::from_jsonl(file.path()).unwrap();

    assert_eq!(corpus.len(), 5);
    assert_eq!(corpus.dimensions(), 3);
    assert_eq!(corpus.category_counts()["Schlaf"], 3);
}

#[test]
fn snapshot_with_mixed_dimensions_is_unavailable() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, r#"{{"id":1,"category":"Schlaf","path":"Schlaf","embedding":[1.0,0.0]}}"#).unwrap();
    writeln!(file, r#"{{"id":2,"category":"Schlaf","path":"Schlaf, Gähnen","embedding":[1.0]}}"#).unwrap();

    let err = SymptomCorpus::from_jsonl(file.path()).unwrap_err();
    assert!(matches!(err, RemediaError::ResourceUnavailable(_)));
}

#[test]
fn missing_snapshot_is_unavailable() {
    let dir = TempDir::new().unwrap();
    let err = SymptomCorpus::from_jsonl(dir.path().join("absent.jsonl")).unwrap_err();
    assert!(matches!(err, RemediaError::ResourceUnavailable(_)));
}

#[tokio::test]
async fn corpus_loads_from_reference_database() {
    let dir = TempDir::new().unwrap();
    let backend = reference_db(&dir).await;

    let corpus = SymptomCorpus::from_store(&*backend).await.unwrap();

    assert_eq!(corpus.len(), 5);
    assert_eq!(corpus.dimensions(), 3);
    let sleep: Vec<i64> = corpus.in_category("Schlaf").map(|e| e.id).collect();
    assert_eq!(sleep.len(), 3);
    assert!(sleep.contains(&42));
}
