#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use remedia::config::{DatabaseConfig, EmbeddingsConfig, LlmConfig};
use remedia::db::repository::{RemedyRepository, SymptomRepository};
use remedia::db::{Database, LibSqlBackend};
use remedia::embeddings::EmbeddingProvider;
use remedia::llm::{ClassifierSeed, LlmProvider};
use remedia::models::SymptomCorpusEntry;
use remedia::retry::RetryPolicy;
use remedia::services::Classifier;

pub const SLEEP_ANSWER: &str = r#"{"Symptom": "Schlaflosigkeit nach Mitternacht", "oberKategorie": "Körper", "unterKategorie": "Schlaf", "Suchpfad": "Schlaf, Schlaflosigkeit, Mitternacht, nach", "Begründung": "Das Symptom betrifft den Schlaf."}"#;

pub const FEAR_ANSWER: &str = r#"{"Symptom": "Angst vor Gewitter", "oberKategorie": "Gemüt", "unterKategorie": "Nicht anwendbar", "Suchpfad": "Furcht, Gewitter, vor", "Begründung": "Eine Furcht ist ein emotionaler Zustand."}"#;

/// OpenAI chat completion body carrying `content` as the assistant answer.
pub fn chat_completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1_700_000_000u32,
        "model": "gpt-4o",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop",
            "logprobs": null
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 10, "total_tokens": 20 }
    })
}

pub fn rate_limited() -> ResponseTemplate {
    ResponseTemplate::new(429).set_body_json(json!({
        "error": {
            "message": "Rate limit reached",
            "type": "requests",
            "param": null,
            "code": "rate_limit_exceeded"
        }
    }))
}

pub fn embedding_body(embedding: &[f32]) -> Value {
    json!({ "data": [{ "index": 0, "embedding": embedding }] })
}

pub async fn mount_chat_answer(server: &MockServer, content: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion(content)))
        .mount(server)
        .await;
}

pub async fn mount_embedding(server: &MockServer, embedding: &[f32]) {
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(embedding_body(embedding)))
        .mount(server)
        .await;
}

pub fn llm_config(server: &MockServer) -> LlmConfig {
    LlmConfig {
        model: "openai/gpt-4o".to_string(),
        api_key: Some("sk-test".to_string()),
        base_url: Some(format!("{}/v1", server.uri())),
        timeout_secs: 5,
        temperature: 0.1,
        max_tokens: 300,
        seed_path: None,
    }
}

pub fn embeddings_config(server: &MockServer) -> EmbeddingsConfig {
    EmbeddingsConfig {
        model: "openai/text-embedding-3-small".to_string(),
        dimensions: None,
        api_key: Some("sk-test".to_string()),
        base_url: Some(format!("{}/v1", server.uri())),
        timeout_secs: 5,
    }
}

pub fn classifier(server: &MockServer, retry: RetryPolicy) -> Classifier {
    let llm = LlmProvider::new(Some(&llm_config(server)), retry);
    Classifier::new(llm, ClassifierSeed::builtin().expect("builtin seed"))
}

pub fn embedding_provider(server: &MockServer, retry: RetryPolicy) -> EmbeddingProvider {
    EmbeddingProvider::new(&embeddings_config(server), retry).expect("embedding provider")
}

pub fn entry(id: i64, category: &str, path: &str, embedding: Vec<f32>) -> SymptomCorpusEntry {
    SymptomCorpusEntry {
        id,
        category: category.to_string(),
        path: path.to_string(),
        embedding,
    }
}

/// Small corpus spanning a body sub category and two upper categories.
pub fn sample_corpus() -> Vec<SymptomCorpusEntry> {
    vec![
        entry(42, "Schlaf", "Schlaf, Schlaflosigkeit, Mitternacht, nach", vec![1.0, 0.0, 0.0]),
        entry(43, "Schlaf", "Schlaf, Schlaflosigkeit, morgens, früh", vec![0.8, 0.6, 0.0]),
        entry(44, "Schlaf", "Schlaf, Gähnen", vec![0.0, 1.0, 0.0]),
        entry(7, "Gemüt", "Furcht, Gewitter, vor", vec![0.0, 0.0, 1.0]),
        entry(8, "Allgemein", "Kälte, Gefühl von", vec![0.5, 0.5, 0.5]),
    ]
}

/// Reference database in a temp dir with the lookup tables and a few remedies.
pub async fn reference_db(dir: &TempDir) -> Arc<LibSqlBackend> {
    let path = dir.path().join("synthesis.db");
    let db = Database::open(&DatabaseConfig {
        url: format!("file:{}", path.display()),
        auth_token: None,
        local_path: None,
    })
    .await
    .expect("open database");
    db.init_schema().await.expect("schema");

    let conn = db.connect().expect("connect");
    for (abbreviation, description) in [
        ("Coff.", "Coffea cruda"),
        ("Nux-v.", "Nux vomica"),
        ("Ars.", "Arsenicum album"),
    ] {
        RemedyRepository::insert_remedy(&conn, abbreviation, description)
            .await
            .expect("remedy");
    }
    for (symptom_id, abbreviation, degree) in [
        (42, "Coff.", 3),
        (42, "Nux-v.", 2),
        (43, "Nux-v.", 3),
        (43, "Ars.", 1),
    ] {
        RemedyRepository::link(&conn, symptom_id, abbreviation, degree)
            .await
            .expect("link");
    }
    for entry in sample_corpus() {
        SymptomRepository::insert(&conn, &entry).await.expect("symptom");
    }

    Arc::new(LibSqlBackend::new(db))
}
