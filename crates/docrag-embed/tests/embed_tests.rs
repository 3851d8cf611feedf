use std::fs;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use docrag_core::config::{CompletionSettings, Config, EmbeddingBackend, EmbeddingSettings};
use docrag_core::error::{Error, ProviderError};
use docrag_core::traits::Embedder;
use docrag_core::types::Vector;
use docrag_embed::completion::CompletionResponse;
use docrag_embed::openai::{EmbeddingRequest, EmbeddingResponse};
use docrag_embed::{
    embedder_from_config, embedder_from_settings, get_default_embedder, ChatMessage, CompletionClient,
    DeterministicEmbedder, OpenAiEmbedder, Role, TimeoutEmbedder,
};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// One-shot HTTP server on a free local port. Answers the first request with
/// `status` and `body` and hands back the raw request it received.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    serve_raw(format!(
        "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    ))
    .await
}

/// Like `serve_once`, but writes `response` verbatim.
async fn serve_raw(response: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.expect("read");
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            if let Some(head_end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&request[..head_end]).to_lowercase();
                let body_len = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if request.len() >= head_end + 4 + body_len {
                    break;
                }
            }
        }
        socket.write_all(response.as_bytes()).await.expect("write");
        let _ = socket.shutdown().await;
        String::from_utf8_lossy(&request).into_owned()
    });
    (format!("http://{addr}/v1"), handle)
}

fn settings_for(base_url: String) -> EmbeddingSettings {
    EmbeddingSettings {
        base_url,
        api_key: Some("sk-test".to_string()),
        timeout_secs: 5,
        ..EmbeddingSettings::default()
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[tokio::test]
async fn deterministic_embedder_shapes_and_determinism() {
    let embedder = DeterministicEmbedder::new(128);
    let texts = vec!["hello world".to_string(), "hello world".to_string()];
    let embs = embedder.embed(&texts).await.expect("embed");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(embs.len(), 2);
    assert_eq!(v1.len(), 128, "embedding dim is 128");

    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    for (a, b) in v1.iter().zip(v2.iter()) {
        assert!((a - b).abs() <= 1e-6);
    }
}

#[test]
fn deterministic_vectors_reflect_shared_words() {
    let embedder = DeterministicEmbedder::new(256);
    let query = embedder.embed_text("What is the capital of France?");
    let related = embedder.embed_text("Paris is the capital of France.");
    let unrelated = embedder.embed_text("Bananas grow in tropical climates");

    assert!(cosine(&query, &related) > cosine(&query, &unrelated));
    // case and punctuation do not change the vector
    assert_eq!(embedder.embed_text("Hello, World!"), embedder.embed_text("hello world"));
}

#[test]
fn text_without_tokens_is_the_zero_vector() {
    let embedder = DeterministicEmbedder::new(16);
    assert!(embedder.embed_text("  ... !!").iter().all(|x| *x == 0.0));
    assert_eq!(DeterministicEmbedder::new(0).dim(), 1);
}

#[test]
fn embedding_response_is_reordered_by_index() {
    let body = r#"{"data":[
        {"embedding":[0.0,1.0],"index":1},
        {"embedding":[1.0,0.0],"index":0}
    ]}"#;
    let response: EmbeddingResponse = serde_json::from_str(body).expect("json");
    let vectors = response.into_vectors(2).expect("vectors");
    assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
}

#[test]
fn embedding_response_without_index_keeps_order() {
    let body = r#"{"data":[{"embedding":[0.5]},{"embedding":[0.25]}]}"#;
    let response: EmbeddingResponse = serde_json::from_str(body).expect("json");
    assert_eq!(response.into_vectors(2).expect("vectors"), vec![vec![0.5], vec![0.25]]);
}

#[test]
fn short_embedding_response_is_empty_response_error() {
    let body = r#"{"data":[{"embedding":[0.5],"index":0}]}"#;
    let response: EmbeddingResponse = serde_json::from_str(body).expect("json");
    let err = response.into_vectors(3).expect_err("count mismatch");
    assert!(matches!(err, ProviderError::EmptyResponse { expected: 3, got: 1 }));
}

#[test]
fn embedding_response_without_data_is_empty_response_error() {
    let response: EmbeddingResponse = serde_json::from_str(r#"{"object":"list"}"#).expect("json");
    let err = response.into_vectors(2).expect_err("no items");
    assert!(matches!(err, ProviderError::EmptyResponse { expected: 2, got: 0 }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn provider_embeddings_round_trip() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"{"object":"list","data":[{"embedding":[0.0,1.0],"index":1},{"embedding":[1.0,0.0],"index":0}]}"#,
    )
    .await;
    let embedder = OpenAiEmbedder::new(&settings_for(base_url)).expect("embedder");

    let vectors = embedder.embed(&["a".to_string(), "b".to_string()]).await.expect("embed");
    assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);

    let request = server.await.expect("server").to_lowercase();
    assert!(request.starts_with("post /v1/embeddings "), "{request}");
    assert!(request.contains("authorization: bearer sk-test"), "{request}");
    assert!(request.contains(r#""model":"text-embedding-3-small""#), "{request}");
}

#[tokio::test]
async fn provider_rejection_carries_status_and_body() {
    let error_body = r#"{"error":{"message":"Incorrect API key provided","code":"invalid_api_key"}}"#;
    let (base_url, server) = serve_once("401 Unauthorized", error_body).await;
    let embedder = OpenAiEmbedder::new(&settings_for(base_url)).expect("embedder");

    let err = embedder.embed(&["a".to_string()]).await.expect_err("rejected");
    match &err {
        ProviderError::Rejected { status, body } => {
            assert_eq!(*status, 401);
            assert_eq!(body, error_body);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!err.is_retryable());

    let request = server.await.expect("server").to_lowercase();
    assert!(request.contains("authorization: bearer sk-test"), "{request}");
}

#[tokio::test]
async fn provider_overload_is_retryable_rejection() {
    let (base_url, _server) = serve_once("503 Service Unavailable", r#"{"error":"overloaded"}"#).await;
    let embedder = OpenAiEmbedder::new(&settings_for(base_url)).expect("embedder");

    let err = embedder.embed(&["a".to_string()]).await.expect_err("rejected");
    assert!(matches!(err, ProviderError::Rejected { status: 503, .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn truncated_error_body_is_reported_in_the_rejection() {
    // promises 100 bytes, sends 8, then closes
    let (base_url, _server) = serve_raw(
        "HTTP/1.1 500 Internal Server Error\r\ncontent-length: 100\r\nconnection: close\r\n\r\n{\"error\"".to_string(),
    )
    .await;
    let embedder = OpenAiEmbedder::new(&settings_for(base_url)).expect("embedder");

    let err = embedder.embed(&["a".to_string()]).await.expect_err("rejected");
    match &err {
        ProviderError::Rejected { status, body } => {
            assert_eq!(*status, 500);
            assert!(body.starts_with("<unreadable error body:"), "body was {body:?}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_retryable());
}

#[tokio::test]
async fn provider_reply_without_data_is_empty_response() {
    let (base_url, _server) = serve_once("200 OK", r#"{"object":"list"}"#).await;
    let embedder = OpenAiEmbedder::new(&settings_for(base_url)).expect("embedder");

    let err = embedder.embed(&["a".to_string()]).await.expect_err("no data");
    assert!(matches!(err, ProviderError::EmptyResponse { expected: 1, got: 0 }), "got {err:?}");
}

#[tokio::test]
async fn completion_round_trip_sends_history() {
    let (base_url, server) =
        serve_once("200 OK", r#"{"choices":[{"message":{"role":"assistant","content":"Paris."}}]}"#).await;
    let client = CompletionClient::new(&settings_for(base_url), &CompletionSettings::default()).expect("client");
    let history = [
        ChatMessage::system("be brief"),
        ChatMessage::user("capital of Italy?"),
        ChatMessage::assistant("Rome."),
        ChatMessage::user("and of France?"),
    ];

    assert_eq!(client.complete(&history).await.expect("answer"), "Paris.");

    let request = server.await.expect("server");
    assert!(request.to_lowercase().starts_with("post /v1/chat/completions "), "{request}");
    assert!(request.contains(r#"{"role":"assistant","content":"Rome."}"#), "{request}");
    assert!(request.contains(r#""model":"gpt-4o-mini""#), "{request}");
}

#[test]
fn embedding_request_wire_shape() {
    let input = vec!["a".to_string(), "b".to_string()];
    let request = EmbeddingRequest { input: &input, model: "text-embedding-3-small" };
    let json = serde_json::to_value(&request).expect("json");
    assert_eq!(json, serde_json::json!({"input": ["a", "b"], "model": "text-embedding-3-small"}));
}

#[tokio::test]
async fn unreachable_provider_is_unavailable() {
    let settings = EmbeddingSettings {
        base_url: "http://127.0.0.1:1/v1".to_string(),
        api_key: Some("sk-test".to_string()),
        timeout_secs: 2,
        ..EmbeddingSettings::default()
    };
    let embedder = OpenAiEmbedder::new(&settings).expect("embedder");
    assert_eq!(embedder.embedder_id(), "openai:text-embedding-3-small");

    let err = embedder.embed(&["hello".to_string()]).await.expect_err("no server");
    assert!(matches!(err, ProviderError::Unavailable(_)), "got {err:?}");
    assert!(err.is_retryable());
}

#[tokio::test]
async fn empty_batch_needs_no_request() {
    let settings = EmbeddingSettings {
        base_url: "http://127.0.0.1:1/v1".to_string(),
        ..EmbeddingSettings::default()
    };
    let embedder = OpenAiEmbedder::new(&settings).expect("embedder");
    assert!(embedder.embed(&[]).await.expect("empty").is_empty());
}

#[test]
fn empty_model_is_a_configuration_error() {
    let settings = EmbeddingSettings { model: " ".to_string(), ..EmbeddingSettings::default() };
    assert!(matches!(OpenAiEmbedder::new(&settings), Err(Error::Configuration(_))));
}

struct SlowEmbedder;

#[async_trait]
impl Embedder for SlowEmbedder {
    fn embedder_id(&self) -> &str {
        "slow"
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vector>, ProviderError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(texts.iter().map(|_| vec![1.0]).collect())
    }
}

#[tokio::test]
async fn timeout_wrapper_reports_unavailable() {
    let embedder = TimeoutEmbedder::new(Arc::new(SlowEmbedder), Duration::from_millis(20));
    assert_eq!(embedder.embedder_id(), "slow");

    let err = embedder.embed(&["q".to_string()]).await.expect_err("timed out");
    assert!(matches!(err, ProviderError::Unavailable(ref msg) if msg.starts_with("slow")));
}

#[tokio::test]
async fn timeout_wrapper_passes_through_fast_results() {
    let embedder = TimeoutEmbedder::new(Arc::new(DeterministicEmbedder::new(8)), Duration::from_secs(1));
    let vectors = embedder.embed(&["a b".to_string()]).await.expect("embed");
    assert_eq!(vectors[0].len(), 8);
}

#[tokio::test]
async fn settings_select_the_deterministic_backend() {
    let settings = EmbeddingSettings {
        provider: EmbeddingBackend::Deterministic,
        dimension: 32,
        ..EmbeddingSettings::default()
    };
    let embedder = embedder_from_settings(&settings).expect("embedder");
    assert_eq!(embedder.embedder_id(), "deterministic:d32");
    let vectors = embedder.embed(&["x".to_string()]).await.expect("embed");
    assert_eq!(vectors[0].len(), 32);
}

#[tokio::test]
async fn config_files_select_the_embedder() {
    let tmp = TempDir::new().expect("tempdir");
    fs::write(
        tmp.path().join("config.toml"),
        "[embedding]\nprovider = \"deterministic\"\ndimension = 48\n",
    )
    .expect("write");
    let config = Config::load_for_env(tmp.path(), "test").expect("config");

    let embedder = embedder_from_config(&config).expect("embedder");
    assert_eq!(embedder.embedder_id(), "deterministic:d48");
    assert_eq!(embedder.embed(&["x".to_string()]).await.expect("embed")[0].len(), 48);
}

#[test]
fn default_embedder_builds_without_network() {
    // Building the client performs no request.
    let embedder = get_default_embedder().expect("embedder");
    assert!(!embedder.embedder_id().is_empty());
}

#[test]
fn completion_response_yields_first_choice() {
    let body = r#"{"choices":[{"message":{"role":"assistant","content":"Paris."}},
                               {"message":{"role":"assistant","content":"Lyon."}}]}"#;
    let response: CompletionResponse = serde_json::from_str(body).expect("json");
    assert_eq!(response.into_content().expect("content"), "Paris.");
}

#[test]
fn completion_without_content_is_empty_response() {
    let none: CompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).expect("json");
    assert!(matches!(none.into_content(), Err(ProviderError::EmptyResponse { expected: 1, got: 0 })));

    let null: CompletionResponse =
        serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).expect("json");
    assert!(matches!(null.into_content(), Err(ProviderError::EmptyResponse { .. })));
}

#[test]
fn chat_messages_serialize_lowercase_roles() {
    let json = serde_json::to_value(ChatMessage::system("be brief")).expect("json");
    assert_eq!(json, serde_json::json!({"role": "system", "content": "be brief"}));
    assert_eq!(ChatMessage::user("q").role, Role::User);
}

#[tokio::test]
async fn completion_against_unreachable_provider_is_unavailable() {
    let provider = EmbeddingSettings {
        base_url: "http://127.0.0.1:1/v1".to_string(),
        timeout_secs: 2,
        ..EmbeddingSettings::default()
    };
    let client = CompletionClient::new(&provider, &CompletionSettings::default()).expect("client");
    assert_eq!(client.model(), "gpt-4o-mini");
    let err = client.complete(&[ChatMessage::user("hi")]).await.expect_err("no server");
    assert!(matches!(err, ProviderError::Unavailable(_)));
}
