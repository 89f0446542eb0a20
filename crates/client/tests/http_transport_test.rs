//! Tests for the HTTP transport against a mock analysis endpoint.

use secrecy::Secret;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wordlens_client::{AnalysisTransport, FileCandidate, HttpAnalysisTransport};
use wordlens_core::Error;

fn transport(server: &MockServer) -> HttpAnalysisTransport {
    HttpAnalysisTransport::new(format!("{}/", server.uri()), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_analyze_url_posts_json_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("apikey", "anon-key"))
        .and(header("Authorization", "Bearer anon-key"))
        .and(body_json(json!({ "image": "https://storage.test/cat.png" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "analysis": [{
                "word": "cat",
                "definition": "a small domesticated carnivorous mammal",
                "sampleSentence": "The cat slept on the windowsill."
            }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let envelope = transport(&mock_server)
        .with_api_key(Secret::new("anon-key".to_string()))
        .analyze_url("https://storage.test/cat.png")
        .await
        .unwrap();

    assert_eq!(envelope.analysis.len(), 1);
    assert_eq!(envelope.analysis[0].word(), "cat");
    assert_eq!(
        envelope.analysis[0].sample_sentence(),
        "The cat slept on the windowsill."
    );
    assert!(envelope.image_path.is_none());
}

#[tokio::test]
async fn test_analyze_file_posts_multipart() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "analysis": [],
            "imagePath": "123e4567-cat.png"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let file = FileCandidate::new("cat.png", "image/png", vec![0x89u8, b'P', b'N', b'G']);
    let envelope = transport(&mock_server).analyze_file(&file).await.unwrap();

    assert!(envelope.analysis.is_empty());
    assert_eq!(envelope.image_path.as_deref(), Some("123e4567-cat.png"));

    let requests = mock_server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body).to_ascii_lowercase();
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("filename=\"cat.png\""));
    assert!(body.contains("content-type: image/png"));
}

#[tokio::test]
async fn test_error_body_becomes_service_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": "Failed to upload image: bucket not found",
            "details": { "stage": "upload" }
        })))
        .mount(&mock_server)
        .await;

    let err = transport(&mock_server)
        .analyze_url("https://storage.test/cat.png")
        .await
        .unwrap_err();

    match err {
        Error::Service(message) => {
            assert_eq!(message, "Failed to upload image: bucket not found")
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_non_json_error_uses_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&mock_server)
        .await;

    let err = transport(&mock_server)
        .analyze_url("https://storage.test/cat.png")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Service(ref m) if m.contains("502")), "{:?}", err);
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let uri = format!("http://{}/", listener.local_addr().unwrap());
    drop(listener);

    let err = HttpAnalysisTransport::new(uri, Duration::from_secs(2))
        .unwrap()
        .analyze_url("https://storage.test/cat.png")
        .await
        .unwrap_err();

    assert!(
        matches!(err, Error::Transport(_) | Error::Timeout(_)),
        "unexpected error: {:?}",
        err
    );
}
