//! End-to-end: upload controller → HTTP → gateway → store / model / database.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use wordlens_client::{
    ClientMode, FileCandidate, FileEvent, HttpAnalysisTransport, PreviewRef, StoreUploader,
    UploadController, UploadState,
};
use wordlens_core::config::{GatewayConfig, InputMode, PersistenceMode, ServerConfig};
use wordlens_core::mocks::MockVisionClient;
use wordlens_core::traits::ObjectStore;
use wordlens_gateway::{AnalysisService, GatewayServer};
use wordlens_store::{InMemoryObjectStore, SqliteAnalysisRepository, SqliteSchema};

const CAT: &str = r#"Here you go:
```json
[
  {"word": "cat", "definition": "a small domesticated carnivorous mammal", "sampleSentence": "The cat slept on the windowsill."},
  {"word": "windowsill", "definition": "the ledge at the bottom of a window", "sampleSentence": "She left the pie on the windowsill."}
]
```"#;

async fn spawn_gateway(service: AnalysisService, input_mode: InputMode) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let config = GatewayConfig {
        input_mode,
        enable_tracing: false,
        ..GatewayConfig::default()
    };
    let server = GatewayServer::new(ServerConfig::default(), config, Arc::new(service));
    tokio::spawn(async move { server.serve(listener).await });

    addr
}

fn transport(addr: SocketAddr) -> Arc<HttpAnalysisTransport> {
    Arc::new(
        HttpAnalysisTransport::new(format!("http://{}/", addr), Duration::from_secs(10)).unwrap(),
    )
}

fn cat_png() -> FileEvent {
    FileEvent::Picked(FileCandidate::new(
        "cat.png",
        "image/png",
        vec![0x89u8, b'P', b'N', b'G', 0x0d, 0x0a],
    ))
}

#[tokio::test]
async fn test_inline_upload_is_stored_analyzed_and_persisted() {
    let store = Arc::new(InMemoryObjectStore::new("https://storage.test/analyzed_images"));
    let repo = Arc::new(SqliteAnalysisRepository::open_in_memory(SqliteSchema::PerImage).unwrap());
    let vision = Arc::new(MockVisionClient::constant(CAT));

    let service = AnalysisService::new(vision.clone(), store.clone())
        .with_repository(repo.clone(), PersistenceMode::PerImage);
    let addr = spawn_gateway(service, InputMode::Multipart).await;

    let controller = UploadController::new(ClientMode::Inline, transport(addr));
    let envelope = controller.handle_event(cat_png()).await.unwrap().unwrap();

    let words: Vec<_> = envelope.analysis.iter().map(|r| r.word()).collect();
    assert_eq!(words, vec!["cat", "windowsill"]);

    let key = envelope.image_path.clone().unwrap();
    assert!(key.ends_with("-cat.png"));
    assert_eq!(store.len(), 1);
    assert_eq!(store.get(&key).unwrap().content_type, "image/png");
    assert_eq!(vision.requests()[0].image_url, store.public_url(&key));
    assert_eq!(repo.count().await.unwrap(), 1);

    let session = controller.session();
    assert_eq!(session.state, UploadState::Done);
    assert_eq!(session.results.len(), 2);
    assert_eq!(session.preview, Some(PreviewRef::Remote(key)));
}

#[tokio::test]
async fn test_pre_upload_sends_public_url() {
    let store = Arc::new(InMemoryObjectStore::new("https://storage.test/analyzed_images"));
    let vision = Arc::new(MockVisionClient::constant(CAT));
    let repo = Arc::new(SqliteAnalysisRepository::open_in_memory(SqliteSchema::PerWord).unwrap());

    let service = AnalysisService::new(vision.clone(), store.clone())
        .with_repository(repo.clone(), PersistenceMode::PerWord);
    let addr = spawn_gateway(service, InputMode::Json).await;

    let uploader = Arc::new(StoreUploader::new(store.clone()));
    let controller = UploadController::new(ClientMode::PreUpload(uploader), transport(addr));
    let envelope = controller.handle_event(cat_png()).await.unwrap().unwrap();

    assert_eq!(envelope.analysis.len(), 2);
    assert!(envelope.image_path.is_none());
    assert!(envelope.warning.is_none());
    assert_eq!(store.len(), 1);
    assert_eq!(repo.count().await.unwrap(), 2);

    let url = vision.requests()[0].image_url.clone();
    assert!(url.starts_with("https://storage.test/analyzed_images/"));
    assert_eq!(controller.session().preview, Some(PreviewRef::Remote(url)));
}

#[tokio::test]
async fn test_plain_text_reply_degrades_to_single_item() {
    let store = Arc::new(InMemoryObjectStore::default());
    let service = AnalysisService::new(
        Arc::new(MockVisionClient::constant("I see a dog and a ball.")),
        store,
    );
    let addr = spawn_gateway(service, InputMode::Multipart).await;

    let controller = UploadController::new(ClientMode::Inline, transport(addr));
    let envelope = controller.handle_event(cat_png()).await.unwrap().unwrap();

    assert_eq!(envelope.analysis.len(), 1);
    assert_eq!(envelope.analysis[0].word(), "Analysis Result");
    assert_eq!(envelope.analysis[0].sample_sentence(), "I see a dog and a ball.");
    assert_eq!(controller.state(), UploadState::Done);
}

#[tokio::test]
async fn test_inference_failure_reaches_client_as_message() {
    let service = AnalysisService::new(
        Arc::new(MockVisionClient::failing("Incorrect API key provided")),
        Arc::new(InMemoryObjectStore::default()),
    );
    let addr = spawn_gateway(service, InputMode::Multipart).await;

    let controller = UploadController::new(ClientMode::Inline, transport(addr));
    let err = controller.handle_event(cat_png()).await.unwrap_err();

    assert!(err.to_string().contains("Incorrect API key provided"));
    let session = controller.session();
    assert_eq!(session.state, UploadState::Error);
    assert!(session.results.is_empty());
}

#[tokio::test]
async fn test_wrong_body_shape_is_rejected() {
    let vision = Arc::new(MockVisionClient::constant(CAT));
    let service = AnalysisService::new(vision.clone(), Arc::new(InMemoryObjectStore::default()));
    let addr = spawn_gateway(service, InputMode::Json).await;

    let controller = UploadController::new(ClientMode::Inline, transport(addr));
    let err = controller.handle_event(cat_png()).await.unwrap_err();

    assert!(err.to_string().contains("Expected a JSON body"));
    assert_eq!(vision.call_count(), 0);
}
