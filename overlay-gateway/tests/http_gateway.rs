//! HTTP gateway against a mock document service.

use std::time::Duration;

use overlay_core::{
    Annotation, Color, Engine, GatewayError, NormalizedPoint, PageContent, PersistenceGateway,
    SaveRequest, StrokeKind,
};
use overlay_gateway::{GatewayConfig, HttpGateway};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway_for(server: &MockServer) -> HttpGateway {
    let config = GatewayConfig::new(&server.uri(), Duration::from_secs(5)).expect("config");
    HttpGateway::new(&config).expect("client")
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn load_maps_service_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get_document/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "abc",
            "original_name": "scan.pdf",
            "text_content": "ignored when images exist",
            "image_data": ["data:image/png;base64,AAAA", "data:image/png;base64,BBBB"],
            "annotations": [
                {"type": "pen", "color": "#000000", "size": 2, "page": 1,
                 "points": [{"x": 0.1, "y": 0.1}, {"x": 0.2, "y": 0.2}]},
                {"type": "laser"}
            ],
            "status": "saved"
        })))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server);
    let loaded = gateway.load_document("abc").await.expect("document");
    assert_eq!(loaded.filename, "scan.pdf");
    assert_eq!(loaded.page_content.page_count(), 2);
    assert_eq!(loaded.annotations.len(), 1);

    let mut engine = Engine::default();
    let ticket = engine.begin_load("abc");
    engine.finish_load(&ticket, Ok(loaded));
    assert_eq!(engine.page_label(), "1/2");
    assert_eq!(engine.annotations().map(|s| s.count_on_page(1)), Some(1));
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn text_document_has_one_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get_document/notes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "notes",
            "original_name": "notes.txt",
            "text_content": "hello",
            "annotations": []
        })))
        .mount(&server)
        .await;

    let loaded = gateway_for(&server)
        .load_document("notes")
        .await
        .expect("document");
    assert_eq!(loaded.page_content, PageContent::Text("hello".into()));
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn missing_document_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get_document/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "No encontrado"})))
        .mount(&server)
        .await;

    let err = gateway_for(&server)
        .load_document("gone")
        .await
        .expect_err("not found");
    assert_eq!(err, GatewayError::NotFound("gone".into()));
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn error_payload_is_a_service_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get_document/broken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "corrupt record"})))
        .mount(&server)
        .await;

    let err = gateway_for(&server)
        .load_document("broken")
        .await
        .expect_err("service error");
    assert_eq!(err, GatewayError::Service("corrupt record".into()));
    assert!(!err.is_retryable());
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn save_posts_replace_all_payload() {
    let server = MockServer::start().await;
    let stroke = Annotation::stroke(
        StrokeKind::Highlighter,
        Color::default(),
        3.0,
        0,
        vec![NormalizedPoint::new(0.1, 0.1), NormalizedPoint::new(0.5, 0.1)],
    );
    Mock::given(method("POST"))
        .and(path("/save_annotations"))
        .and(body_json(json!({
            "doc_id": "abc",
            "annotations": [{
                "type": "highlighter", "color": "#FFEB3B", "size": 3.0, "page": 0,
                "points": [{"x": 0.1, "y": 0.1}, {"x": 0.5, "y": 0.1}]
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let request = SaveRequest {
        document_id: "abc".into(),
        annotations: vec![stroke],
    };
    gateway_for(&server)
        .save_annotations(&request)
        .await
        .expect("saved");
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn server_error_on_save_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/save_annotations"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let request = SaveRequest {
        document_id: "abc".into(),
        annotations: Vec::new(),
    };
    let err = gateway_for(&server)
        .save_annotations(&request)
        .await
        .expect_err("failure");
    assert!(matches!(err, GatewayError::Transport(_)));
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn list_and_delete() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/list_documents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "documents": [
                {"id": "b", "filename": "b.pdf", "date": "2024-05-02T10:00:00", "file_type": "pdf"},
                {"id": "a", "filename": "a.png", "date": "2024-05-01T10:00:00", "file_type": "image"}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/delete_document/a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/delete_document/zzz"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "No encontrado"})))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server);
    let documents = gateway.list_documents().await.expect("list");
    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0].filename, "b.pdf");
    assert_eq!(documents[1].file_type, "image");

    gateway.delete_document("a").await.expect("deleted");
    assert_eq!(
        gateway.delete_document("zzz").await,
        Err(GatewayError::NotFound("zzz".into()))
    );
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let config = GatewayConfig::new("http://127.0.0.1:9/", Duration::from_millis(500))
        .expect("config");
    let gateway = HttpGateway::new(&config).expect("client");
    let err = gateway.load_document("x").await.expect_err("unreachable");
    assert!(err.is_retryable());
}
