//! End-to-end tests for the Gemini backend against a mocked server.

use base64::Engine;
use imageforge::{GeminiGenerator, GenerationRequest, ImageForgeError, ImageGenerator};

const MODEL_PATH: &str = "/v1beta/models/gemini-2.5-flash-image-preview:generateContent";

fn generator(server: &mockito::Server) -> GeminiGenerator {
    GeminiGenerator::builder()
        .api_key("test-key")
        .base_url(server.url())
        .build()
        .unwrap()
}

#[tokio::test]
async fn generates_and_persists_image() {
    let mut server = mockito::Server::new_async().await;

    let generated: &[u8] = b"\x89PNG\r\n\x1a\nfake image payload";
    let encoded = base64::engine::general_purpose::STANDARD.encode(generated);
    let response = format!(
        r#"{{"candidates": [{{"content": {{"parts": [
            {{"text": "Here you go"}},
            {{"inlineData": {{"mimeType": "image/png", "data": "{encoded}"}}}}
        ]}}}}]}}"#
    );

    let mock = server
        .mock("POST", MODEL_PATH)
        .match_query(mockito::Matcher::UrlEncoded(
            "key".into(),
            "test-key".into(),
        ))
        .match_header("content-type", "application/json")
        .match_body(mockito::Matcher::Regex("turn into pixel art".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(response)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.png");
    std::fs::write(&input, b"source image bytes").unwrap();
    let output = dir.path().join("output.png");

    let request = GenerationRequest::new("turn into pixel art")
        .with_image_path(&input)
        .unwrap()
        .with_output_path(&output);

    let result = generator(&server).generate(&request).await.unwrap();

    assert!(result.success);
    assert_eq!(result.image_data, generated);
    assert_eq!(result.output_path.as_deref(), Some(output.as_path()));
    assert_eq!(std::fs::read(&output).unwrap(), generated);
    mock.assert_async().await;
}

#[tokio::test]
async fn returns_bytes_without_persisting_when_no_output_path() {
    let mut server = mockito::Server::new_async().await;

    let encoded = base64::engine::general_purpose::STANDARD.encode(b"pixels");
    let response = format!(
        r#"{{"candidates": [{{"content": {{"parts": [
            {{"inlineData": {{"mimeType": "image/png", "data": "{encoded}"}}}}
        ]}}}}]}}"#
    );

    server
        .mock("POST", MODEL_PATH)
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(response)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.png");
    std::fs::write(&input, b"source").unwrap();

    let request = GenerationRequest::new("prompt")
        .with_image_path(&input)
        .unwrap();

    let result = generator(&server).generate(&request).await.unwrap();
    assert_eq!(result.image_data, b"pixels");
    assert!(result.output_path.is_none());
    assert!(result.usage.is_none());
}

#[tokio::test]
async fn api_error_carries_status_and_body() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("POST", MODEL_PATH)
        .match_query(mockito::Matcher::Any)
        .with_status(403)
        .with_body(r#"{"error": {"message": "forbidden"}}"#)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.png");
    std::fs::write(&input, b"source").unwrap();

    let request = GenerationRequest::new("prompt")
        .with_image_path(&input)
        .unwrap();

    let err = generator(&server).generate(&request).await.unwrap_err();
    match err {
        ImageForgeError::Api { status, body } => {
            assert_eq!(status, 403);
            assert!(body.contains("forbidden"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_parts_is_no_image_part() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("POST", MODEL_PATH)
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(r#"{"candidates": [{"content": {}}]}"#)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.png");
    std::fs::write(&input, b"source").unwrap();

    let request = GenerationRequest::new("prompt")
        .with_image_path(&input)
        .unwrap();

    let err = generator(&server).generate(&request).await.unwrap_err();
    assert!(matches!(err, ImageForgeError::NoImagePart));
}

#[tokio::test]
async fn empty_parts_is_no_image_found() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("POST", MODEL_PATH)
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(r#"{"candidates": [{"content": {"parts": []}}]}"#)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.png");
    std::fs::write(&input, b"source").unwrap();

    let request = GenerationRequest::new("prompt")
        .with_image_path(&input)
        .unwrap();

    let err = generator(&server).generate(&request).await.unwrap_err();
    assert!(matches!(err, ImageForgeError::NoImageFound));
}

#[tokio::test]
async fn empty_image_list_fails_before_any_request() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", MODEL_PATH)
        .match_query(mockito::Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let request = GenerationRequest::new("prompt");
    let err = generator(&server).generate(&request).await.unwrap_err();
    assert!(matches!(err, ImageForgeError::InvalidRequest(_)));
    mock.assert_async().await;
}
