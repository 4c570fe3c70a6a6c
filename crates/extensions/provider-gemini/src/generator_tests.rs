use super::*;
use serde_json::json;
use wiremock::{Mock, MockServer, ResponseTemplate, matchers};

const GENERATE_PATH: &str = "/models/gemini-1.5-flash-latest:generateContent";

async fn generator(server: &MockServer) -> GeminiGenerator {
    GeminiGenerator::with_url(&ProviderConfig::default(), server.uri()).unwrap()
}

#[tokio::test]
async fn test_generate_success() {
    let mock_server = MockServer::start().await;

    let response_body = json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": "{\"hasIssues\": false}"}]},
            "finishReason": "STOP"
        }]
    });

    Mock::given(matchers::method("POST"))
        .and(matchers::path(GENERATE_PATH))
        .and(matchers::query_param("key", "test-key"))
        .and(matchers::body_partial_json(json!({
            "contents": [{"parts": [{"text": "Check this"}]}],
            "generationConfig": {"maxOutputTokens": 1000}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let generator = generator(&mock_server).await;
    let text = generator
        .generate("test-key", "Check this", &GenerationConfig::new(0.1, 1000))
        .await
        .unwrap();

    assert_eq!(text, "{\"hasIssues\": false}");
}

#[tokio::test]
async fn test_invalid_key() {
    let mock_server = MockServer::start().await;

    let error_body = r#"{"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}"#;

    Mock::given(matchers::method("POST"))
        .and(matchers::path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string(error_body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let generator = generator(&mock_server).await;
    let err = generator
        .generate("bad", "Hello", &GenerationConfig::key_probe())
        .await
        .unwrap_err();

    assert_eq!(err, CapabilityError::InvalidKey);
}

#[tokio::test]
async fn test_forbidden() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = generator(&mock_server)
        .await
        .generate("k", "Hello", &GenerationConfig::key_probe())
        .await
        .unwrap_err();

    assert_eq!(err, CapabilityError::AuthFailed);
}

#[tokio::test]
async fn test_rate_limited_is_not_retried() {
    let mock_server = MockServer::start().await;

    let error_body = r#"{"error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}}"#;

    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string(error_body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = generator(&mock_server)
        .await
        .generate("k", "Hello", &GenerationConfig::new(0.7, 1000))
        .await
        .unwrap_err();

    assert_eq!(err, CapabilityError::RateLimited);
}

#[tokio::test]
async fn test_server_error_keeps_message() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = generator(&mock_server)
        .await
        .generate("k", "Hello", &GenerationConfig::new(0.7, 1000))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        CapabilityError::Api {
            status: 500,
            message: "Internal Server Error".to_string()
        }
    );
}

#[tokio::test]
async fn test_no_candidates_is_empty_response() {
    let mock_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"candidates": [{"finishReason": "SAFETY"}]})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = generator(&mock_server)
        .await
        .generate("k", "Hello", &GenerationConfig::new(0.7, 1000))
        .await
        .unwrap_err();

    assert_eq!(err, CapabilityError::EmptyResponse);
}

#[tokio::test]
async fn test_unreachable_server() {
    let generator = GeminiGenerator::with_url(&ProviderConfig::default(), "http://127.0.0.1:9").unwrap();

    let err = generator
        .generate("k", "Hello", &GenerationConfig::key_probe())
        .await
        .unwrap_err();

    assert!(matches!(err, CapabilityError::Unreachable(_)));
}
