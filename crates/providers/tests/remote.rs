use providers::remote::{RemoteClassifier, RemoteConfig};
use providers::{AudioFile, ClassificationProvider, ProviderError};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn classifier(server: &MockServer) -> RemoteClassifier {
    RemoteClassifier::new(RemoteConfig {
        base_url: server.uri(),
        endpoint: "/api/classify".to_string(),
        field_name: "audio_files".to_string(),
    })
}

fn batch() -> Vec<AudioFile> {
    vec![
        AudioFile::new("a.wav", b"RIFF0000WAVE".to_vec()),
        AudioFile::new("b.wav", b"RIFF1111WAVE".to_vec()),
    ]
}

#[tokio::test]
async fn posts_each_file_under_the_repeated_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/classify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"file_name": "a.wav", "predicted_class": "Medium",
                 "probabilities": {"High": 0.2, "Medium": 0.7, "Low": 0.1}},
                {"file_name": "b.wav", "predicted_class": "High",
                 "probabilities": {"High": 0.8, "Medium": 0.1, "Low": 0.1}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let results = classifier(&server).classify(&batch()).await.unwrap();
    assert_eq!(results.len(), 2);
    // Labels arrive untouched; canonicalization is not the provider's job.
    assert_eq!(results[0].predicted_class, "Medium");
    assert_eq!(results[0].probabilities.get("Medium"), Some(0.7));

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert_eq!(body.matches("name=\"audio_files\"").count(), 2);
    assert!(body.contains("filename=\"a.wav\""));
    assert!(body.contains("filename=\"b.wav\""));
}

#[tokio::test]
async fn error_field_fails_the_batch_even_with_success_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/classify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": "some files are not WAV",
            "results": []
        })))
        .mount(&server)
        .await;

    let err = classifier(&server).classify(&batch()).await.unwrap_err();
    assert!(matches!(err, ProviderError::ServerReported(msg) if msg == "some files are not WAV"));
}

#[tokio::test]
async fn non_success_status_carries_the_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "too many files"})),
        )
        .mount(&server)
        .await;

    let err = classifier(&server).classify(&batch()).await.unwrap_err();
    match err {
        ProviderError::Status { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "too many files");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn plain_text_failure_body_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = classifier(&server).classify(&batch()).await.unwrap_err();
    assert!(matches!(err, ProviderError::Status { status: 500, message } if message == "boom"));
}

#[tokio::test]
async fn body_without_results_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let err = classifier(&server).classify(&batch()).await.unwrap_err();
    assert!(matches!(err, ProviderError::Decode(_)));
}

#[tokio::test]
async fn unreachable_service_is_a_request_failure() {
    let remote = RemoteClassifier::new(RemoteConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        endpoint: "/api/classify".to_string(),
        field_name: "audio_files".to_string(),
    });
    let err = remote.classify(&batch()).await.unwrap_err();
    assert!(matches!(err, ProviderError::RequestFailed(_)));
}
