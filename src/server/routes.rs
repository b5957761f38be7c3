//! Request handlers for the playground page and the two speech API routes.

use axum::body::Body;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::SpeechError;
use crate::server::sink::ChannelSink;
use crate::server::AppState;
use crate::speech::types::{ApiCredential, AudioUpload, SpeechRequest, TtsModel, Voice};

/// JSON error envelope; local and upstream messages pass through verbatim.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

/// An upload big enough to trip the transport body limit never reaches the
/// size validator, so give that rejection the same message the validator uses.
fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            message: "File size exceeds 25MB limit. Please upload a smaller file.".to_string(),
        }
    } else {
        ApiError::bad_request(format!("Invalid multipart request: {err}"))
    }
}

impl From<SpeechError> for ApiError {
    fn from(err: SpeechError) -> Self {
        Self {
            status: StatusCode::from_u16(err.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Take the credential from the request's bearer header, falling back to the
/// server-side configured key. Nothing remote-calling runs without one.
fn resolve_credential(headers: &HeaderMap, state: &AppState) -> Result<ApiCredential, ApiError> {
    let from_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|v| !v.is_empty());

    if let Some(key) = from_header {
        return Ok(ApiCredential::new(key));
    }

    if let Some(key) = state.config.api.api_key.as_deref()
        && !key.is_empty()
    {
        return Ok(ApiCredential::new(key));
    }

    Err(SpeechError::MissingCredential.into())
}

pub async fn index() -> Html<&'static str> {
    Html(include_str!("../../assets/index.html"))
}

pub async fn app_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/javascript")],
        include_str!("../../assets/app.js"),
    )
}

pub async fn style_css() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css")],
        include_str!("../../assets/style.css"),
    )
}

#[derive(Serialize, Deserialize)]
pub struct TranscribeResponse {
    pub text: String,
}

/// `POST /api/transcribe` — multipart upload, one `file` field.
pub async fn transcribe(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<TranscribeResponse>, ApiError> {
    let credential = resolve_credential(&headers, &state)?;

    let mut upload: Option<AudioUpload> = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or("upload.bin").to_string();
            let data = field.bytes().await.map_err(multipart_error)?;
            // Size and format validation happens here, before any upstream call
            upload = Some(AudioUpload::new(file_name, data.to_vec())?);
        }
    }

    let upload = upload.ok_or_else(|| ApiError::bad_request("Missing 'file' field"))?;
    let text = state.speech.transcribe(&credential, upload).await?;
    Ok(Json(TranscribeResponse { text }))
}

#[derive(Deserialize)]
pub struct SpeakParams {
    pub model: TtsModel,
    pub voice: Voice,
    pub input: String,
}

/// `POST /api/speak` — streams newline-delimited JSON playback instructions
/// while the synthesis response is still arriving. Failures after the stream
/// has started are delivered as a terminal `{"error": ...}` line.
pub async fn speak(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(params): Json<SpeakParams>,
) -> Result<Response, ApiError> {
    let credential = resolve_credential(&headers, &state)?;
    let request = SpeechRequest::new(params.model, params.voice, params.input);

    let (tx, rx) = futures::channel::mpsc::unbounded::<Bytes>();
    let sink = ChannelSink::new(tx.clone());
    let speech = state.speech.clone();

    tokio::spawn(async move {
        match speech.synthesize(&credential, &request, sink).await {
            Ok(audio) => {
                tracing::info!("Synthesis stream complete ({} bytes)", audio.len());
            }
            Err(e) => {
                tracing::error!("Synthesis failed: {e}");
                ChannelSink::send_error(&tx, &e.to_string());
            }
        }
    });

    let body = Body::from_stream(rx.map(Ok::<_, std::convert::Infallible>));
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/x-ndjson")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(body)
        .map_err(|e| ApiError::internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::server::router;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_state(base_url: &str, server_key: Option<&str>) -> AppState {
        let mut config = Config::default();
        config.api.base_url = base_url.to_string();
        config.api.api_key = server_key.map(str::to_string);
        config.api.timeout_secs = 5;
        AppState::new(config).unwrap()
    }

    fn multipart_body(file_name: &str, bytes: &[u8]) -> (String, Vec<u8>) {
        let boundary = "test-boundary-7MA4YWxkTrZu0gW";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; \
                 filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
        (format!("multipart/form-data; boundary={boundary}"), body)
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_index_serves_player_page() {
        let app = router(test_state("http://unused", None));
        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("voicePlayer"));
        assert!(html.contains("25MB"));
    }

    #[tokio::test]
    async fn test_transcribe_without_any_credential_is_401() {
        let app = router(test_state("http://unused", None));
        let (content_type, body) = multipart_body("clip.mp3", b"tiny");
        let response = app
            .oneshot(
                Request::post("/api/transcribe")
                    .header(header::CONTENT_TYPE, content_type)
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("API key"));
    }

    #[tokio::test]
    async fn test_transcribe_oversized_upload_rejected_without_upstream_call() {
        let mut upstream = mockito::Server::new_async().await;
        let mock = upstream
            .mock("POST", "/audio/transcriptions")
            .expect(0)
            .create_async()
            .await;

        let app = router(test_state(&upstream.url(), Some("sk-server-key")));
        let (content_type, body) = multipart_body("big.wav", &vec![0u8; 26 * 1024 * 1024]);
        let response = app
            .oneshot(
                Request::post("/api/transcribe")
                    .header(header::CONTENT_TYPE, content_type)
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("25MB limit"));
    }

    #[tokio::test]
    async fn test_transcribe_body_over_transport_limit_still_names_25mb() {
        let mut upstream = mockito::Server::new_async().await;
        let mock = upstream
            .mock("POST", "/audio/transcriptions")
            .expect(0)
            .create_async()
            .await;

        // 56MB exceeds even the raised body limit, so the rejection comes
        // from the transport layer rather than the upload validator
        let app = router(test_state(&upstream.url(), Some("sk-server-key")));
        let (content_type, body) = multipart_body("huge.wav", &vec![0u8; 56 * 1024 * 1024]);
        let response = app
            .oneshot(
                Request::post("/api/transcribe")
                    .header(header::CONTENT_TYPE, content_type)
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("25MB limit"));
    }

    #[tokio::test]
    async fn test_transcribe_happy_path_uses_header_credential() {
        let mut upstream = mockito::Server::new_async().await;
        let mock = upstream
            .mock("POST", "/audio/transcriptions")
            .match_header("Authorization", "Bearer sk-from-browser")
            .with_status(200)
            .with_body(r#"{"text": "hello"}"#)
            .create_async()
            .await;

        // No server-side key: the browser-supplied one must be used
        let app = router(test_state(&upstream.url(), None));
        let (content_type, body) = multipart_body("clip.mp3", b"fake-mp3");
        let response = app
            .oneshot(
                Request::post("/api/transcribe")
                    .header(header::CONTENT_TYPE, content_type)
                    .header(header::AUTHORIZATION, "Bearer sk-from-browser")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["text"].as_str().unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_speak_streams_one_line_per_chunk() {
        let audio: Vec<u8> = (0..9000u32).map(|i| (i % 199) as u8).collect();
        let mut upstream = mockito::Server::new_async().await;
        let mock = upstream
            .mock("POST", "/audio/speech")
            .with_status(200)
            .with_body(audio.clone())
            .create_async()
            .await;

        let app = router(test_state(&upstream.url(), Some("sk-server-key")));
        let response = app
            .oneshot(
                Request::post("/api/speak")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({"model": "tts-1", "voice": "alloy", "input": "Hello world"})
                            .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/x-ndjson"
        );

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        mock.assert_async().await;

        // 9000 bytes -> 4096 + 4096 + 808 tail = 3 instructions
        let lines: Vec<serde_json::Value> = std::str::from_utf8(&bytes)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        for line in &lines {
            let src = line["src"].as_str().unwrap();
            assert!(src.starts_with("data:audio/mp3;base64,"));
        }
    }

    #[tokio::test]
    async fn test_speak_without_credential_is_401() {
        let app = router(test_state("http://unused", None));
        let response = app
            .oneshot(
                Request::post("/api/speak")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({"model": "tts-1", "voice": "nova", "input": "hi"}).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_speak_upstream_failure_yields_error_line() {
        let mut upstream = mockito::Server::new_async().await;
        let mock = upstream
            .mock("POST", "/audio/speech")
            .with_status(500)
            .with_body("upstream exploded")
            .create_async()
            .await;

        let app = router(test_state(&upstream.url(), Some("sk-server-key")));
        let response = app
            .oneshot(
                Request::post("/api/speak")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({"model": "tts-1-hd", "voice": "echo", "input": "hi"}).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        mock.assert_async().await;

        let line: serde_json::Value =
            serde_json::from_str(std::str::from_utf8(&bytes).unwrap().trim()).unwrap();
        assert!(line["error"].as_str().unwrap().contains("upstream exploded"));
    }

    #[tokio::test]
    async fn test_unknown_voice_is_client_error() {
        let app = router(test_state("http://unused", Some("sk-server-key")));
        let response = app
            .oneshot(
                Request::post("/api/speak")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({"model": "tts-1", "voice": "hal9000", "input": "hi"}).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
