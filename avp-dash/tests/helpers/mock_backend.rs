//! In-process mock of the image processing backend
//!
//! Serves the four dashboard endpoints on `127.0.0.1:<ephemeral>` with
//! configurable responses and per-endpoint hit counters.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::task::JoinHandle;

/// Canned response: status plus raw body text
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub body: String,
}

impl MockResponse {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }

    pub fn raw(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }

    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap();
        (status, [(header::CONTENT_TYPE, "application/json")], self.body).into_response()
    }
}

#[derive(Default)]
pub struct MockState {
    pub analytics_hits: AtomicUsize,
    pub images_hits: AtomicUsize,
    pub detail_hits: AtomicUsize,
    pub upload_hits: AtomicUsize,
    analytics: Mutex<Option<MockResponse>>,
    images: Mutex<Option<MockResponse>>,
    upload: Mutex<Option<MockResponse>>,
    upload_delay: Mutex<Duration>,
    last_upload: Mutex<Option<Value>>,
    last_images_query: Mutex<HashMap<String, String>>,
}

pub struct MockBackend {
    pub base_url: String,
    pub state: Arc<MockState>,
    server: JoinHandle<()>,
}

impl MockBackend {
    /// Start a backend with empty analytics and no images
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());

        let app = Router::new()
            .route("/api/v1/analytics", get(analytics))
            .route("/api/v1/images", get(list_images).post(upload))
            .route("/api/v1/images/:image_id", get(get_image))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
            server,
        }
    }

    pub fn set_analytics(&self, response: MockResponse) {
        *self.state.analytics.lock().unwrap() = Some(response);
    }

    pub fn set_images(&self, response: MockResponse) {
        *self.state.images.lock().unwrap() = Some(response);
    }

    /// Shorthand for a 200 image list
    pub fn set_image_records(&self, images: Value) {
        self.set_images(MockResponse::json(200, json!({ "images": images })));
    }

    pub fn set_upload(&self, response: MockResponse) {
        *self.state.upload.lock().unwrap() = Some(response);
    }

    /// Hold each upload request this long before answering
    pub fn set_upload_delay(&self, delay: Duration) {
        *self.state.upload_delay.lock().unwrap() = delay;
    }

    pub fn analytics_hits(&self) -> usize {
        self.state.analytics_hits.load(Ordering::SeqCst)
    }

    pub fn images_hits(&self) -> usize {
        self.state.images_hits.load(Ordering::SeqCst)
    }

    pub fn detail_hits(&self) -> usize {
        self.state.detail_hits.load(Ordering::SeqCst)
    }

    pub fn upload_hits(&self) -> usize {
        self.state.upload_hits.load(Ordering::SeqCst)
    }

    pub fn last_upload(&self) -> Option<Value> {
        self.state.last_upload.lock().unwrap().clone()
    }

    pub fn last_images_query(&self) -> HashMap<String, String> {
        self.state.last_images_query.lock().unwrap().clone()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn analytics(State(state): State<Arc<MockState>>) -> Response {
    state.analytics_hits.fetch_add(1, Ordering::SeqCst);
    state
        .analytics
        .lock()
        .unwrap()
        .clone()
        .unwrap_or_else(|| MockResponse::json(200, json!({})))
        .into_response()
}

async fn list_images(
    State(state): State<Arc<MockState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.images_hits.fetch_add(1, Ordering::SeqCst);
    *state.last_images_query.lock().unwrap() = params;
    state
        .images
        .lock()
        .unwrap()
        .clone()
        .unwrap_or_else(|| MockResponse::json(200, json!({ "images": [] })))
        .into_response()
}

async fn get_image(State(state): State<Arc<MockState>>, Path(image_id): Path<String>) -> Response {
    state.detail_hits.fetch_add(1, Ordering::SeqCst);

    let images: Vec<Value> = state
        .images
        .lock()
        .unwrap()
        .as_ref()
        .and_then(|r| serde_json::from_str::<Value>(&r.body).ok())
        .and_then(|v| v.get("images").and_then(Value::as_array).cloned())
        .unwrap_or_default();

    let found = images.into_iter().find(|img| {
        img.get("image_id").and_then(Value::as_str) == Some(image_id.as_str())
            || img.get("id").and_then(Value::as_str) == Some(image_id.as_str())
    });

    match found {
        Some(image) => {
            let complete = image.get("processing_status").and_then(Value::as_str) == Some("completed");
            MockResponse::json(200, json!({ "image": image, "analysis_complete": complete }))
                .into_response()
        }
        None => MockResponse::json(404, json!({ "error": "Image not found" })).into_response(),
    }
}

async fn upload(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state.upload_hits.fetch_add(1, Ordering::SeqCst);
    *state.last_upload.lock().unwrap() = Some(body.clone());

    let delay = *state.upload_delay.lock().unwrap();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let filename = body.get("filename").cloned().unwrap_or(Value::Null);
    state
        .upload
        .lock()
        .unwrap()
        .clone()
        .unwrap_or_else(|| {
            MockResponse::json(
                200,
                json!({
                    "message": "Image uploaded successfully",
                    "image_id": "img-new",
                    "filename": filename,
                    "status": "uploaded"
                }),
            )
        })
        .into_response()
}
