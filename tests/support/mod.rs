use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use quizgen_client::clients::{ClearResponse, QuizBackend, UploadResponse};
use quizgen_client::error::ApiError;
use quizgen_client::models::{GenerationRequest, UploadFile};
use serde_json::Value;

type Handler<T, R> = Box<dyn Fn(&T) -> Result<R, ApiError> + Send + Sync>;

pub struct FakeBackend {
    // maps each generate request to the `data` field of the response
    pub generate: Handler<GenerationRequest, Value>,
    // per-request delay, lets tests make an older request finish last
    pub delay_ms: Box<dyn Fn(&GenerationRequest) -> u64 + Send + Sync>,
    pub upload: Handler<UploadFile, UploadResponse>,
    pub clear: Handler<(), ClearResponse>,
    pub clear_calls: Arc<AtomicUsize>,
}

impl FakeBackend {
    pub fn returning(data: Value) -> Self {
        Self::with_handler(move |_| Ok(data.clone()))
    }

    pub fn with_handler(
        handler: impl Fn(&GenerationRequest) -> Result<Value, ApiError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            generate: Box::new(handler),
            delay_ms: Box::new(|_: &GenerationRequest| 0),
            upload: Box::new(|_: &UploadFile| {
                Ok(UploadResponse {
                    message: "File processed successfully.".to_string(),
                })
            }),
            clear: Box::new(|_: &()| {
                Ok(ClearResponse {
                    message: "Vector database cleared successfully.".to_string(),
                    kind: "success".to_string(),
                })
            }),
            clear_calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

pub fn http_error(endpoint: &str, status: u16, message: Option<&str>) -> ApiError {
    ApiError::BadResponse {
        endpoint: endpoint.to_string(),
        status,
        message: message.map(str::to_string),
    }
}

#[async_trait]
impl QuizBackend for FakeBackend {
    async fn upload(&self, file: &UploadFile) -> Result<UploadResponse, ApiError> {
        (self.upload)(file)
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<Value, ApiError> {
        use tokio::time::{sleep, Duration};
        let delay = (self.delay_ms)(request);
        if delay > 0 {
            sleep(Duration::from_millis(delay)).await;
        }
        (self.generate)(request)
    }

    async fn clear_db(&self) -> Result<ClearResponse, ApiError> {
        self.clear_calls.fetch_add(1, Ordering::SeqCst);
        (self.clear)(&())
    }
}
