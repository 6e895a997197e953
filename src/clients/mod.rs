pub mod backend_client;

pub use backend_client::{ClearResponse, HttpBackend, QuizBackend, UploadResponse};
