/// 出题后端客户端
///
/// 封装 `/upload`、`/generate`、`/clear-db` 三个接口的调用逻辑
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{ApiError, ConfigError};
use crate::models::{GenerationRequest, UploadFile};
use crate::utils::logging::truncate_text;

pub const UPLOAD_ENDPOINT: &str = "/upload";
pub const GENERATE_ENDPOINT: &str = "/generate";
pub const CLEAR_ENDPOINT: &str = "/clear-db";

/// `/upload` 成功响应
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub message: String,
}

/// `/clear-db` 成功响应
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClearResponse {
    #[serde(default)]
    pub message: String,
    /// 通知样式：success / info / ...
    #[serde(rename = "type", default = "default_clear_kind")]
    pub kind: String,
}

fn default_clear_kind() -> String {
    "info".to_string()
}

/// 后端能力抽象，便于在测试中替换
#[async_trait]
pub trait QuizBackend: Send + Sync {
    /// 上传单个文档
    async fn upload(&self, file: &UploadFile) -> Result<UploadResponse, ApiError>;

    /// 生成题目，返回响应中的 `data` 原始值（缺失时为 null）
    async fn generate(&self, request: &GenerationRequest) -> Result<JsonValue, ApiError>;

    /// 清空后端知识库
    async fn clear_db(&self) -> Result<ClearResponse, ApiError>;
}

/// 基于 reqwest 的 HTTP 实现
pub struct HttpBackend {
    http: Client,
    base_url: String,
}

impl HttpBackend {
    /// 创建新的后端客户端
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().map_err(ConfigError::ClientBuildFailed)?;

        Ok(Self {
            http,
            base_url: config.backend_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn request_failed(endpoint: &str, source: reqwest::Error) -> ApiError {
        warn!("请求 {} 失败: {}", endpoint, source);
        ApiError::RequestFailed {
            endpoint: endpoint.to_string(),
            source,
        }
    }
}

#[async_trait]
impl QuizBackend for HttpBackend {
    async fn upload(&self, file: &UploadFile) -> Result<UploadResponse, ApiError> {
        debug!(
            "上传文件 {} ({} 字节, {})",
            file.file_name,
            file.bytes.len(),
            file.mime_type()
        );

        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(file.mime_type())
            .map_err(|e| Self::request_failed(UPLOAD_ENDPOINT, e))?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(self.url(UPLOAD_ENDPOINT))
            .multipart(form)
            .send()
            .await
            .map_err(|e| Self::request_failed(UPLOAD_ENDPOINT, e))?;

        let body = read_json(UPLOAD_ENDPOINT, response).await?;
        decode(UPLOAD_ENDPOINT, body)
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<JsonValue, ApiError> {
        debug!(
            "请求生成 {} 道 {} 题目，联网搜索: {}，主题: {}",
            request.question_count,
            request.record_type,
            request.use_web_search,
            truncate_text(&request.query, 80)
        );

        let response = self
            .http
            .post(self.url(GENERATE_ENDPOINT))
            .json(&request.to_body())
            .send()
            .await
            .map_err(|e| Self::request_failed(GENERATE_ENDPOINT, e))?;

        let body = read_json(GENERATE_ENDPOINT, response).await?;
        Ok(take_data(body))
    }

    async fn clear_db(&self) -> Result<ClearResponse, ApiError> {
        let response = self
            .http
            .post(self.url(CLEAR_ENDPOINT))
            .send()
            .await
            .map_err(|e| Self::request_failed(CLEAR_ENDPOINT, e))?;

        let body = read_json(CLEAR_ENDPOINT, response).await?;
        decode(CLEAR_ENDPOINT, body)
    }
}

/// 读取响应体
async fn read_json(endpoint: &str, response: Response) -> Result<JsonValue, ApiError> {
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| HttpBackend::request_failed(endpoint, e))?;
    parse_body(endpoint, status, &bytes)
}

/// 按状态码解析响应体；非 2xx 时提取后端的 `error` 字段
fn parse_body(endpoint: &str, status: StatusCode, bytes: &[u8]) -> Result<JsonValue, ApiError> {
    let parsed = serde_json::from_slice::<JsonValue>(bytes);

    if !status.is_success() {
        let message = parsed
            .ok()
            .and_then(|v| v.get("error").and_then(JsonValue::as_str).map(str::to_string));
        warn!("{} 返回状态码 {}: {:?}", endpoint, status, message);
        return Err(ApiError::BadResponse {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            message,
        });
    }

    parsed.map_err(|source| {
        warn!(
            "{} 响应体不是 JSON: {}",
            endpoint,
            truncate_text(&String::from_utf8_lossy(bytes), 80)
        );
        ApiError::JsonParseFailed {
            endpoint: endpoint.to_string(),
            source,
        }
    })
}

/// `/generate` 响应中的 `data` 字段，缺失时为 null
fn take_data(mut body: JsonValue) -> JsonValue {
    body.get_mut("data")
        .map(JsonValue::take)
        .unwrap_or(JsonValue::Null)
}

fn decode<T: serde::de::DeserializeOwned>(endpoint: &str, body: JsonValue) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|source| ApiError::JsonParseFailed {
        endpoint: endpoint.to_string(),
        source,
    })
}
