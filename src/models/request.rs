use std::path::Path;

use serde::Serialize;

use crate::error::{AppError, AppResult, InputError};
use crate::models::record::RecordType;

/// 一次生成请求（每次提交新建一个）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub query: String,
    pub question_count: u32,
    pub record_type: RecordType,
    pub use_web_search: bool,
}

impl GenerationRequest {
    pub fn new(
        query: impl Into<String>,
        question_count: u32,
        record_type: RecordType,
        use_web_search: bool,
    ) -> Self {
        Self {
            query: query.into(),
            question_count,
            record_type,
            use_web_search,
        }
    }

    /// 发起网络请求前的输入校验
    pub fn validate(&self) -> Result<(), InputError> {
        if self.query.trim().is_empty() {
            return Err(InputError::EmptyQuery);
        }
        if self.question_count == 0 {
            return Err(InputError::ZeroQuestionCount);
        }
        Ok(())
    }

    /// `/generate` 请求体
    pub fn to_body(&self) -> GenerateBody<'_> {
        GenerateBody {
            query: &self.query,
            num_questions: self.question_count,
            record_type: self.record_type,
            use_tavily: self.use_web_search,
        }
    }
}

/// `/generate` 请求体（字段名与后端一致）
#[derive(Debug, Serialize)]
pub struct GenerateBody<'a> {
    pub query: &'a str,
    #[serde(rename = "numQuestions")]
    pub num_questions: u32,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    #[serde(rename = "useTavily")]
    pub use_tavily: bool,
}

/// 待上传的文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// 从磁盘读取待上传文件
    pub async fn from_path(path: &Path) -> AppResult<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self { file_name, bytes })
    }

    /// 按扩展名推断 MIME 类型（与后端支持的文档类型一致）
    pub fn mime_type(&self) -> &'static str {
        let ext = Path::new(&self.file_name)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => "application/pdf",
            "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
            "txt" => "text/plain",
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            _ => "application/octet-stream",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_blank_query() {
        let req = GenerationRequest::new("   ", 5, RecordType::Mcq, false);
        assert_eq!(req.validate(), Err(InputError::EmptyQuery));
    }

    #[test]
    fn test_validate_rejects_zero_count() {
        let req = GenerationRequest::new("photosynthesis", 0, RecordType::Qa, false);
        assert_eq!(req.validate(), Err(InputError::ZeroQuestionCount));
    }

    #[test]
    fn test_body_uses_backend_field_names() {
        let req = GenerationRequest::new("rivers of Europe", 3, RecordType::Qa, true);
        let body = serde_json::to_value(req.to_body()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "query": "rivers of Europe",
                "numQuestions": 3,
                "type": "qa",
                "useTavily": true
            })
        );
    }

    #[test]
    fn test_mime_type_by_extension() {
        assert_eq!(UploadFile::new("notes.PDF", vec![]).mime_type(), "application/pdf");
        assert_eq!(UploadFile::new("scan.jpeg", vec![]).mime_type(), "image/jpeg");
        assert_eq!(UploadFile::new("README", vec![]).mime_type(), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_from_path_missing_file() {
        let result = UploadFile::from_path(Path::new("/no/such/dir/file.txt")).await;
        assert!(matches!(result, Err(AppError::File(_))));
    }
}
