//! 生成结果存储 - 基础设施层
//!
//! 唯一持有"最近一次成功生成"的原始数据，只暴露保存、清除和导出能力。

use std::path::{Path, PathBuf};

use serde_json::Value as JsonValue;
use tracing::{debug, info};

use crate::error::{AppError, AppResult, FileError};

/// 导出文件名
pub const EXPORT_FILE_NAME: &str = "generated_questions.json";

/// 最近一次成功生成的原始负载
#[derive(Debug, Default)]
pub struct ArtifactStore {
    artifact: Option<JsonValue>,
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 保存原始负载（不做二次归一化）
    pub fn store(&mut self, payload: JsonValue) {
        debug!("保存生成结果，大小 {} 字节", payload.to_string().len());
        self.artifact = Some(payload);
    }

    pub fn clear(&mut self) {
        self.artifact = None;
    }

    pub fn get(&self) -> Option<&JsonValue> {
        self.artifact.as_ref()
    }

    pub fn is_present(&self) -> bool {
        self.artifact.is_some()
    }
}

/// 导出文本：两空格缩进的 JSON
pub fn render_export(payload: &JsonValue) -> AppResult<String> {
    serde_json::to_string_pretty(payload).map_err(|e| AppError::File(FileError::from(e)))
}

/// 写入导出文件，返回完整路径
pub async fn write_export(export_dir: &Path, payload: &JsonValue) -> AppResult<PathBuf> {
    let content = render_export(payload)?;
    let path = export_dir.join(EXPORT_FILE_NAME);

    tokio::fs::create_dir_all(export_dir)
        .await
        .map_err(|e| AppError::file_write_failed(export_dir.display().to_string(), e))?;
    tokio::fs::write(&path, content)
        .await
        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;

    info!("💾 已导出: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_store_and_clear() {
        let mut store = ArtifactStore::new();
        assert!(!store.is_present());
        store.store(json!({"mcq_list": []}));
        assert_eq!(store.get(), Some(&json!({"mcq_list": []})));
        store.clear();
        assert!(store.get().is_none());
    }

    #[test]
    fn test_render_uses_two_space_indent_and_key_order() {
        let payload: JsonValue =
            serde_json::from_str(r#"{"zeta":[1],"alpha":{"question":"Q"}}"#).unwrap();
        let text = render_export(&payload).unwrap();
        assert_eq!(
            text,
            "{\n  \"zeta\": [\n    1\n  ],\n  \"alpha\": {\n    \"question\": \"Q\"\n  }\n}"
        );
    }

    #[tokio::test]
    async fn test_write_export_creates_file() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("exports");
        let path = write_export(&dir, &json!([{"question": "Q", "answer": "A"}]))
            .await
            .unwrap();
        assert!(path.ends_with(EXPORT_FILE_NAME));

        let written = tokio::fs::read_to_string(&path).await.unwrap();
        let parsed: JsonValue = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, json!([{"question": "Q", "answer": "A"}]));
    }
}
