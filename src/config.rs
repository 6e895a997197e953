use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ConfigError;

/// 默认配置文件名（位于工作目录）
const DEFAULT_CONFIG_FILE: &str = "quizgen.toml";

/// 程序配置
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// 后端服务地址（提供 /upload /generate /clear-db）
    pub backend_base_url: String,
    /// 请求超时（秒），None 表示使用传输层默认行为
    pub request_timeout_secs: Option<u64>,
    /// 导出文件目录
    pub export_dir: PathBuf,
    /// 通知显示时长（毫秒）
    pub notification_duration_ms: u64,
    /// 默认生成题目数量
    pub default_question_count: u32,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_base_url: "http://127.0.0.1:5001".to_string(),
            request_timeout_secs: None,
            export_dir: PathBuf::from("."),
            notification_duration_ms: 4000,
            default_question_count: 5,
            verbose_logging: false,
        }
    }
}

/// 配置文件内容，所有字段可选
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    backend_base_url: Option<String>,
    request_timeout_secs: Option<u64>,
    export_dir: Option<PathBuf>,
    notification_duration_ms: Option<u64>,
    default_question_count: Option<u32>,
    verbose_logging: Option<bool>,
}

impl Config {
    /// 加载配置：默认值 → 配置文件 → 环境变量
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        match std::env::var("QUIZGEN_CONFIG") {
            Ok(path) => config = config.merge_file(Path::new(&path))?,
            Err(_) => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    config = config.merge_file(default_path)?;
                }
            }
        }

        Ok(config.apply_env())
    }

    /// 仅从环境变量构建配置
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    /// 合并 TOML 配置文件
    pub fn merge_file(self, path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        debug!("读取配置文件: {}", path.display());
        self.merge_toml(&content, &path.display().to_string())
    }

    fn merge_toml(self, content: &str, origin: &str) -> Result<Self, ConfigError> {
        let file: FileConfig =
            toml::from_str(content).map_err(|source| ConfigError::TomlParseFailed {
                path: origin.to_string(),
                source,
            })?;

        Ok(Self {
            backend_base_url: file.backend_base_url.unwrap_or(self.backend_base_url),
            request_timeout_secs: file.request_timeout_secs.or(self.request_timeout_secs),
            export_dir: file.export_dir.unwrap_or(self.export_dir),
            notification_duration_ms: file
                .notification_duration_ms
                .unwrap_or(self.notification_duration_ms),
            default_question_count: file
                .default_question_count
                .unwrap_or(self.default_question_count),
            verbose_logging: file.verbose_logging.unwrap_or(self.verbose_logging),
        })
    }

    fn apply_env(self) -> Self {
        Self {
            backend_base_url: std::env::var("QUIZGEN_BACKEND_URL")
                .unwrap_or(self.backend_base_url),
            request_timeout_secs: parse_env("QUIZGEN_REQUEST_TIMEOUT_SECS")
                .or(self.request_timeout_secs),
            export_dir: std::env::var("QUIZGEN_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or(self.export_dir),
            notification_duration_ms: parse_env("QUIZGEN_NOTIFICATION_MS")
                .unwrap_or(self.notification_duration_ms),
            default_question_count: parse_env("QUIZGEN_DEFAULT_COUNT")
                .unwrap_or(self.default_question_count),
            verbose_logging: parse_env("QUIZGEN_VERBOSE").unwrap_or(self.verbose_logging),
        }
    }

    /// 导出文件完整路径
    pub fn export_path(&self) -> PathBuf {
        self.export_dir.join(crate::infrastructure::EXPORT_FILE_NAME)
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("环境变量 {} 的值 '{}' 无法解析，已忽略", name, raw);
            None
        }
    }
}
