use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 后端 API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 用户输入校验错误
    #[error("输入错误: {0}")]
    Input(#[from] InputError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 后端 API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败（连接失败、超时等）
    #[error("{source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 后端返回非 2xx 状态码
    #[error("{endpoint} 返回状态码 {status}: {message:?}")]
    BadResponse {
        endpoint: String,
        status: u16,
        message: Option<String>,
    },
    /// 响应体不是合法 JSON
    #[error("{endpoint} 响应解析失败: {source}")]
    JsonParseFailed {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// 面向用户的错误文本
    ///
    /// 后端给出了 `error` 字段时原样使用，否则使用调用方提供的兜底文本；
    /// 网络层错误直接展示底层错误信息。
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::RequestFailed { source, .. } => source.to_string(),
            ApiError::BadResponse { message, .. } => match message {
                Some(msg) if !msg.is_empty() => msg.clone(),
                _ => fallback.to_string(),
            },
            ApiError::JsonParseFailed { source, .. } => source.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        match self {
            ApiError::RequestFailed { endpoint, .. }
            | ApiError::BadResponse { endpoint, .. }
            | ApiError::JsonParseFailed { endpoint, .. } => endpoint,
        }
    }
}

/// 用户输入错误，只通过通知反馈，不改变界面状态
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Please enter a query or topic.")]
    EmptyQuery,
    #[error("Number of questions must be at least 1.")]
    ZeroQuestionCount,
    #[error("Please select a file to upload.")]
    NoFileSelected,
    #[error("Unknown question type '{0}', expected 'mcq' or 'qa'.")]
    UnknownRecordType(String),
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("序列化失败: {0}")]
    SerializeFailed(#[from] serde_json::Error),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置文件解析失败
    #[error("配置文件 {path} 解析失败: {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 配置文件读取失败
    #[error("配置文件 {path} 读取失败: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// HTTP 客户端构建失败
    #[error("HTTP 客户端构建失败: {0}")]
    ClientBuildFailed(#[source] reqwest::Error),
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
