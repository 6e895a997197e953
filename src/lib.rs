//! # Quizgen Client
//!
//! 出题工具的客户端控制器：上传文档、请求生成题目、把后端返回的任意形状数据
//! 归一化为题目卡片，并支持导出和清空知识库。
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `clients/` - 后端接口（`/upload`、`/generate`、`/clear-db`），通过 `QuizBackend` 抽象
//! - `infrastructure/` - 唯一持有最近一次生成结果，负责导出 JSON 文件
//!
//! ### ② 业务能力层（Services）
//! - `Normalizer` - 识别负载形状并按策略提取记录，逐条校验
//! - `CardRenderer` - 记录转换为卡片描述
//! - `Notifier` - 带过期时间的通知队列
//!
//! ### ③ 流程层（Workflow）
//! - `ViewState` - 界面状态机（欢迎 / 加载 / 结果 / 错误 + 侧栏）
//!
//! ### ④ 编排层（Orchestration）
//! - `RequestOrchestrator` - 驱动三类异步操作，丢弃过期的生成结果
//!
//! ### ⑤ 展示层
//! - `ui/` - 把快照渲染为终端文本
//! - `app` - 交互式命令循环

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod ui;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use clients::{HttpBackend, QuizBackend};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{GenerationRequest, Record, RecordType, UploadFile};
pub use orchestrator::{ControllerSnapshot, RequestOrchestrator};
pub use services::{normalize, render};
pub use workflow::{UiState, ViewState};
