//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层是整个客户端的"指挥中心"：接收用户操作，发起网络调用，
//! 把结果依次交给归一化、渲染和界面状态机，并通过通知反馈结果。
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::RequestOrchestrator (upload / generate / clear / export)
//!     ↓
//! workflow::view_state (界面状态迁移)
//!     ↓
//! services (能力层：normalizer / card_renderer / notifier)
//!     ↓
//! clients + infrastructure (后端接口、生成结果存储)
//! ```

pub mod request_orchestrator;

pub use request_orchestrator::{
    BusyFlags, ClearOutcome, Confirmer, ControllerSnapshot, ExportOutcome, GenerateOutcome,
    RequestOrchestrator, UploadOutcome, CLEAR_CONFIRM_PROMPT,
};
