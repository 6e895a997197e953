//! 界面状态机 - 流程层
//!
//! 主展示区同一时刻只有一种状态（欢迎 / 加载骨架 / 结果 / 错误），
//! 侧边上下文面板独立表示，但只在加载和结果状态下显示生成详情。
//!
//! 所有迁移都是 `(ViewState, ViewEvent) -> ViewState` 的全函数，
//! 切换状态时旧状态的内容随旧值一起被丢弃。

use crate::models::{CardDescriptor, GenerationRequest, RecordType};

/// 主展示区状态
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UiState {
    #[default]
    Welcome,
    /// 显示 `slots` 个占位骨架
    Loading { slots: u32 },
    Results { cards: Vec<CardDescriptor> },
    Error { message: String },
}

/// 本次生成的参数（展示在上下文面板）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationDetails {
    pub query: String,
    pub question_count: u32,
    pub record_type: RecordType,
    pub use_web_search: bool,
}

impl GenerationDetails {
    /// 如 "5 MCQ Questions"
    pub fn summary(&self) -> String {
        format!(
            "{} {} Questions",
            self.question_count,
            self.record_type.as_str().to_uppercase()
        )
    }

    pub fn web_search_label(&self) -> &'static str {
        if self.use_web_search {
            "Enabled"
        } else {
            "Disabled"
        }
    }
}

impl From<&GenerationRequest> for GenerationDetails {
    fn from(req: &GenerationRequest) -> Self {
        Self {
            query: req.query.clone(),
            question_count: req.question_count,
            record_type: req.record_type,
            use_web_search: req.use_web_search,
        }
    }
}

/// 上下文面板状态
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ContextPanel {
    #[default]
    Tips,
    Details(GenerationDetails),
}

/// 完整的可见状态
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    pub ui: UiState,
    pub context: ContextPanel,
    /// 导出按钮是否可见
    pub download_available: bool,
}

/// 驱动状态迁移的事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    GenerationStarted(GenerationDetails),
    GenerationSucceeded(Vec<CardDescriptor>),
    GenerationFailed(String),
    /// 上传完成或清库完成后的整体复位
    Reset,
}

impl ViewState {
    /// 加载状态下的骨架数量
    pub fn skeleton_slots(&self) -> u32 {
        match self.ui {
            UiState::Loading { slots } => slots,
            _ => 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.ui, UiState::Loading { .. })
    }

    /// 生成详情只在加载或结果状态下出现
    pub fn is_consistent(&self) -> bool {
        match self.context {
            ContextPanel::Details(_) => {
                matches!(self.ui, UiState::Loading { .. } | UiState::Results { .. })
            }
            ContextPanel::Tips => true,
        }
    }

    pub fn apply(self, event: ViewEvent) -> Self {
        transition(self, event)
    }
}

/// 状态迁移
///
/// 生成结果（成功或失败）只在加载状态下生效，其他状态下收到时保持不变。
pub fn transition(state: ViewState, event: ViewEvent) -> ViewState {
    match event {
        ViewEvent::GenerationStarted(details) => ViewState {
            ui: UiState::Loading {
                slots: details.question_count,
            },
            context: ContextPanel::Details(details),
            download_available: false,
        },
        ViewEvent::GenerationSucceeded(cards) if state.is_loading() => ViewState {
            ui: UiState::Results { cards },
            context: state.context,
            download_available: true,
        },
        ViewEvent::GenerationFailed(message) if state.is_loading() => ViewState {
            ui: UiState::Error { message },
            context: ContextPanel::Tips,
            download_available: false,
        },
        ViewEvent::GenerationSucceeded(_) | ViewEvent::GenerationFailed(_) => state,
        ViewEvent::Reset => ViewState::default(),
    }
}
