//! 请求编排器
//!
//! 驱动上传、生成、清库三类异步操作，唯一有权修改界面状态和生成结果。
//! 互斥锁只在两次网络调用之间短暂持有，不跨越 await。

use std::path::PathBuf;

use chrono::Local;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::clients::QuizBackend;
use crate::error::InputError;
use crate::infrastructure::{write_export, ArtifactStore};
use crate::models::{GenerationRequest, UploadFile};
use crate::services::{normalize, render, NormalizationFailure, Notification, Notifier, Severity};
use crate::utils::logging::truncate_text;
use crate::workflow::{GenerationDetails, ViewEvent, ViewState};

/// 清库前的确认提示
pub const CLEAR_CONFIRM_PROMPT: &str =
    "Are you sure you want to clear the entire database? This action cannot be undone.";

const UPLOAD_FALLBACK: &str = "File upload failed.";
const GENERATE_FALLBACK: &str = "Failed to generate questions.";
const CLEAR_FALLBACK: &str = "Failed to clear database.";
const NO_EXPORT_DATA: &str = "No data to download.";

/// 破坏性操作的用户确认
pub trait Confirmer {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirmer for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// 各操作的进行中计数（只用于按钮忙碌状态，不阻止其他操作）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusyFlags {
    pub uploading: u32,
    pub generating: u32,
    pub clearing: u32,
}

impl BusyFlags {
    pub fn any(&self) -> bool {
        self.uploading + self.generating + self.clearing > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// 未选择文件
    Rejected,
    Uploaded { message: String },
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    Rejected(InputError),
    Rendered { records: usize, dropped: usize },
    NormalizationFailed(NormalizationFailure),
    Failed { message: String },
    /// 结果返回时已有更新的操作，丢弃
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearOutcome {
    Cancelled,
    Cleared { message: String },
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Missing,
    Written(PathBuf),
    Failed { message: String },
}

/// 某一时刻的完整可见状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSnapshot {
    pub view: ViewState,
    pub busy: BusyFlags,
    pub has_artifact: bool,
    pub upload_status: Option<String>,
    pub notifications: Vec<Notification>,
}

/// 共享可变状态
#[derive(Debug, Default)]
struct Session {
    view: ViewState,
    artifacts: ArtifactStore,
    busy: BusyFlags,
    upload_status: Option<String>,
    /// 单调递增的操作代数，生成结果返回时与之比较以丢弃过期结果
    epoch: u64,
}

impl Session {
    fn reset(&mut self) {
        self.view = std::mem::take(&mut self.view).apply(ViewEvent::Reset);
        self.epoch += 1;
    }
}

/// 请求编排器
pub struct RequestOrchestrator<B: QuizBackend> {
    backend: B,
    session: Mutex<Session>,
    notifier: Mutex<Notifier>,
    export_dir: PathBuf,
}

impl<B: QuizBackend> RequestOrchestrator<B> {
    pub fn new(backend: B, export_dir: impl Into<PathBuf>, notification_duration_ms: u64) -> Self {
        Self {
            backend,
            session: Mutex::new(Session::default()),
            notifier: Mutex::new(Notifier::new(notification_duration_ms)),
            export_dir: export_dir.into(),
        }
    }

    /// 选择文件后更新状态提示
    pub async fn select_file(&self, file: &UploadFile) {
        self.session.lock().await.upload_status = Some(format!("{} selected", file.file_name));
    }

    /// 上传文档，无论成功失败都整体复位到欢迎状态
    pub async fn upload(&self, file: Option<UploadFile>) -> UploadOutcome {
        let Some(file) = file else {
            self.notify(InputError::NoFileSelected.to_string(), Severity::Error)
                .await;
            return UploadOutcome::Rejected;
        };

        {
            let mut session = self.session.lock().await;
            session.busy.uploading += 1;
            session.upload_status = Some("Processing file...".to_string());
        }
        info!("📤 正在上传 {}", file.file_name);

        let result = self.backend.upload(&file).await;

        let outcome = {
            let mut session = self.session.lock().await;
            session.busy.uploading = session.busy.uploading.saturating_sub(1);
            session.reset();
            match result {
                Ok(resp) => {
                    session.upload_status = Some("Upload successful!".to_string());
                    UploadOutcome::Uploaded {
                        message: resp.message,
                    }
                }
                Err(e) => {
                    warn!("上传失败 ({}): {}", e.endpoint(), e);
                    session.upload_status = Some("Upload failed.".to_string());
                    UploadOutcome::Failed {
                        message: e.user_message(UPLOAD_FALLBACK),
                    }
                }
            }
        };

        match &outcome {
            UploadOutcome::Uploaded { message } => {
                self.notify(message.clone(), Severity::Success).await;
            }
            UploadOutcome::Failed { message } => {
                self.notify(message.clone(), Severity::Error).await;
            }
            UploadOutcome::Rejected => {}
        }
        outcome
    }

    /// 生成题目
    ///
    /// 空主题直接拒绝且不改变界面；否则进入加载状态并在请求结束后切换到结果或错误。
    pub async fn generate(&self, request: GenerationRequest) -> GenerateOutcome {
        if let Err(e) = request.validate() {
            self.notify(e.to_string(), Severity::Error).await;
            return GenerateOutcome::Rejected(e);
        }

        let ticket = {
            let mut session = self.session.lock().await;
            session.epoch += 1;
            session.artifacts.clear();
            session.busy.generating += 1;
            session.view = std::mem::take(&mut session.view)
                .apply(ViewEvent::GenerationStarted(GenerationDetails::from(&request)));
            session.epoch
        };
        info!(
            "🤖 第 {} 次生成: {} 道 {} 题目，主题: {}",
            ticket,
            request.question_count,
            request.record_type,
            truncate_text(&request.query, 60)
        );

        let result = self.backend.generate(&request).await;

        let outcome = {
            let mut session = self.session.lock().await;
            session.busy.generating = session.busy.generating.saturating_sub(1);

            if session.epoch != ticket {
                debug!(
                    "丢弃过期的第 {} 次生成结果（当前第 {} 次）",
                    ticket, session.epoch
                );
                return GenerateOutcome::Superseded;
            }

            let (event, outcome) = match result {
                Ok(data) => match normalize(&data, request.record_type) {
                    Ok(batch) => {
                        let cards = render(&batch.records);
                        session.artifacts.store(data);
                        (
                            ViewEvent::GenerationSucceeded(cards),
                            GenerateOutcome::Rendered {
                                records: batch.records.len(),
                                dropped: batch.dropped,
                            },
                        )
                    }
                    Err(failure) => {
                        warn!("归一化失败: {:?}", failure);
                        (
                            ViewEvent::GenerationFailed(failure.to_string()),
                            GenerateOutcome::NormalizationFailed(failure),
                        )
                    }
                },
                Err(e) => {
                    warn!("生成失败 ({}): {}", e.endpoint(), e);
                    let message = e.user_message(GENERATE_FALLBACK);
                    (
                        ViewEvent::GenerationFailed(message.clone()),
                        GenerateOutcome::Failed { message },
                    )
                }
            };
            session.view = std::mem::take(&mut session.view).apply(event);
            outcome
        };

        if let GenerateOutcome::Rendered { records, dropped } = outcome {
            info!("✓ 生成完成，渲染 {} 道题目", records);
            if dropped > 0 {
                self.notify(
                    format!(
                        "Rendered {} of {} questions ({} malformed entries skipped).",
                        records,
                        records + dropped,
                        dropped
                    ),
                    Severity::Info,
                )
                .await;
            }
        }
        outcome
    }

    /// 清空后端知识库（需要用户确认）
    pub async fn clear_all(&self, confirmer: &dyn Confirmer) -> ClearOutcome {
        if !confirmer.confirm(CLEAR_CONFIRM_PROMPT) {
            debug!("用户取消清库");
            return ClearOutcome::Cancelled;
        }

        self.session.lock().await.busy.clearing += 1;
        info!("🗑️ 正在清空知识库...");

        let result = self.backend.clear_db().await;

        let (outcome, severity) = {
            let mut session = self.session.lock().await;
            session.busy.clearing = session.busy.clearing.saturating_sub(1);
            match result {
                Ok(resp) => {
                    session.reset();
                    session.artifacts.clear();
                    (
                        ClearOutcome::Cleared {
                            message: resp.message,
                        },
                        Severity::from_server_type(&resp.kind),
                    )
                }
                Err(e) => {
                    warn!("清库失败 ({}): {}", e.endpoint(), e);
                    (
                        ClearOutcome::Failed {
                            message: e.user_message(CLEAR_FALLBACK),
                        },
                        Severity::Error,
                    )
                }
            }
        };

        match &outcome {
            ClearOutcome::Cleared { message } | ClearOutcome::Failed { message } => {
                self.notify(message.clone(), severity).await;
            }
            ClearOutcome::Cancelled => {}
        }
        outcome
    }

    /// 导出最近一次成功生成的原始数据
    pub async fn export_artifact(&self) -> ExportOutcome {
        let payload = self.session.lock().await.artifacts.get().cloned();
        let Some(payload) = payload else {
            self.notify(NO_EXPORT_DATA, Severity::Error).await;
            return ExportOutcome::Missing;
        };

        match write_export(&self.export_dir, &payload).await {
            Ok(path) => {
                self.notify(format!("Saved {}", path.display()), Severity::Success)
                    .await;
                ExportOutcome::Written(path)
            }
            Err(e) => {
                let message = e.to_string();
                self.notify(message.clone(), Severity::Error).await;
                ExportOutcome::Failed { message }
            }
        }
    }

    /// 发出一条通知
    pub async fn notify(&self, message: impl Into<String>, severity: Severity) -> u64 {
        self.notifier.lock().await.notify(message, severity)
    }

    pub async fn dismiss(&self, id: u64) -> bool {
        self.notifier.lock().await.dismiss(id)
    }

    /// 当前状态快照（顺带清理过期通知）
    pub async fn snapshot(&self) -> ControllerSnapshot {
        let notifications = {
            let mut notifier = self.notifier.lock().await;
            notifier.prune_expired(Local::now());
            notifier.active().to_vec()
        };
        let session = self.session.lock().await;
        ControllerSnapshot {
            view: session.view.clone(),
            busy: session.busy,
            has_artifact: session.artifacts.is_present(),
            upload_status: session.upload_status.clone(),
            notifications,
        }
    }
}
