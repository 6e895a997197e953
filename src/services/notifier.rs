//! 通知服务
//!
//! 只负责"弹出一条短暂、可关闭的通知"，与其他状态无关。

use chrono::{DateTime, Duration, Local};
use tracing::{error, info};

/// 通知最长显示一天
const MAX_DURATION_MS: u64 = 86_400_000;

/// 通知级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Error,
}

impl Severity {
    /// 后端 `type` 字段映射，未知值按 info 处理
    pub fn from_server_type(kind: &str) -> Self {
        match kind {
            "success" => Severity::Success,
            "error" => Severity::Error,
            _ => Severity::Info,
        }
    }
}

/// 单条通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
    pub created_at: DateTime<Local>,
    pub expires_at: DateTime<Local>,
}

/// 通知队列
#[derive(Debug)]
pub struct Notifier {
    active: Vec<Notification>,
    next_id: u64,
    duration: Duration,
}

impl Notifier {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            active: Vec::new(),
            next_id: 1,
            duration: Duration::milliseconds(duration_ms.min(MAX_DURATION_MS) as i64),
        }
    }

    /// 发出通知，返回通知 id
    pub fn notify(&mut self, message: impl Into<String>, severity: Severity) -> u64 {
        self.notify_at(message, severity, Local::now())
    }

    pub fn notify_at(
        &mut self,
        message: impl Into<String>,
        severity: Severity,
        now: DateTime<Local>,
    ) -> u64 {
        let message = message.into();
        match severity {
            Severity::Error => error!("🔔 {}", message),
            _ => info!("🔔 {}", message),
        }

        let id = self.next_id;
        self.next_id += 1;
        self.active.push(Notification {
            id,
            message,
            severity,
            created_at: now,
            expires_at: now + self.duration,
        });
        id
    }

    /// 手动关闭，返回是否存在该通知
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.active.len();
        self.active.retain(|n| n.id != id);
        self.active.len() != before
    }

    /// 清除已过期的通知
    pub fn prune_expired(&mut self, now: DateTime<Local>) {
        self.active.retain(|n| n.expires_at > now);
    }

    /// 当前可见的通知（按发出顺序）
    pub fn active(&self) -> &[Notification] {
        &self.active
    }
}
