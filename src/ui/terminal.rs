//! 终端展示
//!
//! 把控制器快照渲染成纯文本，不持有任何状态。

use std::fmt::Write;

use crate::models::CardDescriptor;
use crate::orchestrator::ControllerSnapshot;
use crate::services::Severity;
use crate::workflow::{ContextPanel, UiState};

const WELCOME: &str = "Upload a document, then enter a topic to generate questions.";
const TIPS: [&str; 3] = [
    "Upload PDF, DOCX, PPTX, TXT or image files to build the knowledge base.",
    "Be specific in your query for more focused questions.",
    "Enable web search to supplement your documents with fresh sources.",
];
const SKELETON: &str = "  ░░░░░░░░░░░░░░░░░░░░░░░░░░░░";

/// 渲染完整界面
pub fn render_snapshot(snapshot: &ControllerSnapshot) -> String {
    let mut out = String::new();

    for n in &snapshot.notifications {
        let icon = match n.severity {
            Severity::Success => "✔",
            Severity::Info => "ℹ",
            Severity::Error => "✖",
        };
        let _ = writeln!(out, "[{}] {} {}", n.id, icon, n.message);
    }
    if !snapshot.notifications.is_empty() {
        out.push('\n');
    }

    render_context(&mut out, &snapshot.view.context);
    out.push('\n');
    render_main(&mut out, &snapshot.view.ui);

    if snapshot.view.download_available {
        out.push_str("\n(type `export` to save generated_questions.json)\n");
    }
    if let Some(status) = &snapshot.upload_status {
        let _ = writeln!(out, "\nfile: {}", status);
    }
    let busy = &snapshot.busy;
    if busy.any() {
        let _ = writeln!(
            out,
            "busy: uploading={} generating={} clearing={}",
            busy.uploading, busy.generating, busy.clearing
        );
    }
    out
}

fn render_context(out: &mut String, context: &ContextPanel) {
    match context {
        ContextPanel::Tips => {
            out.push_str("── Tips ──\n");
            for tip in TIPS {
                let _ = writeln!(out, "  • {}", tip);
            }
        }
        ContextPanel::Details(d) => {
            out.push_str("── Generation details ──\n");
            let _ = writeln!(out, "  Query: {}", d.query);
            let _ = writeln!(out, "  Type: {}", d.summary());
            let _ = writeln!(out, "  Web search: {}", d.web_search_label());
        }
    }
}

fn render_main(out: &mut String, ui: &UiState) {
    match ui {
        UiState::Welcome => {
            let _ = writeln!(out, "{}", WELCOME);
        }
        UiState::Loading { slots } => {
            for _ in 0..*slots {
                let _ = writeln!(out, "{}", SKELETON);
            }
        }
        UiState::Results { cards } => {
            for card in cards {
                render_card(out, card);
                out.push('\n');
            }
        }
        UiState::Error { message } => {
            let _ = writeln!(out, "Error: {}", message);
        }
    }
}

/// 渲染单张卡片，正确选项以 `*` 标记
pub fn render_card(out: &mut String, card: &CardDescriptor) {
    match card {
        CardDescriptor::Mcq(c) => {
            let _ = writeln!(out, "{}", c.heading);
            for option in &c.options {
                let marker = if option.is_correct { '*' } else { ' ' };
                let _ = writeln!(out, "  {} {}. {}", marker, option.label, option.text);
            }
            let _ = writeln!(out, "  Explanation: {}", c.explanation);
        }
        CardDescriptor::Qa(c) => {
            let _ = writeln!(out, "{}", c.heading);
            let _ = writeln!(out, "  Answer: {}", c.answer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{McqCard, OptionDescriptor, RecordType};
    use crate::orchestrator::BusyFlags;
    use crate::workflow::{GenerationDetails, ViewState};

    fn snapshot(view: ViewState) -> ControllerSnapshot {
        ControllerSnapshot {
            view,
            busy: BusyFlags::default(),
            has_artifact: false,
            upload_status: None,
            notifications: Vec::new(),
        }
    }

    #[test]
    fn test_welcome_shows_tips() {
        let text = render_snapshot(&snapshot(ViewState::default()));
        assert!(text.contains("── Tips ──"));
        assert!(text.contains(WELCOME));
    }

    #[test]
    fn test_loading_shows_one_skeleton_per_slot() {
        let view = ViewState {
            ui: UiState::Loading { slots: 3 },
            context: ContextPanel::Details(GenerationDetails {
                query: "tides".to_string(),
                question_count: 3,
                record_type: RecordType::Qa,
                use_web_search: false,
            }),
            download_available: false,
        };
        let text = render_snapshot(&snapshot(view));
        assert_eq!(text.matches(SKELETON).count(), 3);
        assert!(text.contains("Type: 3 QA Questions"));
        assert!(text.contains("Web search: Disabled"));
    }

    #[test]
    fn test_mcq_card_marks_correct_option() {
        let card = CardDescriptor::Mcq(McqCard {
            number: 1,
            heading: "1. Q".to_string(),
            options: vec![
                OptionDescriptor {
                    label: "A".to_string(),
                    text: "wrong".to_string(),
                    is_correct: false,
                },
                OptionDescriptor {
                    label: "B".to_string(),
                    text: "right".to_string(),
                    is_correct: true,
                },
            ],
            explanation: "why".to_string(),
        });
        let mut out = String::new();
        render_card(&mut out, &card);
        assert!(out.contains("    A. wrong"));
        assert!(out.contains("  * B. right"));
    }
}
