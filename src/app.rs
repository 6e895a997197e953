//! 终端交互入口
//!
//! 逐行读取命令，交给编排器执行，每条命令后打印当前界面。

use std::path::PathBuf;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, info};

use crate::clients::HttpBackend;
use crate::config::Config;
use crate::models::{GenerationRequest, RecordType, UploadFile};
use crate::orchestrator::{RequestOrchestrator, CLEAR_CONFIRM_PROMPT};
use crate::services::Severity;
use crate::ui::render_snapshot;

const HELP: &str = "\
Commands:
  upload [path]                               upload a document to the knowledge base
  generate <mcq|qa> [-n N] [--web] <query>    generate N questions about a topic
  clear                                       clear the knowledge base (asks for confirmation)
  export                                      save the last generated questions as JSON
  dismiss <id>                                dismiss a notification
  show                                        redraw the current screen
  help                                        show this message
  quit                                        exit";

/// 一条解析后的命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Upload(Option<PathBuf>),
    Generate(GenerationRequest),
    Clear,
    Export,
    Dismiss(u64),
    Show,
    Help,
    Quit,
}

impl Command {
    /// 解析一行输入；空行返回 `Ok(None)`
    pub fn parse(line: &str, default_count: u32) -> std::result::Result<Option<Self>, String> {
        let mut tokens = line.split_whitespace();
        let Some(head) = tokens.next() else {
            return Ok(None);
        };

        let command = match head.to_ascii_lowercase().as_str() {
            "upload" => Command::Upload(tokens.next().map(PathBuf::from)),
            "generate" | "gen" => Command::Generate(parse_generate(tokens, default_count)?),
            "clear" => Command::Clear,
            "export" | "download" => Command::Export,
            "dismiss" => {
                let id = tokens
                    .next()
                    .and_then(|s| s.parse().ok())
                    .ok_or_else(|| "Usage: dismiss <id>".to_string())?;
                Command::Dismiss(id)
            }
            "show" => Command::Show,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(format!("Unknown command: {}", other)),
        };
        Ok(Some(command))
    }
}

fn parse_generate<'a>(
    mut tokens: impl Iterator<Item = &'a str>,
    default_count: u32,
) -> std::result::Result<GenerationRequest, String> {
    const USAGE: &str = "Usage: generate <mcq|qa> [-n N] [--web] <query>";

    let record_type = tokens
        .next()
        .ok_or_else(|| USAGE.to_string())?
        .parse::<RecordType>()
        .map_err(|e| e.to_string())?;

    let mut count = default_count;
    let mut use_web_search = false;
    let mut words = Vec::new();
    while let Some(token) = tokens.next() {
        match token {
            "--web" => use_web_search = true,
            "-n" | "--count" => {
                let value = tokens.next().ok_or_else(|| USAGE.to_string())?;
                count = value
                    .parse()
                    .map_err(|_| format!("Invalid question count: {}", value))?;
            }
            word => words.push(word),
        }
    }

    Ok(GenerationRequest::new(
        words.join(" "),
        count,
        record_type,
        use_web_search,
    ))
}

/// 应用主结构
pub struct App {
    config: Config,
    orchestrator: RequestOrchestrator<HttpBackend>,
}

impl App {
    /// 初始化应用
    pub fn new(config: Config) -> Result<Self> {
        let backend = HttpBackend::new(&config)?;
        let orchestrator = RequestOrchestrator::new(
            backend,
            config.export_dir.clone(),
            config.notification_duration_ms,
        );
        Ok(Self {
            config,
            orchestrator,
        })
    }

    /// 运行主循环，直到 `quit` 或输入结束
    pub async fn run(&self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        println!("{}\n", HELP);
        self.show().await;

        loop {
            print_prompt("> ");
            let Some(line) = lines.next_line().await? else {
                break;
            };

            let command = match Command::parse(&line, self.config.default_question_count) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(message) => {
                    self.orchestrator.notify(message, Severity::Error).await;
                    self.show().await;
                    continue;
                }
            };
            debug!("执行命令: {:?}", command);

            match command {
                Command::Quit => break,
                Command::Help => {
                    println!("{}", HELP);
                    continue;
                }
                Command::Show => {}
                Command::Upload(path) => self.upload(path).await,
                Command::Generate(request) => {
                    self.orchestrator.generate(request).await;
                }
                Command::Clear => {
                    let confirmed = confirm(&mut lines, CLEAR_CONFIRM_PROMPT).await?;
                    self.orchestrator
                        .clear_all(&move |_: &str| confirmed)
                        .await;
                }
                Command::Export => {
                    self.orchestrator.export_artifact().await;
                }
                Command::Dismiss(id) => {
                    self.orchestrator.dismiss(id).await;
                }
            }
            self.show().await;
        }

        info!("👋 退出");
        Ok(())
    }

    async fn upload(&self, path: Option<PathBuf>) {
        let file = match path {
            Some(path) => match UploadFile::from_path(&path).await {
                Ok(file) => {
                    self.orchestrator.select_file(&file).await;
                    Some(file)
                }
                Err(e) => {
                    self.orchestrator.notify(e.to_string(), Severity::Error).await;
                    return;
                }
            },
            None => None,
        };
        self.orchestrator.upload(file).await;
    }

    async fn show(&self) {
        println!("{}", render_snapshot(&self.orchestrator.snapshot().await));
    }
}

fn print_prompt(prompt: &str) {
    use std::io::Write;
    print!("{}", prompt);
    let _ = std::io::stdout().flush();
}

/// 询问 y/N，输入结束视为取消
async fn confirm(lines: &mut Lines<BufReader<Stdin>>, prompt: &str) -> Result<bool> {
    print_prompt(&format!("{} [y/N] ", prompt));
    let answer = lines.next_line().await?.unwrap_or_default();
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
