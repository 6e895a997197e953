use anyhow::Result;
use quizgen_client::utils::logging;
use quizgen_client::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    logging::init(config.verbose_logging);
    logging::log_startup(&config);

    // 初始化并运行应用
    App::new(config)?.run().await?;

    Ok(())
}
