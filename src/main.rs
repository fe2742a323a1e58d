use anyhow::Result;
use clap::Parser;

use znob::cli::{Args, RunOptions};
use znob::utils::logging;
use znob::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    let options = RunOptions::from_args(args)?;

    // 初始化并运行应用
    App::initialize(config, options)?.run().await?;

    Ok(())
}
