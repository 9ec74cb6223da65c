//! # 示例应用程序
//!
//! 以任意顺序注册示例组件，然后在标准输入上运行交互式命令行

mod components;

use anyhow::Context;
use clap::Parser;
use components::{
    AnotherTest, ExampleTask, FirstTest, GreetingResource, HelperService, PointTest, SiteConfig,
    SomeOtherService,
};
use di_abstractions::ServiceRegistry;
use infrastructure_composition::{Infrastructure, InfrastructureBuilder, LoggingConfig};
use std::path::Path;
use tracing::info;

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "Lorn 服务容器示例应用")]
struct Args {
    /// 配置文件路径
    #[arg(short, long, default_value = "config/app.toml")]
    config: String,

    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: String,

    /// 依次执行的命令，给定后不进入交互模式
    #[arg(short = 'e', long = "exec")]
    commands: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut infrastructure = build_infrastructure(&args)?;
    register_components(&mut infrastructure)?;

    let stats = infrastructure.container().stats();
    info!(
        registered = stats.registered_components,
        pending = stats.pending_components,
        "示例组件注册完成"
    );

    let shell = infrastructure.shell()?;
    if !args.commands.is_empty() {
        for command in &args.commands {
            for line in shell.execute(command).texts() {
                println!("{line}");
            }
        }
        return Ok(());
    }

    let prompt = infrastructure.settings().shell.prompt.clone();
    tokio::task::spawn_blocking(move || {
        let stdin = std::io::stdin();
        shell.run(&prompt, stdin.lock(), std::io::stdout())
    })
    .await
    .context("命令行任务异常退出")??;

    info!("应用已关闭");
    Ok(())
}

/// 构建基础设施
fn build_infrastructure(args: &Args) -> anyhow::Result<Infrastructure> {
    let logging = LoggingConfig {
        level: parse_log_level(&args.log_level),
        ..LoggingConfig::default()
    };
    let mut builder = InfrastructureBuilder::new().with_logging(logging);

    if Path::new(&args.config).exists() {
        builder = builder.add_config_file(&args.config)?;
    } else {
        info!("配置文件不存在，将使用默认配置和环境变量: {}", args.config);
    }

    Ok(builder.build()?)
}

/// 依赖方先于被依赖方注册，解析顺序由容器决定
fn register_components(infrastructure: &mut Infrastructure) -> anyhow::Result<()> {
    infrastructure.register::<SomeOtherService>()?;
    infrastructure.register::<PointTest>()?;
    infrastructure.register::<FirstTest>()?;
    infrastructure.register::<ExampleTask>()?;
    infrastructure.register::<AnotherTest>()?;
    infrastructure.register::<HelperService>()?;
    infrastructure.register::<GreetingResource>()?;
    infrastructure.register_application()?;
    infrastructure.register::<SiteConfig>()?;

    let app = infrastructure.application()?;
    info!(settings = ?app.settings(), "应用设置");
    Ok(())
}

/// 解析日志级别
fn parse_log_level(level: &str) -> tracing::Level {
    level.parse().unwrap_or(tracing::Level::INFO)
}
