//! Battle Stage - 无渲染宿主
//!
//! 按帧驱动场景控制器与战斗画面，输出场景轨迹。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p stage-host -- --auto --frames 1200
//! cargo run -p stage-host -- --command 5:new_game --command 150:encounter
//! cargo run -p stage-host -- --battle-test --auto --log-level debug
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use stage_host::{AppConfig, HostError, InputManager, StageApp};
use tracing::{Level, error, info};

#[derive(Parser)]
#[command(name = "stage-host")]
#[command(about = "战斗画面表现核心的无渲染宿主")]
#[command(version)]
struct Cli {
    /// 配置文件（默认：config.json）
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// 最多运行的帧数（默认：600）
    #[arg(short, long, default_value = "600")]
    frames: u64,

    /// 日志级别，覆盖配置文件
    #[arg(short, long)]
    log_level: Option<String>,

    /// 脚本指令，格式为 帧号:指令（可重复）
    #[arg(long = "command", value_name = "FRAME:COMMAND")]
    commands: Vec<String>,

    /// 直接进入战斗测试
    #[arg(long)]
    battle_test: bool,

    /// 没有指令时自动推进
    #[arg(long)]
    auto: bool,
}

fn parse_level(name: &str) -> Level {
    name.parse().unwrap_or(Level::INFO)
}

fn init_logging(level: Level) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), HostError> {
    let mut config = AppConfig::load(&cli.config);
    if cli.battle_test {
        config.battle_test = true;
    }
    let input = InputManager::from_entries(&cli.commands)?;

    let mut app = StageApp::new(&config, input, cli.auto)?;
    let frames = app.run(cli.frames)?;

    info!(frames, exited = app.is_exited(), "运行完成");
    for entry in app.trace() {
        println!("{:>6}  {}", entry.frame, entry.scene);
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // 日志级别：命令行 > 配置文件 > info
    let level = match &cli.log_level {
        Some(level) => parse_level(level),
        None => parse_level(&AppConfig::load(&cli.config).debug.log_level),
    };
    init_logging(level);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "运行失败");
            eprintln!("❌ {e}");
            ExitCode::FAILURE
        }
    }
}
