//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `cov-runtime`: 运行 stage-runtime 覆盖率
//! - `cov-workspace`: 运行 workspace 覆盖率
//! - `data-check`: 检查数据文件（动画数据表、动作配置）

use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};

use stage_runtime::{AnimationLibrary, MotionProfile};
use walkdir::WalkDir;

fn run(step: &str, cmd: &mut Command) -> anyhow::Result<()> {
    eprintln!("\n==> {step}");
    let status = cmd.status()?;
    if !status.success() {
        anyhow::bail!("{step} failed with {status}");
    }
    Ok(())
}

fn ensure_cargo_llvm_cov_available() -> anyhow::Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.args(["llvm-cov", "--version"]);
    match cmd.status() {
        Ok(s) if s.success() => Ok(()),
        _ => anyhow::bail!(
            "cargo llvm-cov 不可用。\n\
请先安装：\n\
  - cargo install cargo-llvm-cov\n\
  - rustup component add llvm-tools-preview\n\
然后重试。"
        ),
    }
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let sub = args.next().unwrap_or_else(|| "help".to_string());

    match sub.as_str() {
        "check-all" => {
            let mut fmt = Command::new("cargo");
            fmt.args(["fmt", "--all", "--", "--check"]);
            run("cargo fmt --all -- --check", &mut fmt)?;

            let mut clippy = Command::new("cargo");
            clippy.args(["clippy", "--workspace", "--all-targets"]);
            run("cargo clippy --workspace --all-targets", &mut clippy)?;

            let mut test = Command::new("cargo");
            test.args(["test", "--workspace"]);
            run("cargo test --workspace", &mut test)?;

            data_check(None)?;
        }
        "cov-runtime" => {
            ensure_cargo_llvm_cov_available()?;

            let mut cov = Command::new("cargo");
            cov.args(["llvm-cov", "-p", "stage-runtime", "--html"]);
            run("cargo llvm-cov -p stage-runtime --html", &mut cov)?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "cov-workspace" => {
            ensure_cargo_llvm_cov_available()?;

            // 排除 xtask，只看表现核心与宿主
            let mut cov = Command::new("cargo");
            cov.args(["llvm-cov", "--workspace", "--exclude", "xtask", "--html"]);
            run(
                "cargo llvm-cov --workspace --exclude xtask --html",
                &mut cov,
            )?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "data-check" => {
            let path = args.next();
            data_check(path.as_deref())?;
        }
        "help" | "-h" | "--help" => {
            print_help();
        }
        other => anyhow::bail!("unknown xtask subcommand: {other}"),
    }

    Ok(())
}

fn print_help() {
    eprintln!(
        r#"xtask - 开发辅助工具

USAGE:
  cargo xtask <command>

COMMANDS:
  check-all       运行 fmt、clippy、test 门禁检查，然后检查数据文件
  cov-runtime     运行 stage-runtime 覆盖率报告
  cov-workspace   运行 workspace 覆盖率报告
  data-check      检查数据文件

DATA-CHECK:
  cargo xtask data-check [path]

  不带参数：检查 host/data/ 下所有 .json 文件
  带路径参数：检查指定文件或目录

  profiles/ 目录下的文件按动作配置检查，其余按动画数据表检查：
    - JSON 语法错误
    - 动画 id 重复
    - 动作配置缺少必需的动作、帧数或图集布局无效
"#
    );
}

//=============================================================================
// data-check 命令实现
//=============================================================================

/// 默认数据目录（相对于 workspace root）
const DATA_DIR: &str = "host/data";

/// 数据文件的种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DataKind {
    Animations,
    Profile,
}

impl DataKind {
    fn of(path: &Path) -> Self {
        let in_profiles = path
            .parent()
            .and_then(|p| p.file_name())
            .is_some_and(|name| name == "profiles");
        if in_profiles {
            Self::Profile
        } else {
            Self::Animations
        }
    }
}

/// 执行数据检查
fn data_check(path: Option<&str>) -> anyhow::Result<()> {
    let root = PathBuf::from(path.unwrap_or(DATA_DIR));
    let files = if root.is_file() {
        vec![root]
    } else if root.is_dir() {
        collect_data_files(&root)
    } else {
        anyhow::bail!(
            "路径不存在: {}\n请在 workspace 根目录运行，或指定数据路径",
            root.display()
        );
    };

    if files.is_empty() {
        eprintln!("未找到数据文件（.json）");
        return Ok(());
    }

    eprintln!("\n==> 检查 {} 个数据文件...\n", files.len());

    let mut errors = 0;
    for file in &files {
        match check_data_file(file) {
            Ok(summary) => eprintln!("[OK] {}: {summary}", file.display()),
            Err(e) => {
                eprintln!("[ERROR] {}: {e}", file.display());
                errors += 1;
            }
        }
    }

    eprintln!();
    if errors > 0 {
        eprintln!("❌ {errors} 个错误");
        anyhow::bail!("数据检查发现错误");
    }
    eprintln!("✅ 检查通过，无错误");
    Ok(())
}

/// 收集目录下的所有 JSON 文件
fn collect_data_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<_> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

/// 检查单个文件，返回一行摘要
fn check_data_file(file: &Path) -> anyhow::Result<String> {
    let content = std::fs::read_to_string(file)?;
    // 先单独检查 JSON 语法，得到更准确的行列号
    serde_json::from_str::<serde_json::Value>(&content)?;

    match DataKind::of(file) {
        DataKind::Animations => {
            let library = AnimationLibrary::from_json(&content)?;
            Ok(format!("{} 个动画", library.len()))
        }
        DataKind::Profile => {
            let profile = MotionProfile::from_json(&content)?;
            Ok(format!("动作配置 {}", profile.name))
        }
    }
}
