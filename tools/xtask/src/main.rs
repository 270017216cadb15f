//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `cov-runtime`: 运行 pagewave-runtime 覆盖率
//! - `cov-workspace`: 运行 workspace 覆盖率
//! - `build-web`: 构建浏览器端 wasm
//! - `config-check`: 检查页面过渡配置文件（选项、变体、预设样式表）

use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};

use pagewave_runtime::{PageWaveConfig, TransitionSet, Variant};
use walkdir::WalkDir;

/// 配置文件后缀
const CONFIG_SUFFIX: &str = ".pagewave.json";

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
    let status = cmd.status();
    match status {
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
        }
        "cov-runtime" => {
            ensure_cargo_llvm_cov_available()?;

            let mut cov = Command::new("cargo");
            cov.args(["llvm-cov", "-p", "pagewave-runtime", "--html"]);
            run("cargo llvm-cov -p pagewave-runtime --html", &mut cov)?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "cov-workspace" => {
            ensure_cargo_llvm_cov_available()?;

            // web feature 只能在 wasm 目标上构建，这里不打开
            let mut cov = Command::new("cargo");
            cov.args(["llvm-cov", "--workspace", "--exclude", "xtask", "--html"]);
            run(
                "cargo llvm-cov --workspace --exclude xtask --html",
                &mut cov,
            )?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "build-web" => {
            let mut build = Command::new("cargo");
            build.args([
                "build",
                "-p",
                "host-web",
                "--features",
                "web",
                "--target",
                "wasm32-unknown-unknown",
                "--release",
            ]);
            run(
                "cargo build -p host-web --features web --target wasm32-unknown-unknown --release",
                &mut build,
            )?;
        }
        "config-check" => {
            let path = args.next();
            config_check(path.as_deref())?;
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
  check-all       运行 fmt、clippy、test 门禁检查
  cov-runtime     运行 pagewave-runtime 覆盖率报告
  cov-workspace   运行 workspace 覆盖率报告
  build-web       构建 wasm32 浏览器端
  config-check    检查页面过渡配置文件

CONFIG-CHECK:
  cargo xtask config-check [path]

  不带参数：检查当前目录下所有 *.pagewave.json 文件
  带路径参数：检查指定文件或目录

  文件格式：
    {{ "options": {{ ... }}, "transitions": {{ "base": ..., "overlay": ..., "animation": ... }} }}

  检查内容：
    - 选项能否合并为有效配置
    - 变体能否解析
    - 未知的预设名称
    - 预设样式表是否存在（相对配置文件所在目录）

ALIASES (in .cargo/config.toml):
  cargo check-all     -> cargo xtask check-all
  cargo cov-runtime   -> cargo xtask cov-runtime
  cargo config-check  -> cargo xtask config-check
"#
    );
}

//=============================================================================
// config-check 命令实现
//=============================================================================

/// 检查结果
#[derive(Default)]
struct ConfigCheckResult {
    /// 检查的文件数量
    files_checked: usize,
    /// 错误
    errors: Vec<String>,
    /// 警告
    warnings: Vec<String>,
}

/// 执行配置检查
fn config_check(path: Option<&str>) -> anyhow::Result<()> {
    let root = PathBuf::from(path.unwrap_or("."));
    if !root.exists() {
        anyhow::bail!("路径不存在: {}", root.display());
    }

    let files = if root.is_file() {
        vec![root]
    } else {
        collect_config_files(&root)
    };

    if files.is_empty() {
        eprintln!("未找到配置文件（*{CONFIG_SUFFIX}）");
        return Ok(());
    }

    eprintln!("==> 检查 {} 个配置文件...\n", files.len());

    let mut result = ConfigCheckResult::default();
    for file in &files {
        check_config_file(file, &mut result);
    }

    print_check_result(&result);

    if !result.errors.is_empty() {
        anyhow::bail!("配置检查发现错误");
    }
    Ok(())
}

/// 收集目录下的配置文件（跳过 target 目录）
fn collect_config_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_entry(|e| e.file_name() != "target")
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.file_name().to_string_lossy().ends_with(CONFIG_SUFFIX))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// 检查单个配置文件
fn check_config_file(file: &Path, result: &mut ConfigCheckResult) {
    let id = file.display().to_string();
    result.files_checked += 1;

    let content = match std::fs::read_to_string(file) {
        Ok(c) => c,
        Err(e) => {
            result.errors.push(format!("{id}: 无法读取文件 - {e}"));
            return;
        }
    };

    let document: serde_json::Value = match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => {
            result.errors.push(format!("{id}: JSON 无效 - {e}"));
            return;
        }
    };

    let options = document
        .get("options")
        .map(ToString::to_string)
        .unwrap_or_else(|| "{}".to_string());
    let config = match PageWaveConfig::from_json(&options) {
        Ok(c) => c,
        Err(e) => {
            result.errors.push(format!("{id}: {e}"));
            return;
        }
    };

    match document.get("transitions") {
        Some(value) => match serde_json::from_value::<TransitionSet>(value.clone()) {
            Ok(set) => check_transitions(&id, &set, result),
            Err(e) => result.errors.push(format!("{id}: 变体无效 - {e}")),
        },
        None => result.warnings.push(format!("{id}: 没有 transitions")),
    }

    if config.use_bundled_presets {
        let base = file.parent().unwrap_or(Path::new("."));
        for sheet in &config.preset_stylesheets {
            if !base.join(sheet).exists() {
                result
                    .warnings
                    .push(format!("{id}: 预设样式表不存在 {sheet}"));
            }
        }
    }
}

fn check_transitions(id: &str, set: &TransitionSet, result: &mut ConfigCheckResult) {
    let candidates = [
        ("base", Some(&set.base)),
        ("overlay", set.overlay.as_ref()),
        ("animation", set.animation.as_ref()),
    ];
    for (slot, variant) in candidates {
        if let Some(variant) = variant
            && is_unknown_preset(variant)
        {
            result
                .warnings
                .push(format!("{id}: {slot} 使用了未知的预设，过渡不会播放"));
        }
    }
}

fn is_unknown_preset(variant: &Variant) -> bool {
    variant.is_preset() && variant.expand_preset().is_none()
}

/// 输出检查结果
fn print_check_result(result: &ConfigCheckResult) {
    eprintln!("─────────────────────────────────────────────────────");
    eprintln!("检查完成: {} 个配置文件", result.files_checked);
    eprintln!();

    for error in &result.errors {
        eprintln!("[ERROR] {error}");
    }
    for warning in &result.warnings {
        eprintln!("[WARN] {warning}");
    }

    eprintln!();
    if !result.errors.is_empty() {
        eprintln!(
            "❌ {} 个错误, {} 个警告",
            result.errors.len(),
            result.warnings.len()
        );
    } else if !result.warnings.is_empty() {
        eprintln!("⚠️  0 个错误, {} 个警告", result.warnings.len());
    } else {
        eprintln!("✅ 检查通过，无错误");
    }
}
