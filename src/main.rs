// ==========================================
// 班产损失追踪系统 - 命令行入口
// ==========================================
// 用法:
//   shift-loss-tracker [--db PATH | --remote URL] [--log-json] summary
//   shift-loss-tracker [--db PATH | --remote URL] [--log-json] report <daily|weekly>
//
// summary: 当日汇总以 JSON 输出到 stdout
// report:  报表内容原样写入 stdout
// 失败时 ErrorResponse JSON 输出到 stderr, 退出码 1
// ==========================================

use anyhow::{anyhow, bail, Context};
use shift_loss_tracker::api::ApiError;
use shift_loss_tracker::app::{get_default_db_path, AppState};
use shift_loss_tracker::logging;
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Summary,
    Report(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliArgs {
    db_path: Option<String>,
    remote: Option<String>,
    log_json: bool,
    command: Command,
}

fn parse_args<I: Iterator<Item = String>>(mut args: I) -> anyhow::Result<CliArgs> {
    let mut db_path = None;
    let mut remote = None;
    let mut log_json = false;
    let mut command = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" => db_path = Some(args.next().ok_or_else(|| anyhow!("--db 需要路径参数"))?),
            "--remote" => remote = Some(args.next().ok_or_else(|| anyhow!("--remote 需要地址参数"))?),
            "--log-json" => log_json = true,
            "summary" => command = Some(Command::Summary),
            "report" => {
                let tag = args.next().ok_or_else(|| anyhow!("report 需要报表类型 (daily|weekly)"))?;
                command = Some(Command::Report(tag));
            }
            other => bail!("未知参数: {}", other),
        }
    }

    if db_path.is_some() && remote.is_some() {
        bail!("--db 与 --remote 不能同时使用");
    }

    Ok(CliArgs {
        db_path,
        remote,
        log_json,
        command: command.ok_or_else(|| anyhow!("缺少命令 (summary | report <daily|weekly>)"))?,
    })
}

async fn run(state: &AppState, command: &Command) -> Result<Vec<u8>, ApiError> {
    match command {
        Command::Summary => {
            let summary = state.entry_api.daily_summary().await?;
            serde_json::to_vec_pretty(&summary).map_err(|e| ApiError::InternalError(e.to_string()))
        }
        Command::Report(tag) => state.entry_api.open_report(tag).await,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = parse_args(std::env::args().skip(1))?;

    if cli.log_json {
        logging::init_json();
    } else {
        logging::init();
    }

    tracing::info!("{} v{}", shift_loss_tracker::APP_NAME, shift_loss_tracker::VERSION);

    let db_path = cli.db_path.clone().unwrap_or_else(get_default_db_path);
    tracing::info!("使用数据库: {}", db_path);

    let state = match &cli.remote {
        Some(url) => AppState::with_remote(db_path, url),
        None => AppState::new(db_path),
    }
    .map_err(|e| anyhow!(e))
    .context("无法初始化AppState")?;

    match run(&state, &cli.command).await {
        Ok(output) => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&output).context("写出结果失败")?;
            stdout.flush().context("写出结果失败")?;
            Ok(())
        }
        Err(err) => {
            tracing::error!(code = err.code(), error = %err, "命令执行失败");
            eprintln!("{}", err.to_error_response().to_json());
            std::process::exit(1);
        }
    }
}
