// ==========================================
// 生产订单组件导入引擎 - 命令行入口
// ==========================================
// 子命令:
// - init-db:    初始化数据库 schema
// - import:     创建批次 → 确认 → 导入，输出 JSON 结果
// - progress:   查询批次进度
// - show:       查询批次详情（日志 / 状态）
// - config-set: 写入 global 配置项
// ==========================================

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use mrp_component_import::api::{CreateBatchRequest, ImportApi};
use mrp_component_import::config::ConfigManager;
use mrp_component_import::{db, i18n, logging, APP_NAME, VERSION};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mrp-component-import", version, about = "Import production order components from a spreadsheet.")]
struct Cli {
    /// SQLite database file (default: user data directory).
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the database schema (idempotent).
    InitDb,

    /// Import a spreadsheet as the components of a new production order.
    Import {
        /// Spreadsheet file (.xlsx / .xls / .xlsm / .csv).
        #[arg(long, value_name = "PATH")]
        file: PathBuf,

        /// External code of the product the order produces.
        #[arg(long)]
        product: String,

        /// Quantity to produce.
        #[arg(long, default_value_t = 1.0)]
        quantity: f64,

        /// Confirm the production order after the rows are imported.
        #[arg(long)]
        auto_confirm: bool,
    },

    /// Show the progress of an import batch.
    Progress {
        #[arg(long)]
        batch: String,
    },

    /// Show an import batch (state, status, log).
    Show {
        #[arg(long)]
        batch: String,
    },

    /// Set a global configuration value, e.g. import.progress_flush_every.
    ConfigSet { key: String, value: String },
}

#[derive(Serialize)]
struct BatchView {
    batch_id: String,
    file_name: Option<String>,
    state: String,
    import_status: Option<String>,
    row_count: u64,
    order_id: Option<i64>,
    log: Option<String>,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.json_logs);

    let db_path = cli
        .db
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(db::default_db_path);
    tracing::info!(app = APP_NAME, version = VERSION, db_path = %db_path, "启动");

    {
        let conn = db::open_sqlite_connection(&db_path)
            .with_context(|| format!("无法打开数据库 {}", db_path))?;
        db::init_schema(&conn).context("初始化数据库 schema 失败")?;
    }

    let api = ImportApi::new(db_path.clone());

    match cli.command {
        Command::InitDb => {
            println!("{}", db_path);
        }
        Command::Import {
            file,
            product,
            quantity,
            auto_confirm,
        } => {
            let settings = api.load_settings().await?;
            i18n::set_locale(&settings.locale);

            let content = tokio::fs::read(&file)
                .await
                .with_context(|| format!("无法读取文件 {}", file.display()))?;
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();

            let report = api
                .import_file(CreateBatchRequest {
                    file: content,
                    file_name,
                    target_product_code: product,
                    target_quantity: quantity,
                    auto_confirm,
                })
                .await?;
            print_json(&report)?;
        }
        Command::Progress { batch } => match api.get_progress(&batch).await? {
            Some(snapshot) => print_json(&snapshot)?,
            None => bail!("导入批次不存在: {}", batch),
        },
        Command::Show { batch } => {
            let batch = api.get_batch(&batch).await?;
            print_json(&BatchView {
                batch_id: batch.batch_id,
                file_name: batch.file_name,
                state: batch.state.to_string(),
                import_status: batch.import_status.map(|s| s.to_string()),
                row_count: batch.row_count,
                order_id: batch.order_id,
                log: batch.log,
            })?;
        }
        Command::ConfigSet { key, value } => {
            ConfigManager::new(&db_path)?.set_global_config_value(&key, &value)?;
            println!("{} = {}", key, value);
        }
    }

    Ok(())
}
