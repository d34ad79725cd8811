// ==========================================
// 施工算量清单编译器 - 命令行入口
// ==========================================
// 用法: takeoff-estimator <input.csv|xlsx|json> [--config file.json] [--out dir]
// 流程: 加载配置 → 导入 → 流水线 → 导出 → 打印汇总合计
// ==========================================

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use takeoff_estimator::domain::types::RowKind;
use takeoff_estimator::{
    logging, ConfigManager, EstimatePipeline, TakeoffImport, TakeoffImporter, WorkbookEvaluator,
    WorkbookExporter, APP_NAME, VERSION,
};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "takeoff-estimator", version, about = "Compile a flat takeoff list into an estimate workbook")]
struct Cli {
    /// 算量文件 (.csv / .xlsx / .xls / .json)
    input: PathBuf,

    /// JSON 配置文件
    #[arg(long)]
    config: Option<PathBuf>,

    /// 输出目录
    #[arg(long, default_value = "out")]
    out: PathBuf,
}

fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    info!(app = APP_NAME, version = VERSION, input = %cli.input.display(), "启动");

    let config = ConfigManager::new(cli.config.as_deref())
        .load()
        .context("加载配置失败")?;

    let report = TakeoffImporter::new()
        .import_file(&cli.input)
        .with_context(|| format!("导入失败: {}", cli.input.display()))?;
    for rejected in &report.rejected {
        warn!(line = rejected.line, reason = %rejected.reason, "输入行被拒收");
    }

    let summary_sheet = config.summary_sheet_name.clone();
    let result = EstimatePipeline::new(config)
        .run(&report.rows)
        .context("估算流水线失败")?;

    for row in &result.unused_rows {
        warn!(
            source_index = row.source_index,
            description = %row.description,
            "未使用的算量行"
        );
    }

    let written = WorkbookExporter::write_all(&result, &cli.out)
        .with_context(|| format!("导出失败: {}", cli.out.display()))?;

    // 汇总表各子目合计
    let mut evaluator = WorkbookEvaluator::new(&result.workbook);
    if let Some(sheet) = result.workbook.sheet(&summary_sheet) {
        for row in sheet.rows.iter().filter(|r| r.scope.is_some()) {
            let label = row.description().unwrap_or_default();
            if row.kind == RowKind::Header {
                println!("{}", label);
                continue;
            }
            let values = evaluator.row_values(&summary_sheet, row.row_number)?;
            let totals: Vec<String> = values
                .iter()
                .filter(|(column, v)| column.is_derived() && **v != 0.0)
                .map(|(column, v)| format!("{} {:.2}", column.title(), v))
                .collect();
            if !totals.is_empty() {
                println!("  {:<40} {}", label, totals.join("  "));
            }
        }
    }

    println!(
        "rows: {} imported, {} rejected, {} unused; files written: {}",
        report.rows.len(),
        report.rejected.len(),
        result.unused_rows.len(),
        written.len()
    );
    Ok(())
}
