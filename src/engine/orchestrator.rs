// ==========================================
// 施工算量清单编译器 - 流水线编排器
// ==========================================
// 用途: 协调 分类 → 镜像 → 分组 → 布局 → 汇总 → 校验 的执行顺序
// 红线: 每次运行独立持有占用表与分组状态,无全局可变状态
// 红线: 相同输入 + 相同配置 → 完全相同的工作簿
// ==========================================

use crate::config::EstimateConfig;
use crate::domain::takeoff::{ClassifiedItem, RawRow};
use crate::domain::types::{Discipline, Unit};
use crate::domain::workbook::Workbook;
use crate::engine::classifier::{ClassifyMode, ItemClassifier};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::grouping::Grouper;
use crate::engine::layout::{validate_workbook, LayoutBuilder};
use crate::engine::rules::{all_profiles, profile_for};
use crate::engine::summary::SummaryBuilder;
use crate::engine::usage::UsedRowTracker;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

// ==========================================
// EstimateResult - 运行结果
// ==========================================

/// 未被任何专业认领的原始行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnusedRow {
    pub source_index: usize,
    pub description: String,
    pub quantity: f64,
    pub unit: Unit,
}

/// 运行统计
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStats {
    /// 各专业认领行数（仅含有认领的专业）
    pub claimed: BTreeMap<Discipline, usize>,
    /// 镜像构件数
    pub mirrored: usize,
    pub unused: usize,
    /// 各工作表行数
    pub rows_per_sheet: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EstimateResult {
    pub workbook: Workbook,
    pub unused_rows: Vec<UnusedRow>,
    pub stats: RunStats,
}

// ==========================================
// EstimatePipeline - 估算流水线
// ==========================================
pub struct EstimatePipeline {
    config: EstimateConfig,
    classifier: ItemClassifier,
}

impl EstimatePipeline {
    /// 创建流水线
    ///
    /// # 参数
    /// - config: 估算配置（运行期间只读）
    pub fn new(config: EstimateConfig) -> Self {
        Self {
            classifier: ItemClassifier::new(&config),
            config,
        }
    }

    pub fn config(&self) -> &EstimateConfig {
        &self.config
    }

    /// 执行完整流水线
    ///
    /// # 参数
    /// - rows: 一个批次的全部原始行（顺序即批次内位置）
    ///
    /// # 返回
    /// - Ok(EstimateResult): 工作簿 + 未使用行 + 统计
    /// - Err(EngineError): 内部不变量被破坏（单行解析/分类失败不会走到这里）
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub fn run(&self, rows: &[RawRow]) -> EngineResult<EstimateResult> {
        self.config
            .validate()
            .map_err(|(key, message)| {
                EngineError::InvariantViolation(format!("配置项 {} 非法: {}", key, message))
            })?;

        info!("开始执行估算流水线");

        // ==========================================
        // 步骤1: 认领分类（按分段顺序,先到先得）
        // ==========================================
        let mut tracker = UsedRowTracker::new(rows.len());
        let mut by_discipline: BTreeMap<Discipline, Vec<ClassifiedItem>> = BTreeMap::new();
        for profile in all_profiles() {
            let items =
                self.classifier
                    .classify(profile, rows, ClassifyMode::Claim(&mut tracker))?;
            by_discipline.insert(profile.discipline, items);
        }

        // ==========================================
        // 步骤2: 只读镜像（基于全部认领完成后的占用表）
        // ==========================================
        let mut mirrored = 0usize;
        for profile in all_profiles() {
            let Some(spec) = &profile.mirror else {
                continue;
            };
            let source = profile_for(spec.source);
            let peeked = self.classifier.classify(
                source,
                rows,
                ClassifyMode::Peek {
                    tracker: &tracker,
                    owner: spec.source,
                },
            )?;
            let mirrors: Vec<ClassifiedItem> = peeked
                .iter()
                .filter_map(|item| {
                    spec.target_for(item.item_type.code)
                        .map(|target| self.classifier.mirror(item, target))
                })
                .collect();
            debug!(
                discipline = %profile.discipline,
                source = %spec.source,
                count = mirrors.len(),
                "镜像构件生成"
            );
            mirrored += mirrors.len();
            by_discipline
                .entry(profile.discipline)
                .or_default()
                .extend(mirrors);
        }

        // ==========================================
        // 步骤3: 分组
        // ==========================================
        let mut sections = Vec::with_capacity(by_discipline.len());
        for (discipline, items) in by_discipline {
            sections.push(Grouper::group(profile_for(discipline), items)?);
        }

        // ==========================================
        // 步骤4: 布局 + 汇总 + 全工作簿校验
        // ==========================================
        let detail = LayoutBuilder::new(&self.config).build_detail(&sections)?;
        let summary = SummaryBuilder::new(&self.config).build(&detail.sheet)?;

        let mut deferred = BTreeMap::new();
        deferred.insert(detail.sheet.name.clone(), detail.deferred);
        let workbook = Workbook {
            sheets: vec![detail.sheet, summary],
        };
        validate_workbook(&workbook, &deferred)?;

        // ==========================================
        // 步骤5: 未使用行与统计
        // ==========================================
        let unused_rows: Vec<UnusedRow> = tracker
            .unused_positions()
            .into_iter()
            .filter_map(|position| rows.get(position))
            .map(|row| UnusedRow {
                source_index: row.source_index,
                description: row.description.clone(),
                quantity: row.quantity,
                unit: row.unit,
            })
            .collect();
        for row in &unused_rows {
            debug!(
                source_index = row.source_index,
                description = %row.description,
                "未被任何专业认领"
            );
        }
        if !unused_rows.is_empty() {
            warn!(count = unused_rows.len(), "存在未使用的算量行");
        }

        let stats = RunStats {
            claimed: Discipline::SECTION_ORDER
                .iter()
                .map(|d| (*d, tracker.count_for(*d)))
                .filter(|(_, n)| *n > 0)
                .collect(),
            mirrored,
            unused: unused_rows.len(),
            rows_per_sheet: workbook
                .sheets
                .iter()
                .map(|s| (s.name.clone(), s.rows.len()))
                .collect(),
        };

        info!(
            mirrored = stats.mirrored,
            unused = stats.unused,
            detail_rows = workbook.sheets.first().map(|s| s.rows.len()).unwrap_or(0),
            "估算流水线完成"
        );

        Ok(EstimateResult {
            workbook,
            unused_rows,
            stats,
        })
    }
}
