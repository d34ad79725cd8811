// ==========================================
// 估算流水线场景测试
// ==========================================
// 职责: 从原始行到工作簿的端到端行为
// 场景: 条基 / 钢管桩 / 松方与回填 / 分组合并 / 互斥认领 / 汇总表
// ==========================================

mod test_helpers;

use std::collections::BTreeSet;
use takeoff_estimator::domain::types::{Column, Discipline, RowKind, Unit};
use takeoff_estimator::engine::rules::{civil, excavation, foundation};
use takeoff_estimator::EstimateConfig;
use test_helpers::*;

// ==========================================
// 场景 A: 条基
// ==========================================

#[test]
fn test_strip_footing_scenario() {
    let rows = RowBuilder::new()
        .add("SF (2'-0\"x1'-0\")", 10.0, Unit::Ft)
        .build();
    let result = run(&rows);
    let sheet = detail(&result);

    let items = data_rows_in(sheet, Discipline::Foundation, foundation::SUB_STRIP_FOOTINGS);
    assert_eq!(items.len(), 1);
    let item = items[0];
    let n = item.row_number;
    assert_eq!(item.formula_text(Column::LinearFeet), Some(format!("=B{}", n).as_str()));
    assert_eq!(item.formula_text(Column::Area), Some(format!("=B{}*E{}", n, n).as_str()));
    assert_eq!(
        item.formula_text(Column::Volume),
        Some(format!("=H{}*F{}/27", n, n).as_str())
    );
    assert_eq!(item.source_index, Some(1));

    // 单成员同样进入合并块,带汇总行
    let sums = sum_rows_in(sheet, Discipline::Foundation, foundation::SUB_STRIP_FOOTINGS);
    assert_eq!(sums.len(), 1);
    assert_eq!(sums[0].description(), Some("Total Strip footings"));
    assert_eq!(sums[0].row_number, n + 1);
    assert_eq!(
        sums[0].formula_text(Column::Volume),
        Some(format!("=SUM(J{})", n).as_str())
    );

    let name = sheet.name.clone();
    assert!(approx(value(&result, &name, n, Column::Area), 20.0, 1e-9));
    assert!(approx(value(&result, &name, n, Column::Volume), 20.0 / 27.0, 1e-9));

    // 基础标题行的体积合计（延迟写入,引用其后的汇总行）
    let header = section_header(sheet, Discipline::Foundation).unwrap();
    assert!(header.row_number < sums[0].row_number);
    assert_eq!(
        header.formula_text(Column::Volume),
        Some(format!("=SUM(J{})", sums[0].row_number).as_str())
    );
}

#[test]
fn test_strip_footing_is_mirrored_into_excavation() {
    let rows = RowBuilder::new()
        .add("SF (2'-0\"x1'-0\")", 10.0, Unit::Ft)
        .build();
    let result = run(&rows);
    let sheet = detail(&result);

    let mirrors = data_rows_in(sheet, Discipline::Excavation, excavation::SUB_FDN_LINEAR);
    assert_eq!(mirrors.len(), 1);
    assert_eq!(mirrors[0].source_index, Some(1));
    assert_eq!(result.stats.mirrored, 1);
    // 镜像不占用行
    assert_eq!(result.stats.claimed.get(&Discipline::Excavation), None);
    assert_eq!(result.stats.claimed.get(&Discipline::Foundation), Some(&1));

    let name = sheet.name.clone();
    let n = mirrors[0].row_number;
    let bank = value(&result, &name, n, Column::Weight);
    assert!(approx(bank, 20.0 / 27.0, 1e-9));
    assert!(approx(value(&result, &name, n, Column::Volume), bank * 1.3, 1e-9));

    // 土方分段在基础之前
    let exc = section_header(sheet, Discipline::Excavation).unwrap();
    let fdn = section_header(sheet, Discipline::Foundation).unwrap();
    assert!(exc.row_number < fdn.row_number);
}

// ==========================================
// 场景 B: 钻孔钢管桩
// ==========================================

#[test]
fn test_pipe_pile_with_rock_socket() {
    let rows = RowBuilder::new()
        .add("9-5/8\" Øx0.545\" H=32'-6\"+ 7'-0\" RS", 12.0, Unit::Ea)
        .build();
    let result = run(&rows);
    let sheet = detail(&result);
    let name = sheet.name.clone();

    let items = data_rows_in(sheet, Discipline::Foundation, foundation::SUB_DRILLED_PILES);
    assert_eq!(items.len(), 1);
    let n = items[0].row_number;

    assert_eq!(value(&result, &name, n, Column::Height), 40.0);
    assert_eq!(value(&result, &name, n, Column::FinalQuantity), 12.0);
    assert_eq!(value(&result, &name, n, Column::LinearFeet), 480.0);
    assert!(approx(
        value(&result, &name, n, Column::Weight),
        480.0 * 52.9,
        480.0 * 0.05
    ));
}

// ==========================================
// 松方系数: 开挖与回填
// ==========================================

#[test]
fn test_swell_applies_to_excavation_not_backfill() {
    let rows = RowBuilder::new()
        .add("Bulk excavation (8')", 1000.0, Unit::Sf)
        .add("Backfill (4')", 500.0, Unit::Sf)
        .build();
    let result = run(&rows);
    let sheet = detail(&result);
    let name = sheet.name.clone();

    let bulk = data_rows_in(sheet, Discipline::Excavation, excavation::SUB_BULK)[0];
    let bank = value(&result, &name, bulk.row_number, Column::Weight);
    assert!(approx(bank, 8000.0 / 27.0, 1e-9));
    assert!(approx(
        value(&result, &name, bulk.row_number, Column::Volume),
        bank * 1.3,
        1e-9
    ));

    let backfill = data_rows_in(sheet, Discipline::Excavation, excavation::SUB_BACKFILL)[0];
    assert!(backfill.cell(Column::Weight).is_none());
    assert!(approx(
        value(&result, &name, backfill.row_number, Column::Volume),
        2000.0 / 27.0,
        1e-9
    ));

    // 开挖汇总: 自然方求和后乘松方系数
    let sum = sum_rows_in(sheet, Discipline::Excavation, excavation::SUB_BULK)[0];
    assert_eq!(
        sum.formula_text(Column::Volume),
        Some(format!("=SUM(I{})*1.3", bulk.row_number).as_str())
    );

    // 回填汇总: 直接对体积求和,不乘松方系数
    let backfill_sum = sum_rows_in(sheet, Discipline::Excavation, excavation::SUB_BACKFILL)[0];
    assert_eq!(
        backfill_sum.formula_text(Column::Volume),
        Some(format!("=SUM(J{})", backfill.row_number).as_str())
    );
    assert!(approx(
        value(&result, &name, backfill_sum.row_number, Column::Volume),
        2000.0 / 27.0,
        1e-9
    ));
}

#[test]
fn test_swell_factor_from_config() {
    let config = EstimateConfig {
        swell_factor: 1.25,
        ..EstimateConfig::default()
    };
    let rows = RowBuilder::new()
        .add("Bulk excavation (8')", 1000.0, Unit::Sf)
        .build();
    let result = run_with(config, &rows);
    let sheet = detail(&result);
    let bulk = data_rows_in(sheet, Discipline::Excavation, excavation::SUB_BULK)[0];
    let volume = value(&result, &sheet.name, bulk.row_number, Column::Volume);
    assert!(approx(volume, 8000.0 / 27.0 * 1.25, 1e-9));
}

// ==========================================
// 分组: 同键成组 / 单成员合并 / 连续区间
// ==========================================

#[test]
fn test_keyed_group_then_merged_singletons() {
    let rows = RowBuilder::new()
        .add("SF-1 (2'x1')", 10.0, Unit::Ft)
        .add("SF-2 (3'x1')", 5.0, Unit::Ft)
        .add("SF-1 (2'x1')", 20.0, Unit::Ft)
        .build();
    let result = run(&rows);
    let sheet = detail(&result);

    let items = data_rows_in(sheet, Discipline::Foundation, foundation::SUB_STRIP_FOOTINGS);
    let order: Vec<Option<usize>> = items.iter().map(|r| r.source_index).collect();
    assert_eq!(order, vec![Some(1), Some(3), Some(2)]);

    let sums = sum_rows_in(sheet, Discipline::Foundation, foundation::SUB_STRIP_FOOTINGS);
    assert_eq!(sums.len(), 2);
    assert_eq!(sums[0].description(), Some("Subtotal Strip footings"));
    assert_eq!(sums[1].description(), Some("Total Strip footings"));

    // k 个成员 → 一个连续区间
    let (a, b) = (items[0].row_number, items[1].row_number);
    assert_eq!(b, a + 1);
    assert_eq!(sums[0].row_number, b + 1);
    assert_eq!(
        sums[0].formula_text(Column::Area),
        Some(format!("=SUM(H{}:H{})", a, b).as_str())
    );
    assert_eq!(
        sums[1].formula_text(Column::Area),
        Some(format!("=SUM(H{})", items[2].row_number).as_str())
    );

    let name = sheet.name.clone();
    assert_eq!(value(&result, &name, sums[0].row_number, Column::Area), 60.0);
    assert_eq!(value(&result, &name, sums[1].row_number, Column::Area), 15.0);
}

#[test]
fn test_group_totals_do_not_depend_on_input_order() {
    let descriptions = [
        ("SF-1 (2'x1')", 10.0),
        ("SF-2 (3'x1')", 5.0),
        ("SF-1 (2'x1')", 20.0),
        ("SOG 6\"", 1000.0),
    ];
    let forward = descriptions
        .iter()
        .fold(RowBuilder::new(), |b, (d, q)| {
            b.add(d, *q, if d.starts_with("SOG") { Unit::Sf } else { Unit::Ft })
        })
        .build();
    let backward = descriptions
        .iter()
        .rev()
        .fold(RowBuilder::new(), |b, (d, q)| {
            b.add(d, *q, if d.starts_with("SOG") { Unit::Sf } else { Unit::Ft })
        })
        .build();

    let totals = |rows: &[takeoff_estimator::RawRow]| {
        let result = run(rows);
        let sheet = summary(&result);
        let name = sheet.name.clone();
        let set: BTreeSet<(String, i64)> = sheet
            .rows
            .iter()
            .filter(|r| r.kind == RowKind::Sum)
            .map(|r| {
                let label = r.description().unwrap_or_default().to_string();
                let v = value(&result, &name, r.row_number, Column::Volume);
                (label, (v * 1e6).round() as i64)
            })
            .collect();
        set
    };

    assert_eq!(totals(&forward), totals(&backward));
}

// ==========================================
// 认领互斥 / 幂等
// ==========================================

#[test]
fn test_each_row_claimed_by_at_most_one_discipline() {
    let rows = RowBuilder::new()
        .add("Demo SOG 6\"", 800.0, Unit::Sf)
        .add("SOG 6\"", 1000.0, Unit::Sf)
        .add("Rock excavation (4')", 300.0, Unit::Sf)
        .add("Bulk excavation (8')", 1000.0, Unit::Sf)
        .add("Mobilization", 1.0, Unit::Ls)
        .build();
    let result = run(&rows);

    assert_eq!(result.stats.claimed.get(&Discipline::Demolition), Some(&1));
    assert_eq!(result.stats.claimed.get(&Discipline::Foundation), Some(&1));
    assert_eq!(result.stats.claimed.get(&Discipline::RockExcavation), Some(&1));
    assert_eq!(result.stats.claimed.get(&Discipline::Excavation), Some(&1));
    assert_eq!(result.stats.unused, 1);
    assert_eq!(result.unused_rows[0].description, "Mobilization");

    // 非镜像明细行的来源行号互不重复
    let sheet = detail(&result);
    let mut seen = BTreeSet::new();
    for row in sheet.rows.iter().filter(|r| r.kind == RowKind::Data) {
        let subsection = row
            .scope
            .as_ref()
            .and_then(|s| s.subsection.clone())
            .unwrap_or_default();
        if subsection.starts_with("Foundation excavation") {
            continue;
        }
        assert!(seen.insert(row.source_index), "row {:?} emitted twice", row.source_index);
    }
    assert_eq!(seen.len(), 4);
}

#[test]
fn test_category_hint_gates_disciplines() {
    let rows = RowBuilder::new()
        .add_with_category("Wall (1'x10')", 100.0, Unit::Ft, "Superstructure")
        .build();

    let gated = run(&rows);
    assert_eq!(gated.stats.claimed.get(&Discipline::Foundation), None);

    let config = EstimateConfig {
        respect_category: false,
        ..EstimateConfig::default()
    };
    let ungated = run_with(config, &rows);
    assert_eq!(ungated.stats.claimed.get(&Discipline::Foundation), Some(&1));
}

#[test]
fn test_gravel_under_slab_lands_in_civil_only() {
    let rows = RowBuilder::new()
        .add("SOG 6\"", 1000.0, Unit::Sf)
        .add("4\" gravel under SOG", 1000.0, Unit::Sf)
        .build();
    let result = run(&rows);
    let sheet = detail(&result);

    assert_eq!(data_rows_in(sheet, Discipline::Foundation, foundation::SUB_SOG).len(), 1);
    assert_eq!(data_rows_in(sheet, Discipline::Civil, civil::SUB_STONE_BASE).len(), 1);
    // 只有 SOG 被镜像到开挖
    assert_eq!(data_rows_in(sheet, Discipline::Excavation, excavation::SUB_FDN_SLAB).len(), 1);
    assert_eq!(result.stats.claimed.get(&Discipline::Civil), Some(&1));
    assert!(result.unused_rows.is_empty());
}

#[test]
fn test_pipeline_is_deterministic() {
    let rows = RowBuilder::new()
        .add("SF (2'-0\"x1'-0\")", 10.0, Unit::Ft)
        .add("PC-1 (6'x5'x3')", 4.0, Unit::Ea)
        .add("SOG 6\"", 1000.0, Unit::Sf)
        .add("Bulk excavation (8')", 1000.0, Unit::Sf)
        .build();
    let first = run(&rows);
    let second = run(&rows);
    assert_eq!(first.workbook, second.workbook);
    assert_eq!(first.stats, second.stats);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

// ==========================================
// 汇总表
// ==========================================

#[test]
fn test_summary_references_detail_sums() {
    let rows = RowBuilder::new()
        .add("SF (2'-0\"x1'-0\")", 10.0, Unit::Ft)
        .add("SOG 6\"", 1000.0, Unit::Sf)
        .build();
    let result = run(&rows);
    let detail_name = detail(&result).name.clone();
    let sheet = summary(&result);
    let name = sheet.name.clone();

    // 行号连续
    for (i, row) in sheet.rows.iter().enumerate() {
        assert_eq!(row.row_number as usize, i + 1);
    }

    let sog = sheet
        .rows
        .iter()
        .find(|r| r.description() == Some(foundation::SUB_SOG))
        .unwrap();
    let formula = sog.formula_text(Column::Volume).unwrap();
    assert!(formula.starts_with(&format!("=SUM('{}'!J", detail_name)));
    assert!(approx(
        value(&result, &name, sog.row_number, Column::Volume),
        500.0 / 27.0,
        1e-9
    ));

    let total = sheet
        .rows
        .iter()
        .find(|r| r.description() == Some("Total Foundation"))
        .unwrap();
    let expected = 20.0 / 27.0 + 500.0 / 27.0;
    assert!(approx(
        value(&result, &name, total.row_number, Column::Volume),
        expected,
        1e-9
    ));
}

#[test]
fn test_empty_sections_emitted_when_configured() {
    let config = EstimateConfig {
        emit_empty_sections: true,
        ..EstimateConfig::default()
    };
    let result = run_with(config, &[]);
    let sheet = detail(&result);
    for discipline in Discipline::SECTION_ORDER {
        assert!(section_header(sheet, discipline).is_some());
    }
    // 空专业标题行不带合计
    let fdn = section_header(sheet, Discipline::Foundation).unwrap();
    assert!(fdn.cell(Column::Volume).is_none());
}
