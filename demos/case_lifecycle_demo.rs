//! 病例生命周期演示程序
//!
//! 展示报告与病例的持久化以及审核状态转换。数据写入 ./data/demo 目录。

use cxr_storage::{CaseStore, ReportStore};
use serde_json::json;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志
    tracing_subscriber::fmt::init();

    println!("📋 CXR 病例生命周期演示\n");

    let report_store = Arc::new(ReportStore::new("./data/demo/reports"));
    let case_store = Arc::new(CaseStore::new("./data/demo/cases"));

    // 1. 保存一份报告
    let report_content = "Cardiomegaly is noted.\nPleural effusion is suspected.";
    let (individual, master) = report_store.save("demo_chest.jpg", report_content).await?;
    println!("✅ 报告已保存:");
    println!("   单独记录: {}", individual.display());
    println!("   主索引: {}", master.display());

    // 2. 查询最近报告
    let recent = report_store.get_recent(5).await?;
    println!("✅ 最近报告 {} 条，最新: {}", recent.len(), recent[0].data_name);

    // 3. 创建病例
    let predictions = json!([
        {"uid": 14, "item": "Cardiomegaly", "risk": "high"},
        {"uid": 7, "item": "Pleural effusion", "risk": "middle"}
    ]);
    let case_id = case_store
        .create(
            b"demo image bytes (stand-in for a real CXR)",
            "demo_chest.jpg",
            &[0.12, 0.93, 0.44],
            &predictions,
            report_content,
        )
        .await?;
    println!("✅ 病例已创建: {}", case_id);

    // 4. 审核流程: 标记 -> 改判通过
    let rejected = case_store
        .set_verification(&case_id, "flagged", None, None)
        .await?;
    println!("   缺少原因的标记被拒绝: {}", !rejected);

    case_store
        .set_verification(&case_id, "flagged", Some("影像模糊，需复核"), Some("dr.lee"))
        .await?;
    let case = case_store.get(&case_id).await?;
    println!(
        "   标记成功: status={}, reason={:?}",
        case.verification.as_ref().unwrap().status,
        case.verification.as_ref().unwrap().reason
    );

    case_store
        .set_verification(&case_id, "verified", None, Some("dr.lee"))
        .await?;
    let case = case_store.get(&case_id).await?;
    println!(
        "   改判通过: status={}, reason已清除={}",
        case.verification.as_ref().unwrap().status,
        case.verification.as_ref().unwrap().reason.is_none()
    );

    // 5. 病例列表
    let summaries = case_store.list_recent(5).await?;
    println!("✅ 病例列表 {} 条", summaries.len());
    for summary in summaries {
        println!("   - {} ({})", summary.case_id, summary.image_name);
    }

    Ok(())
}
