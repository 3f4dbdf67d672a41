//! 报告流水线演示程序
//!
//! 展示确定性部分的完整链路：预测加载、分区纲要生成、提示词构造。
//! 不访问任何外部服务。

use cxr_report::{build_prompt, build_synopsis, LlmParams, PredictionTable, SectionMapping};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志
    tracing_subscriber::fmt::init();

    println!("🩻 CXR 报告流水线演示\n");

    // 1. 构造示例预测数据
    let predictions = r#"[
        {"uid": 8, "item": "Mass", "value": 0.08, "risk": "low"},
        {"uid": 2, "item": "Consolidation", "value": 0.71, "risk": "middle"},
        {"uid": 1, "item": "Atelectasis", "value": 0.12, "risk": "low"},
        {"uid": 14, "item": "Cardiomegaly", "value": 0.93, "risk": "high"},
        {"uid": 15, "item": "Mediastinal widening", "value": 0.05, "risk": "low"},
        {"uid": 7, "item": "Pleural effusion", "value": 0.44, "risk": "middle"},
        {"uid": 20, "item": "Fracture", "value": 0.02, "risk": "low"}
    ]"#;

    // 2. 加载预测表
    let table = PredictionTable::from_json(predictions)?;
    println!("✅ 预测表加载完成: {} 行", table.len());

    // 3. 生成分区纲要
    let mapping = SectionMapping::builtin_default();
    let synopsis = build_synopsis(&table, &mapping);
    println!("✅ 分区纲要生成完成:\n");
    println!("{}", synopsis);

    // 4. 构造LLM提示词
    let prompt = build_prompt(&synopsis, &LlmParams::default());
    println!("✅ 提示词构造完成:");
    println!("   模型: {}", prompt.model);
    println!("   消息数: {}", prompt.messages.len());
    println!("   温度: {}", prompt.temperature);
    println!("   用户消息长度: {} 字符", prompt.messages[1].content.len());

    Ok(())
}
