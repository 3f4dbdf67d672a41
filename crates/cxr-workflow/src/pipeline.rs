//! 报告生成流水线
//!
//! 协调一次请求的完整阶段：特征提取 → 预测 → 纲要 → 提示词 →
//! LLM补全 → 持久化。各阶段严格串行，后一阶段消费前一阶段的输出。

use cxr_core::Result;
use cxr_report::{build_prompt, build_synopsis, LlmParams, PredictionTable, SectionMapping};
use cxr_integration::{InferenceClient, LlmClient};
use cxr_storage::{CaseStore, ReportStore};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// 一次流水线运行的结构化结果
///
/// 部分成功是一等结果：报告已生成但持久化失败时，报告正文照常
/// 返回，失败细节记入 `persistence_error`，不吞掉也不整体报错。
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    /// 输入来源名（文件名或标签）
    pub data_name: String,
    /// LLM生成的报告正文
    pub report_content: String,
    /// 单独报告记录路径（保存成功时）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_path: Option<PathBuf>,
    /// 主索引路径（保存成功时）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master_path: Option<PathBuf>,
    /// 新建病例标识（请求持久化病例且成功时）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_id: Option<String>,
    /// 持久化失败说明，存在即表示生成成功而保存失败
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistence_error: Option<String>,
}

/// 报告生成流水线
///
/// 每次运行只持有自己的瞬态值，跨请求共享的只有文件存储。
pub struct ReportPipeline {
    mapping: SectionMapping,
    llm_params: LlmParams,
    inference: InferenceClient,
    llm: LlmClient,
    report_store: Arc<ReportStore>,
    case_store: Arc<CaseStore>,
}

impl ReportPipeline {
    pub fn new(
        mapping: SectionMapping,
        llm_params: LlmParams,
        inference: InferenceClient,
        llm: LlmClient,
        report_store: Arc<ReportStore>,
        case_store: Arc<CaseStore>,
    ) -> Self {
        Self {
            mapping,
            llm_params,
            inference,
            llm,
            report_store,
            case_store,
        }
    }

    /// 从影像字节开始的完整运行
    ///
    /// 任一外部调用失败即中止整次运行并带阶段上下文上报；
    /// 生成成功后报告必定尝试保存，`persist_case` 为真时另建病例。
    pub async fn run_for_image(
        &self,
        image: &[u8],
        image_name: &str,
        persist_case: bool,
    ) -> Result<PipelineOutcome> {
        info!("Pipeline run started for image {} ({} bytes)", image_name, image.len());

        let features = self.inference.extract_features(image, image_name).await?;
        let predictions = self.inference.get_predictions(&features).await?;

        let table = PredictionTable::from_json(&predictions.to_string())?;
        let report_content = self.generate_report_text(&table).await?;

        let mut outcome = PipelineOutcome {
            data_name: image_name.to_string(),
            report_content: report_content.clone(),
            report_path: None,
            master_path: None,
            case_id: None,
            persistence_error: None,
        };

        self.save_report(&mut outcome).await;

        if persist_case {
            match self
                .case_store
                .create(image, image_name, &features, &predictions, &report_content)
                .await
            {
                Ok(case_id) => outcome.case_id = Some(case_id),
                Err(e) => {
                    warn!("Case persistence failed for {}: {}", image_name, e);
                    append_persistence_error(&mut outcome, &format!("病例保存失败: {}", e));
                }
            }
        }

        info!("Pipeline run finished for image {}", image_name);
        Ok(outcome)
    }

    /// 从现成预测数组开始的运行，跳过两个推理阶段
    pub async fn run_for_predictions(
        &self,
        predictions_json: &str,
        data_name: &str,
    ) -> Result<PipelineOutcome> {
        info!("Pipeline run started for prediction set {}", data_name);

        let table = PredictionTable::from_json(predictions_json)?;
        let report_content = self.generate_report_text(&table).await?;

        let mut outcome = PipelineOutcome {
            data_name: data_name.to_string(),
            report_content,
            report_path: None,
            master_path: None,
            case_id: None,
            persistence_error: None,
        };
        self.save_report(&mut outcome).await;

        info!("Pipeline run finished for prediction set {}", data_name);
        Ok(outcome)
    }

    /// 只做特征提取，不进入后续阶段
    pub async fn extract_features(&self, image: &[u8], image_name: &str) -> Result<Vec<f64>> {
        self.inference.extract_features(image, image_name).await
    }

    /// 纲要 → 提示词 → LLM补全
    async fn generate_report_text(&self, table: &PredictionTable) -> Result<String> {
        let synopsis = build_synopsis(table, &self.mapping);
        let prompt = build_prompt(&synopsis, &self.llm_params);
        self.llm.complete(&prompt).await
    }

    /// 保存报告，失败降级为outcome中的持久化错误
    async fn save_report(&self, outcome: &mut PipelineOutcome) {
        match self
            .report_store
            .save(&outcome.data_name, &outcome.report_content)
            .await
        {
            Ok((report_path, master_path)) => {
                outcome.report_path = Some(report_path);
                outcome.master_path = Some(master_path);
            }
            Err(e) => {
                warn!("Report persistence failed for {}: {}", outcome.data_name, e);
                append_persistence_error(outcome, &format!("报告保存失败: {}", e));
            }
        }
    }
}

fn append_persistence_error(outcome: &mut PipelineOutcome, message: &str) {
    match &mut outcome.persistence_error {
        Some(existing) => {
            existing.push_str("; ");
            existing.push_str(message);
        }
        None => outcome.persistence_error = Some(message.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistence_errors_accumulate() {
        let mut outcome = PipelineOutcome {
            data_name: "x.jpg".to_string(),
            report_content: "draft".to_string(),
            report_path: None,
            master_path: None,
            case_id: None,
            persistence_error: None,
        };

        append_persistence_error(&mut outcome, "报告保存失败: disk full");
        append_persistence_error(&mut outcome, "病例保存失败: disk full");

        let message = outcome.persistence_error.unwrap();
        assert!(message.contains("报告保存失败"));
        assert!(message.contains("病例保存失败"));
    }
}
