//! LLM提示词构造
//!
//! 把纲要文本原样嵌入固定的双消息指令模板，输出完整的补全请求载荷

use serde::{Deserialize, Serialize};

/// LLM请求参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmParams {
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

impl Default for LlmParams {
    fn default() -> Self {
        // 低采样温度偏向字面遵循模板
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.15,
            top_p: 0.15,
            max_tokens: 1000,
        }
    }
}

/// 聊天消息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// 完整的补全请求载荷
///
/// 流水线需要完整文本才能继续，`stream` 恒为false。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatPrompt {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    pub stream: bool,
}

const SYSTEM_PROMPT: &str = "You are an experienced and detail-oriented radiologist interpreting chest X-ray (CXR) images based on the AI-analyzed results. \
Produce a concise, objective CXR report using short sentences and standard reporting conventions. \
Read and digest the content of the AI-analyzed CXR report section by section before writing the corresponding section of your report. ";

/// 构造补全请求
///
/// 纲要文本与LLM参数的纯函数，不读取任何外部状态。
pub fn build_prompt(synopsis: &str, params: &LlmParams) -> ChatPrompt {
    let user_prompt = format!(
        r#"
Given: AI-analyzed report with risk levels (low, middle, high) for various features.
[AI analyzed CXR report] {synopsis}

Instructions:
1. Read and understand the each feature section of the AI-analyzed report before writing the corresponding section of your report.
2. Use typical CXR terminology and follow the feature order in the report.
3. Write one short, clear sentence per line for better readability.
4. Do not use the terms 'low risk', 'middle risk', or 'high risk' in the report.
5. For low-risk items, do not mention them in the report.
6. For middle-risk items, mention the item in report and suggest further investigation.
7. For high-risk items, mention the item in report and use definitive language.
8. When items in a categories are all low risk, use only the provided standard sentence.
9. Omit 'patient' as a subject, omit the report title, and omit explanations.
10. Use 'No' for negative findings.
11. If Lung section contains middle risk or high risk features, directly report these features and omit the summary sentence (e.g., "No significant abnormality...").

Reporting guidelines:
- If there is a mix of risk levels across the categories, summarize and report the findings according to the instructions for low-risk, middle-risk, and high-risk items.
- Lung features: If all low risk, use 'No significant abnormality (no focal nodule/mass or consolidation) in both lungs could be seen.'
- Mediastinum: If all low risk, use 'The mediastinum shows normal appearance without evidence of focal bulging or widening.'
- Bones: If all low risk, use 'No definite fracture line or focal nodule in bone structures could be seen.'
- Cardiac silhouette: If low risk, use 'The cardiovascular silhouette is within normal limit.'
- Diagnosis: If all low risk, use 'No evidence of pleural effusion or pneumothorax.'
- Catheter and Implant: If all low risk, use 'No iatrogenic catheter or implant is noted.'
- If all items across all categories are low risk, write only 'No significant abnormality of the chest radiography could be identified.'

Report Template 1 (all items across all categories are low risk):
No significant abnormality of the chest radiography could be identified.

1. **Organ**


    **Lung:**
    No significant abnormality (no focal nodule/mass or consolidation) in both lungs could be seen.

    **Mediastinum:**
    The mediastinum shows normal appearance without evidence of focal bulging or widening.

    **Bones:**
    No definite fracture line or focal nodule in bone structures could be seen.

    **Cardiac silhouette:**
    The cardiovascular silhouette is within normal limit.

2. **Diagnosis**

    No evidence of pleural effusion or pneumothorax.

3. **Catheter and Implant**

    No iatrogenic catheter or implant is noted.

Report Template 2 (mix of risk levels across the categories):
1. **Organ**

    **Lung:**
    Minimal {{middle risk feature}} in {{right/left/bilateral}} lungs.
    Mild {{middle risk feature}} over {{right/left/bilateral}} {{upper/middle/lower}} lung.
    {{middle risk feature}} is suspected.
    {{high risk feature}} in {{right/left/bilateral}} lungs.
    {{high risk feature}} over {{right/left/bilateral}} {{upper/middle/lower}} lung.
    {{high risk feature}} is noted.

    **Mediastinum**
    {{middle risk feature}} is suspected.
    {{high risk feature}} is noted.

    **Bones:**
    {{middle risk feature}} is suspected.
    {{high risk feature}} is noted.

    **Cardiac silhouette:**
    {{high risk feature}}.
    {{middle risk feature}}.

2. **Diagnosis**

    {{high risk feature}} is identified.
    {{middle risk feature}} is suspected.

3. **Catheter and Implant**

    S/P {{high risk feature}}
"#
    );

    ChatPrompt {
        model: params.model.clone(),
        messages: vec![
            ChatMessage {
                role: "system".to_string(),
                content: SYSTEM_PROMPT.to_string(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: user_prompt,
            },
        ],
        temperature: params.temperature,
        top_p: params.top_p,
        max_tokens: params.max_tokens,
        stream: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::PredictionTable;
    use crate::mapping::SectionMapping;
    use crate::synopsis::build_synopsis;

    #[test]
    fn test_prompt_is_deterministic() {
        let params = LlmParams::default();
        let a = build_prompt("Lung:\nNodule  high\n\n", &params);
        let b = build_prompt("Lung:\nNodule  high\n\n", &params);
        assert_eq!(a.messages[1].content, b.messages[1].content);
        assert_eq!(a.model, b.model);
    }

    #[test]
    fn test_prompt_embeds_synopsis_verbatim() {
        let synopsis = "Lung:\nAtelectasis  middle\n\nBone:\n\n";
        let prompt = build_prompt(synopsis, &LlmParams::default());
        assert!(prompt.messages[1].content.contains(synopsis));
    }

    #[test]
    fn test_prompt_shape() {
        let prompt = build_prompt("Lung:\n\n", &LlmParams::default());
        assert_eq!(prompt.messages.len(), 2);
        assert_eq!(prompt.messages[0].role, "system");
        assert_eq!(prompt.messages[1].role, "user");
        assert!(!prompt.stream);
        assert_eq!(prompt.max_tokens, 1000);
        assert!(prompt.temperature <= 0.2);
        assert!(prompt.top_p <= 0.2);
    }

    #[test]
    fn test_all_low_input_selects_collapse_sentence() {
        // 全低风险输入：纲要每个分区都只有low行，模板1的固定句必须在指令中
        let json = r#"[
            {"uid": 8, "item": "Mass", "risk": "low"},
            {"uid": 15, "item": "Mediastinal widening", "risk": "low"},
            {"uid": 20, "item": "Fracture", "risk": "low"},
            {"uid": 14, "item": "Cardiomegaly", "risk": "low"},
            {"uid": 7, "item": "Pleural effusion", "risk": "low"},
            {"uid": 44, "item": "Endotracheal tube", "risk": "low"}
        ]"#;
        let table = PredictionTable::from_json(json).unwrap();
        let synopsis = build_synopsis(&table, &SectionMapping::builtin_default());
        assert!(!synopsis.contains("middle"));
        assert!(!synopsis.contains("high"));

        let prompt = build_prompt(&synopsis, &LlmParams::default());
        let user = &prompt.messages[1].content;
        assert!(user.contains(
            "No significant abnormality of the chest radiography could be identified."
        ));
        // 折叠句作为全低捷径只声明一处指令加模板1正文，不逐分区重复
        assert_eq!(
            user.matches("write only 'No significant abnormality of the chest radiography")
                .count(),
            1
        );
    }
}
