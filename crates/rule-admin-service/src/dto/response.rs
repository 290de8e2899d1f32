//! 响应 DTO 定义

use chrono::{DateTime, Utc};
use rule_engine::{EvaluationResult, Node, Rule, RuleValidation};
use serde::Serialize;

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// 创建成功响应
    pub fn success(data: T) -> Self {
        Self::success_with_message(data, "操作成功")
    }

    /// 创建成功响应（自定义消息）
    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: message.into(),
            data: Some(data),
        }
    }
}

/// 规则响应 DTO
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDto {
    pub id: i64,
    pub name: String,
    pub rule_string: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Rule> for RuleDto {
    fn from(rule: Rule) -> Self {
        Self {
            id: rule.id,
            name: rule.name,
            rule_string: rule.rule_string,
            created_at: rule.created_at,
            updated_at: rule.updated_at,
        }
    }
}

/// 评估结果 DTO
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationDto {
    pub result: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Vec<String>>,
    pub evaluation_time_ms: i64,
}

impl EvaluationDto {
    /// 未请求轨迹时不返回 trace 字段
    pub fn from_result(result: EvaluationResult, with_trace: bool) -> Self {
        Self {
            result: result.matched,
            trace: with_trace.then_some(result.evaluation_trace),
            evaluation_time_ms: result.evaluation_time_ms,
        }
    }
}

/// 规则校验结果 DTO
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleValidationDto {
    pub normalized: String,
    pub fields: Vec<String>,
    pub ast: Node,
}

impl From<RuleValidation> for RuleValidationDto {
    fn from(v: RuleValidation) -> Self {
        Self {
            normalized: v.normalized,
            fields: v.fields,
            ast: v.ast,
        }
    }
}
