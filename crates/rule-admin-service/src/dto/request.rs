//! 请求 DTO 定义
//!
//! 规则名称与规则文本的长度上限与存储列宽一致

use serde::Deserialize;
use validator::Validate;

/// 创建规则请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRuleRequest {
    #[validate(length(min = 1, max = 100, message = "规则名称不能为空且不超过100字符"))]
    pub name: String,
    #[validate(length(min = 1, max = 500, message = "规则内容不能为空且不超过500字符"))]
    pub rule_string: String,
}

/// 更新规则请求
///
/// 只允许修改规则文本，名称保持不变
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRuleRequest {
    #[validate(length(min = 1, max = 500, message = "规则内容不能为空且不超过500字符"))]
    pub rule_string: String,
}

/// 组合规则请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CombineRulesRequest {
    pub rule_ids: Vec<i64>,
    /// AND 或 OR（不区分大小写），缺省为 OR
    pub operator: Option<String>,
    #[validate(length(min = 1, max = 100, message = "规则名称不能为空且不超过100字符"))]
    pub name: Option<String>,
}

/// 校验规则请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRuleRequest {
    #[validate(length(min = 1, max = 500, message = "规则内容不能为空且不超过500字符"))]
    pub rule_string: String,
}

/// 评估查询参数
#[derive(Debug, Default, Deserialize)]
pub struct EvaluateQuery {
    /// 是否返回逐节点的评估轨迹
    #[serde(default)]
    pub trace: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_rule_validation() {
        let req = CreateRuleRequest {
            name: "adult".to_string(),
            rule_string: "age > 18".to_string(),
        };
        assert!(req.validate().is_ok());

        let req = CreateRuleRequest {
            name: String::new(),
            rule_string: "age > 18".to_string(),
        };
        assert!(req.validate().is_err());

        let req = CreateRuleRequest {
            name: "long".to_string(),
            rule_string: "a".repeat(501),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_combine_request_deserialize() {
        let req: CombineRulesRequest =
            serde_json::from_str(r#"{"ruleIds": [1, 2], "operator": "and"}"#).unwrap();
        assert_eq!(req.rule_ids, vec![1, 2]);
        assert_eq!(req.operator.as_deref(), Some("and"));
        assert!(req.name.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_combine_request_rejects_empty_name() {
        let req = CombineRulesRequest {
            rule_ids: vec![1, 2],
            operator: None,
            name: Some(String::new()),
        };
        assert!(req.validate().is_err());
    }
}
