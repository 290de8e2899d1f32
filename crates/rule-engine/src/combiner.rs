//! 规则组合
//!
//! 将多条规则文本各自加括号后用 ` AND ` / ` OR ` 连接。组合结果在存储前必须
//! 重新经过解析器校验（见 `RuleService::combine_rules`）。

use crate::error::{Result, RuleError};
use crate::operators::Connective;

pub fn combine<S: AsRef<str>>(rules: &[S], connective: Connective) -> Result<String> {
    if rules.len() < 2 {
        return Err(RuleError::InsufficientRules(rules.len()));
    }

    Ok(rules
        .iter()
        .map(|rule| format!("({})", rule.as_ref()))
        .collect::<Vec<_>>()
        .join(connective.separator()))
}

/// 逻辑操作符以字符串给出（不区分大小写）
pub fn combine_with<S: AsRef<str>>(rules: &[S], connective: &str) -> Result<String> {
    let connective: Connective = connective.parse()?;
    combine(rules, connective)
}
