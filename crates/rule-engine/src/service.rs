//! 规则服务
//!
//! 请求层的业务编排：所有写入路径（创建、编辑、组合）都先解析校验，只有语法
//! 合法的规则文本才会被存储；评估路径先检查评估数据是否覆盖规则所需字段，
//! 再解析并求值，评估错误不会修改存储状态。

use crate::combiner::combine;
use crate::error::{Result, RuleError};
use crate::evaluator::Evaluator;
use crate::fields::extract_fields;
use crate::models::{EvaluationRecord, EvaluationResult, Node, Rule};
use crate::normalizer::normalize;
use crate::operators::Connective;
use crate::parser::parse_rule;
use crate::store::RuleRepository;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// 规则文本最大字符数，与存储列宽一致
pub const MAX_RULE_LENGTH: usize = 500;

/// 规则校验结果
#[derive(Debug, Clone, Serialize)]
pub struct RuleValidation {
    pub normalized: String,
    pub fields: Vec<String>,
    pub ast: Node,
}

/// 规则服务
#[derive(Clone)]
pub struct RuleService {
    repository: Arc<dyn RuleRepository>,
}

impl RuleService {
    pub fn new(repository: Arc<dyn RuleRepository>) -> Self {
        Self { repository }
    }

    /// 校验规则文本（不存储）
    pub fn validate_rule(&self, rule_string: &str) -> Result<RuleValidation> {
        let ast = check_rule_text(rule_string)?;
        Ok(RuleValidation {
            normalized: normalize(rule_string),
            fields: sorted_fields(rule_string),
            ast,
        })
    }

    /// 创建规则：先解析校验再存储
    #[instrument(skip(self, rule_string))]
    pub async fn create_rule(&self, name: &str, rule_string: &str) -> Result<Rule> {
        check_rule_text(rule_string)?;

        let id = self.repository.create(name, rule_string).await?;
        info!(rule_id = id, "Rule created");

        self.get_rule(id).await
    }

    pub async fn get_rule(&self, id: i64) -> Result<Rule> {
        self.repository
            .get(id)
            .await?
            .ok_or(RuleError::RuleNotFound(id))
    }

    /// 列出原始存储记录
    pub async fn list_rules(&self) -> Result<Vec<Rule>> {
        self.repository.list().await
    }

    /// 编辑规则文本：先校验再更新
    #[instrument(skip(self, rule_string))]
    pub async fn edit_rule(&self, id: i64, rule_string: &str) -> Result<Rule> {
        check_rule_text(rule_string)?;

        self.repository.update(id, rule_string).await?;
        info!(rule_id = id, "Rule updated");

        self.get_rule(id).await
    }

    /// 组合多条已存储的规则
    ///
    /// 重复的 ID 只计一次；任一 ID 不存在返回 `RuleNotFound`。组合结果重新
    /// 校验（长度与语法）后才会存储，保证可以原样再次编辑。
    #[instrument(skip(self))]
    pub async fn combine_rules(
        &self,
        rule_ids: &[i64],
        connective: Connective,
        name: Option<&str>,
    ) -> Result<Rule> {
        let mut unique_ids = Vec::with_capacity(rule_ids.len());
        for id in rule_ids {
            if !unique_ids.contains(id) {
                unique_ids.push(*id);
            }
        }

        if unique_ids.len() < 2 {
            return Err(RuleError::InsufficientRules(unique_ids.len()));
        }

        let mut rule_strings = Vec::with_capacity(unique_ids.len());
        for id in &unique_ids {
            rule_strings.push(self.get_rule(*id).await?.rule_string);
        }

        let combined = combine(&rule_strings, connective)?;
        if let Err(e) = check_rule_text(&combined) {
            warn!(error = %e, "组合后的规则未通过校验");
            return Err(e);
        }

        let default_name = format!("Combined Rule with {}", connective);
        let name = name.unwrap_or(&default_name);
        let id = self.repository.create(name, &combined).await?;
        info!(rule_id = id, source_rules = ?unique_ids, "Rules combined");

        self.get_rule(id).await
    }

    /// 评估规则
    ///
    /// 缺失字段一次性汇总为 `MissingFields`，不会在语法树遍历中途失败。
    #[instrument(skip(self, record))]
    pub async fn evaluate_rule(
        &self,
        id: i64,
        record: &EvaluationRecord,
        trace: bool,
    ) -> Result<EvaluationResult> {
        let rule = self.get_rule(id).await?;
        self.evaluate_loaded(&rule, record, trace)
    }

    /// 使用 JSON 对象评估规则
    ///
    /// 先加载规则再转换评估数据，规则不存在时优先返回 `RuleNotFound`。
    #[instrument(skip(self, body))]
    pub async fn evaluate_json(
        &self,
        id: i64,
        body: &serde_json::Value,
        trace: bool,
    ) -> Result<EvaluationResult> {
        let rule = self.get_rule(id).await?;
        let record = EvaluationRecord::from_json(body)?;
        self.evaluate_loaded(&rule, &record, trace)
    }

    fn evaluate_loaded(
        &self,
        rule: &Rule,
        record: &EvaluationRecord,
        trace: bool,
    ) -> Result<EvaluationResult> {

        let missing: Vec<String> = sorted_fields(&rule.rule_string)
            .into_iter()
            .filter(|field| !record.contains(field))
            .collect();
        if !missing.is_empty() {
            return Err(RuleError::MissingFields(missing));
        }

        let ast = parse_rule(&rule.rule_string)?;

        let evaluator = if trace {
            Evaluator::new().with_trace()
        } else {
            Evaluator::new()
        };
        let result = evaluator.execute(&ast, record)?;

        info!(rule_id = rule.id, matched = result.matched, "Rule evaluated");
        Ok(result)
    }
}

/// 长度检查后解析
fn check_rule_text(rule_string: &str) -> Result<Node> {
    let length = rule_string.chars().count();
    if length > MAX_RULE_LENGTH {
        return Err(RuleError::RuleTooLong {
            length,
            max: MAX_RULE_LENGTH,
        });
    }
    parse_rule(rule_string)
}

fn sorted_fields(rule_string: &str) -> Vec<String> {
    let mut fields: Vec<String> = extract_fields(rule_string).into_iter().collect();
    fields.sort();
    fields
}
