//! 规则评估器
//!
//! 递归遍历语法树，对评估数据求值。逻辑节点的两个子节点都会被求值后才应用
//! AND / OR（不短路），因此无关分支上的缺失字段同样会报错。
//!
//! 比较只通过封闭的 `Value` × `Comparator` 分派完成，不会执行任何规则文本。

use crate::error::{Result, RuleError};
use crate::models::{EvaluationRecord, EvaluationResult, Node, Operand, Value};
use crate::operators::{Comparator, Connective};
use std::cmp::Ordering;
use std::time::Instant;
use tracing::debug;

/// 对语法树求值
pub fn evaluate(ast: &Node, record: &EvaluationRecord) -> Result<bool> {
    Evaluator::new().evaluate(ast, record)
}

/// 规则评估器
#[derive(Debug, Default)]
pub struct Evaluator {
    /// 是否记录详细评估追踪
    trace_enabled: bool,
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            trace_enabled: false,
        }
    }

    /// 启用评估追踪
    pub fn with_trace(mut self) -> Self {
        self.trace_enabled = true;
        self
    }

    pub fn evaluate(&self, ast: &Node, record: &EvaluationRecord) -> Result<bool> {
        let mut trace = Vec::new();
        self.evaluate_node(ast, record, &mut trace)
    }

    /// 执行评估并返回追踪信息和耗时
    pub fn execute(&self, ast: &Node, record: &EvaluationRecord) -> Result<EvaluationResult> {
        let start = Instant::now();
        let mut trace = Vec::new();

        let matched = self.evaluate_node(ast, record, &mut trace)?;

        Ok(EvaluationResult {
            matched,
            evaluation_trace: trace,
            evaluation_time_ms: start.elapsed().as_millis() as i64,
        })
    }

    fn evaluate_node(
        &self,
        node: &Node,
        record: &EvaluationRecord,
        trace: &mut Vec<String>,
    ) -> Result<bool> {
        match node {
            Node::Operand(operand) => self.evaluate_operand(operand, record, trace),
            Node::Operator {
                connective,
                left,
                right,
            } => {
                let left = self.evaluate_node(left, record, trace)?;
                let right = self.evaluate_node(right, record, trace)?;
                let matched = match connective {
                    Connective::And => left && right,
                    Connective::Or => left || right,
                };

                if self.trace_enabled {
                    trace.push(format!("{} => {}", connective, verdict(matched)));
                }

                Ok(matched)
            }
        }
    }

    fn evaluate_operand(
        &self,
        operand: &Operand,
        record: &EvaluationRecord,
        trace: &mut Vec<String>,
    ) -> Result<bool> {
        let value = record.value(&operand.field)?;

        let matched =
            ComparisonEvaluator::compare(&operand.field, value, operand.comparator, &operand.literal)?;

        debug!(field = %operand.field, comparator = %operand.comparator, matched, "operand evaluated");

        if self.trace_enabled {
            trace.push(format!("{} => {}", operand, verdict(matched)));
        }

        Ok(matched)
    }
}

fn verdict(matched: bool) -> &'static str {
    if matched { "MATCHED" } else { "NOT_MATCHED" }
}

/// 单个比较的分派表
pub struct ComparisonEvaluator;

impl ComparisonEvaluator {
    /// 比较字段值与字面量
    ///
    /// # Arguments
    /// * `field` - 字段名（仅用于错误信息）
    /// * `value` - 评估数据中的字段值
    /// * `comparator` - 比较操作符
    /// * `literal` - 规则中的字面量
    pub fn compare(
        field: &str,
        value: &Value,
        comparator: Comparator,
        literal: &Value,
    ) -> Result<bool> {
        match comparator {
            Comparator::Eq => Ok(Self::text_eq(value, literal)),
            Comparator::Neq => Ok(!Self::text_eq(value, literal)),
            Comparator::Gt => Self::order(field, value, literal).map(|o| o == Ordering::Greater),
            Comparator::Lt => Self::order(field, value, literal).map(|o| o == Ordering::Less),
            Comparator::Gte => Self::order(field, value, literal).map(|o| o != Ordering::Less),
            Comparator::Lte => Self::order(field, value, literal).map(|o| o != Ordering::Greater),
        }
    }

    /// 等值比较在文本层面进行，数值使用规范写法
    fn text_eq(value: &Value, literal: &Value) -> bool {
        value.as_text() == literal.as_text()
    }

    /// 排序比较要求两侧类型一致
    fn order(field: &str, value: &Value, literal: &Value) -> Result<Ordering> {
        match (value, literal) {
            (Value::Number(a), Value::Number(b)) => {
                a.partial_cmp(b).ok_or_else(|| RuleError::TypeMismatch {
                    field: field.to_string(),
                    expected: "comparable number".to_string(),
                    actual: "NaN".to_string(),
                })
            }
            (Value::Text(a), Value::Text(b)) => Ok(a.cmp(b)),
            _ => Err(RuleError::TypeMismatch {
                field: field.to_string(),
                expected: literal.type_name().to_string(),
                actual: value.type_name().to_string(),
            }),
        }
    }
}
