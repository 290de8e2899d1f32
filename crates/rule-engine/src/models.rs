//! 规则引擎领域模型

use crate::error::{Result, RuleError};
use crate::operators::{Comparator, Connective};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

/// 规则记录（存储的始终是原始规则文本，AST 按需重建）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: i64,
    pub name: String,
    pub rule_string: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Rule {
    pub fn new(id: i64, name: impl Into<String>, rule_string: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            rule_string: rule_string.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// 字面量 / 字段值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Text(_) => "text",
        }
    }

    /// 文本形式：数值使用规范写法（18.0 -> "18"，1.50 -> "1.5"）
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Number(n) => Cow::Owned(n.to_string()),
            Self::Text(s) => Cow::Borrowed(s),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) if s.contains('\'') => write!(f, "\"{}\"", s),
            Self::Text(s) => write!(f, "'{}'", s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// 比较条件（AST 叶子节点）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Operand {
    pub field: String,
    pub comparator: Comparator,
    pub literal: Value,
}

impl Operand {
    pub fn new(field: impl Into<String>, comparator: Comparator, literal: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            comparator,
            literal: literal.into(),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.comparator, self.literal)
    }
}

/// 规则语法树节点
///
/// 内部节点恰好有两个子节点，k 个逻辑节点对应 k+1 个叶子。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Operator {
        connective: Connective,
        left: Box<Node>,
        right: Box<Node>,
    },
    Operand(Operand),
}

impl Node {
    pub fn operator(connective: Connective, left: Node, right: Node) -> Self {
        Self::Operator {
            connective,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn operand(field: impl Into<String>, comparator: Comparator, literal: impl Into<Value>) -> Self {
        Self::Operand(Operand::new(field, comparator, literal))
    }

    /// 按从左到右顺序收集所有叶子
    pub fn operands(&self) -> Vec<&Operand> {
        let mut out = Vec::new();
        self.collect_operands(&mut out);
        out
    }

    fn collect_operands<'a>(&'a self, out: &mut Vec<&'a Operand>) {
        match self {
            Self::Operand(op) => out.push(op),
            Self::Operator { left, right, .. } => {
                left.collect_operands(out);
                right.collect_operands(out);
            }
        }
    }

    pub fn operator_count(&self) -> usize {
        match self {
            Self::Operand(_) => 0,
            Self::Operator { left, right, .. } => 1 + left.operator_count() + right.operator_count(),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operand(op) => write!(f, "{}", op),
            Self::Operator {
                connective,
                left,
                right,
            } => write!(f, "({}) {} ({})", left, connective, right),
        }
    }
}

/// 评估数据：字段名 -> 值，评估期间只读
///
/// JSON 中无法比较的值（布尔、null、数组、对象）只记录类型，规则实际引用
/// 这些字段时才报 `InvalidRecord`。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationRecord {
    fields: HashMap<String, Value>,
    unsupported: HashMap<String, &'static str>,
}

impl EvaluationRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// 链式添加字段
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// 从 JSON 对象创建
    ///
    /// 顶层必须是对象；数值和字符串可参与比较，其余类型的字段延迟到取值时报错。
    pub fn from_json(json: &serde_json::Value) -> Result<Self> {
        let map = json.as_object().ok_or_else(|| RuleError::InvalidRecord {
            field: "$".to_string(),
            actual: json_type_name(json).to_string(),
        })?;

        let mut record = Self::default();
        for (name, value) in map {
            match value {
                serde_json::Value::Number(n) => match n.as_f64() {
                    Some(n) => {
                        record.fields.insert(name.clone(), Value::Number(n));
                    }
                    None => {
                        record.unsupported.insert(name.clone(), "number");
                    }
                },
                serde_json::Value::String(s) => {
                    record.fields.insert(name.clone(), Value::Text(s.clone()));
                }
                other => {
                    record.unsupported.insert(name.clone(), json_type_name(other));
                }
            }
        }

        Ok(record)
    }

    /// 取可比较的字段值，不可比较的字段返回 `None`
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// 评估时取值：缺失返回 `MissingField`，类型不受支持返回 `InvalidRecord`
    pub fn value(&self, field: &str) -> Result<&Value> {
        if let Some(value) = self.fields.get(field) {
            return Ok(value);
        }
        match self.unsupported.get(field) {
            Some(actual) => Err(RuleError::InvalidRecord {
                field: field.to_string(),
                actual: actual.to_string(),
            }),
            None => Err(RuleError::MissingField(field.to_string())),
        }
    }

    /// 字段是否出现在评估数据中（包括类型不受支持的字段）
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field) || self.unsupported.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len() + self.unsupported.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for EvaluationRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            unsupported: HashMap::new(),
        }
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// 评估结果
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationResult {
    pub matched: bool,
    pub evaluation_trace: Vec<String>,
    pub evaluation_time_ms: i64,
}
