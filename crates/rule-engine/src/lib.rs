//! 规则表达式引擎
//!
//! 以文本形式定义条件规则（如 `age > 18 AND status == 'active'`），提供：
//! - 规则文本规范化与解析（二叉语法树）
//! - 基于封闭类型分派的求值，不执行任意代码
//! - 字段引用提取与规则组合
//! - 存储接口与请求层业务编排

pub mod combiner;
pub mod error;
pub mod evaluator;
pub mod fields;
pub mod lexer;
pub mod models;
pub mod normalizer;
pub mod operators;
pub mod parser;
pub mod service;
pub mod store;

pub use combiner::{combine, combine_with};
pub use error::{Result, RuleError};
pub use evaluator::{ComparisonEvaluator, Evaluator, evaluate};
pub use fields::extract_fields;
pub use models::{EvaluationRecord, EvaluationResult, Node, Operand, Rule, Value};
pub use normalizer::normalize;
pub use operators::{Comparator, Connective};
pub use parser::{MAX_NESTING_DEPTH, parse, parse_rule};
pub use service::{MAX_RULE_LENGTH, RuleService, RuleValidation};
pub use store::{RuleRepository, RuleStore};
