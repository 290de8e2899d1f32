//! 规则引擎错误类型

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("规则语法错误 (位置 {position}): {message}")]
    Syntax { position: usize, message: String },

    #[error("不支持的操作数: {0}")]
    UnsupportedOperand(String),

    #[error("不支持的比较操作符: {0}")]
    UnsupportedOperator(String),

    #[error("字段不存在: {0}")]
    MissingField(String),

    #[error("缺少必需字段: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("类型不匹配: 字段 {field} 期望 {expected}, 实际 {actual}")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("无效的评估数据: 字段 {field} 的类型 {actual} 不受支持")]
    InvalidRecord { field: String, actual: String },

    #[error("规则文本过长: {length} 字符, 最多 {max} 字符")]
    RuleTooLong { length: usize, max: usize },

    #[error("至少需要两条规则才能组合, 实际 {0} 条")]
    InsufficientRules(usize),

    #[error("无效的逻辑操作符: {0}, 仅支持 AND 或 OR")]
    InvalidConnective(String),

    #[error("规则未找到: {0}")]
    RuleNotFound(i64),

    #[error("规则存储错误: {0}")]
    Storage(String),
}

impl RuleError {
    pub(crate) fn syntax(position: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            position,
            message: message.into(),
        }
    }

    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Syntax { .. } => "SYNTAX_ERROR",
            Self::UnsupportedOperand(_) => "UNSUPPORTED_OPERAND",
            Self::UnsupportedOperator(_) => "UNSUPPORTED_OPERATOR",
            Self::MissingField(_) => "MISSING_FIELD",
            Self::MissingFields(_) => "MISSING_FIELDS",
            Self::TypeMismatch { .. } => "TYPE_MISMATCH",
            Self::InvalidRecord { .. } => "INVALID_RECORD",
            Self::RuleTooLong { .. } => "RULE_TOO_LONG",
            Self::InsufficientRules(_) => "INSUFFICIENT_RULES",
            Self::InvalidConnective(_) => "INVALID_CONNECTIVE",
            Self::RuleNotFound(_) => "RULE_NOT_FOUND",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// 是否为规则文本本身的解析错误（创建/编辑/组合时拦截）
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::Syntax { .. } | Self::UnsupportedOperand(_) | Self::UnsupportedOperator(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, RuleError>;
