//! 规则管理服务
//!
//! 通过 REST API 暴露规则的创建、编辑、组合、校验与评估。
//!
//! ## 模块结构
//!
//! - `dto`: 请求和响应的数据传输对象
//! - `error`: 错误类型定义
//! - `handlers`: HTTP 请求处理器
//! - `routes`: 路由配置
//! - `seed`: 启动时预加载规则
//! - `state`: 应用状态
//!
//! ## 技术栈
//!
//! - Web 框架：Axum
//! - 数据验证：validator
//! - 序列化：serde (camelCase)

pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod seed;
pub mod state;

pub use dto::{
    ApiResponse, CombineRulesRequest, CreateRuleRequest, EvaluateQuery, EvaluationDto, RuleDto,
    RuleValidationDto, UpdateRuleRequest, ValidateRuleRequest,
};
pub use error::{AdminError, Result};
pub use state::AppState;
