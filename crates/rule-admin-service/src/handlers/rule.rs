//! 规则 API 处理器
//!
//! 实现规则的创建、查询、编辑、组合、校验与评估。
//! 所有写入操作都会先经过规则引擎的语法校验。

use std::str::FromStr;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rule_engine::Connective;
use tracing::info;
use validator::Validate;

use crate::{
    dto::{
        ApiResponse, CombineRulesRequest, CreateRuleRequest, EvaluateQuery, EvaluationDto,
        RuleDto, RuleValidationDto, UpdateRuleRequest, ValidateRuleRequest,
    },
    error::AdminError,
    state::AppState,
};

/// 创建规则
///
/// POST /api/rules
pub async fn create_rule(
    State(state): State<AppState>,
    Json(req): Json<CreateRuleRequest>,
) -> Result<Json<ApiResponse<RuleDto>>, AdminError> {
    req.validate()?;

    let rule = state
        .rule_service
        .create_rule(&req.name, &req.rule_string)
        .await?;

    info!(rule_id = rule.id, name = %rule.name, "Rule created via API");

    Ok(Json(ApiResponse::success_with_message(
        rule.into(),
        "规则创建成功",
    )))
}

/// 获取规则列表
///
/// GET /api/rules
pub async fn list_rules(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<RuleDto>>>, AdminError> {
    let rules = state.rule_service.list_rules().await?;
    Ok(Json(ApiResponse::success(
        rules.into_iter().map(RuleDto::from).collect(),
    )))
}

/// 获取规则详情
///
/// GET /api/rules/{id}
pub async fn get_rule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<RuleDto>>, AdminError> {
    let rule = state.rule_service.get_rule(id).await?;
    Ok(Json(ApiResponse::success(rule.into())))
}

/// 编辑规则文本
///
/// PUT /api/rules/{id}
pub async fn update_rule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateRuleRequest>,
) -> Result<Json<ApiResponse<RuleDto>>, AdminError> {
    req.validate()?;

    let rule = state.rule_service.edit_rule(id, &req.rule_string).await?;

    info!(rule_id = id, "Rule updated via API");

    Ok(Json(ApiResponse::success_with_message(
        rule.into(),
        "规则更新成功",
    )))
}

/// 组合多条规则为一条新规则
///
/// POST /api/rules/combine
pub async fn combine_rules(
    State(state): State<AppState>,
    Json(req): Json<CombineRulesRequest>,
) -> Result<Json<ApiResponse<RuleDto>>, AdminError> {
    req.validate()?;

    let connective = match req.operator.as_deref() {
        Some(op) => Connective::from_str(op)?,
        None => Connective::Or,
    };

    let rule = state
        .rule_service
        .combine_rules(&req.rule_ids, connective, req.name.as_deref())
        .await?;

    Ok(Json(ApiResponse::success_with_message(
        rule.into(),
        "规则组合成功",
    )))
}

/// 校验规则文本并返回所需字段（不存储）
///
/// POST /api/rules/validate
pub async fn validate_rule(
    State(state): State<AppState>,
    Json(req): Json<ValidateRuleRequest>,
) -> Result<Json<ApiResponse<RuleValidationDto>>, AdminError> {
    req.validate()?;

    let validation = state.rule_service.validate_rule(&req.rule_string)?;
    Ok(Json(ApiResponse::success(validation.into())))
}

/// 使用请求体中的数据评估规则
///
/// 规则未引用的字段可以是任意 JSON 类型
///
/// POST /api/rules/{id}/evaluate
pub async fn evaluate_rule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<EvaluateQuery>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<ApiResponse<EvaluationDto>>, AdminError> {
    let result = state
        .rule_service
        .evaluate_json(id, &body, query.trace)
        .await?;

    Ok(Json(ApiResponse::success(EvaluationDto::from_result(
        result,
        query.trace,
    ))))
}
