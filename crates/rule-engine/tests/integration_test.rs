//! 规则引擎集成测试
//!
//! 测试完整的规则创建、组合、评估工作流。

use rule_engine::{
    Comparator, Connective, EvaluationRecord, Node, RuleError, RuleService, RuleStore, combine,
    evaluate, extract_fields, parse_rule,
};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;

fn record(age: i32, status: &str) -> EvaluationRecord {
    EvaluationRecord::new().with("age", age).with("status", status)
}

fn new_service() -> RuleService {
    RuleService::new(Arc::new(RuleStore::new()))
}

// ==================== 解析与评估 ====================

#[test]
fn test_parse_then_evaluate() {
    let ast = parse_rule("age > 18").unwrap();
    assert!(evaluate(&ast, &EvaluationRecord::new().with("age", 20)).unwrap());
    assert!(!evaluate(&ast, &EvaluationRecord::new().with("age", 17)).unwrap());
}

#[test]
fn test_satisfying_and_violating_records_for_each_comparator() {
    let cases = [
        ("x > 5", 6, 5),
        ("x < 5", 4, 5),
        ("x >= 5", 5, 4),
        ("x <= 5", 5, 6),
        ("x == 5", 5, 6),
        ("x != 5", 6, 5),
        ("x = 5", 5, 6),
    ];

    for (rule, satisfying, violating) in cases {
        let ast = parse_rule(rule).unwrap();
        assert!(
            evaluate(&ast, &EvaluationRecord::new().with("x", satisfying)).unwrap(),
            "{} should match {}",
            rule,
            satisfying
        );
        assert!(
            !evaluate(&ast, &EvaluationRecord::new().with("x", violating)).unwrap(),
            "{} should not match {}",
            rule,
            violating
        );
    }
}

#[test]
fn test_equality_coercion_evaluates_identically() {
    let quoted = parse_rule("status == 'active'").unwrap();
    let bare = parse_rule("status = active").unwrap();

    for status in ["active", "inactive", ""] {
        let r = EvaluationRecord::new().with("status", status);
        assert_eq!(evaluate(&quoted, &r).unwrap(), evaluate(&bare, &r).unwrap());
    }
}

#[test]
fn test_combine_then_evaluate() {
    let combined = combine(&["age > 18", "status == 'active'"], Connective::And).unwrap();
    assert_eq!(combined, "(age > 18) AND (status == 'active')");

    let ast = parse_rule(&combined).unwrap();
    assert!(evaluate(&ast, &record(20, "active")).unwrap());
    assert!(!evaluate(&ast, &record(17, "active")).unwrap());
    assert!(!evaluate(&ast, &record(18, "inactive")).unwrap());
    assert!(evaluate(&ast, &record(25, "active")).unwrap());
}

#[test]
fn test_field_extraction() {
    let fields = extract_fields("age >= 18 AND status == 'active'");
    let expected: HashSet<String> = ["age", "status"].iter().map(|s| s.to_string()).collect();
    assert_eq!(fields, expected);
}

#[test]
fn test_missing_field_names_field() {
    let ast = parse_rule("age > 18").unwrap();
    let err = evaluate(&ast, &EvaluationRecord::new()).unwrap_err();
    assert!(matches!(err, RuleError::MissingField(ref f) if f == "age"));
    assert!(err.to_string().contains("age"));
}

#[test]
fn test_two_operand_limitation() {
    let ast = parse_rule("a>1 AND b>2 AND c>3").unwrap();

    assert_eq!(ast.operator_count(), 1);
    assert_eq!(
        ast.operands()
            .iter()
            .map(|o| o.to_string())
            .collect::<Vec<_>>(),
        vec!["a > 1", "b > 2"]
    );

    // c 不在树中，所以缺失 c 也不影响评估
    let r = EvaluationRecord::new().with("a", 2).with("b", 3);
    assert!(evaluate(&ast, &r).unwrap());
}

#[test]
fn test_tree_shape_invariant() {
    for rule in [
        "a > 1",
        "a > 1 AND b > 2",
        "(a > 1 OR b > 2) AND (c > 3 OR d > 4)",
        "((a > 1) AND (b > 2)) OR ((c > 3) AND ((d > 4) OR (e > 5)))",
    ] {
        let ast = parse_rule(rule).unwrap();
        assert_eq!(ast.operands().len(), ast.operator_count() + 1, "{}", rule);
    }
}

#[test]
fn test_record_from_json_request_body() {
    let ast = parse_rule("(age > 18) AND (dept = sales)").unwrap();
    let r = EvaluationRecord::from_json(&json!({"age": 40, "dept": "sales", "extra": 1})).unwrap();
    assert!(evaluate(&ast, &r).unwrap());
}

#[test]
fn test_node_reconstruction() {
    let ast = parse_rule("age > 18 OR status != 'banned'").unwrap();
    assert_eq!(
        ast,
        Node::operator(
            Connective::Or,
            Node::operand("age", Comparator::Gt, 18),
            Node::operand("status", Comparator::Neq, "banned"),
        )
    );
}

// ==================== 服务工作流 ====================

#[tokio::test]
async fn test_full_workflow_with_service() {
    let service = new_service();

    let adult = service.create_rule("adult", "age > 18").await.unwrap();
    let active = service.create_rule("active", "status = active").await.unwrap();

    let combined = service
        .combine_rules(&[adult.id, active.id], Connective::And, Some("adult & active"))
        .await
        .unwrap();
    assert_eq!(combined.rule_string, "(age > 18) AND (status = active)");

    // 纯文本扫描会把 active 当作字段，评估数据需要提供它
    let r = record(30, "active").with("active", "");
    let result = service.evaluate_rule(combined.id, &r, true).await.unwrap();
    assert!(result.matched);
    assert_eq!(result.evaluation_trace.len(), 3);

    let rules = service.list_rules().await.unwrap();
    assert_eq!(rules.len(), 3);
    assert_eq!(rules[2].name, "adult & active");
}

#[tokio::test]
async fn test_three_way_combine_is_truncated() {
    let service = new_service();
    let a = service.create_rule("a", "a > 1").await.unwrap();
    let b = service.create_rule("b", "b > 1").await.unwrap();
    let c = service.create_rule("c", "c > 1").await.unwrap();

    let combined = service
        .combine_rules(&[a.id, b.id, c.id], Connective::Or, None)
        .await
        .unwrap();
    assert_eq!(combined.rule_string, "(a > 1) OR (b > 1) OR (c > 1)");

    // 字段校验基于文本，c 仍然是必需字段
    let r = EvaluationRecord::new().with("a", 0).with("b", 0).with("c", 5);
    let result = service.evaluate_rule(combined.id, &r, false).await.unwrap();
    assert!(!result.matched);
}

#[tokio::test]
async fn test_type_mismatch_does_not_mutate_state() {
    let service = new_service();
    let rule = service.create_rule("adult", "age > 18").await.unwrap();

    let r = EvaluationRecord::new().with("age", "twenty");
    let err = service.evaluate_rule(rule.id, &r, false).await.unwrap_err();
    assert!(matches!(err, RuleError::TypeMismatch { .. }));

    assert_eq!(service.get_rule(rule.id).await.unwrap(), rule);
}

#[tokio::test]
async fn test_concurrent_evaluation() {
    let service = new_service();
    let rule = service
        .create_rule("r", "age >= 18 AND status == 'active'")
        .await
        .unwrap();
    let rule_id = rule.id;

    let mut handles = Vec::new();
    for age in 0..50 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            let r = record(age, "active");
            let result = service.evaluate_rule(rule_id, &r, false).await.unwrap();
            (age, result.matched)
        }));
    }

    for handle in handles {
        let (age, matched) = handle.await.unwrap();
        assert_eq!(matched, age >= 18);
    }
}
