//! 规则解析器
//!
//! 将规范化后的规则文本解析为二叉语法树。
//!
//! ```text
//! or_expr    := and_expr ( 'or' and_expr )*
//! and_expr   := term ( 'and' term )*
//! term       := '(' or_expr ')' | comparison
//! comparison := IDENTIFIER COMPARATOR LITERAL
//! ```
//!
//! 同一层级的逻辑链只保留前两个操作数：`a>1 and b>2 and c>3` 解析结果只包含
//! `a>1` 与 `b>2`，之后的操作数被丢弃（整个输入仍需语法正确）。
//!
//! `==` / `!=` 的字面量统一转为文本，排序比较保留字面量原始类型。
//! 括号嵌套深度上限为 [`MAX_NESTING_DEPTH`]。

use crate::error::{Result, RuleError};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::models::{Node, Operand, Value};
use crate::normalizer::normalize;
use crate::operators::{Comparator, Connective};
use tracing::debug;

/// 括号最大嵌套深度
pub const MAX_NESTING_DEPTH: usize = 200;

/// 规范化并解析规则文本
pub fn parse_rule(text: &str) -> Result<Node> {
    parse(&normalize(text))
}

/// 解析已规范化的规则文本
pub fn parse(text: &str) -> Result<Node> {
    let tokens = Lexer::new(text).tokenize()?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        end: text.len(),
        depth: 0,
    };

    if parser.tokens.is_empty() {
        return Err(RuleError::syntax(0, "规则为空"));
    }

    let node = parser.parse_or()?;

    if let Some(token) = parser.peek() {
        return Err(RuleError::syntax(
            token.position,
            format!("多余的输入 {:?}", token.kind),
        ));
    }

    Ok(node)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    end: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek().is_some_and(|t| &t.kind == kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// 当前 token 位置，输入结束时返回文本末尾
    fn position(&self) -> usize {
        self.peek().map(|t| t.position).unwrap_or(self.end)
    }

    fn parse_or(&mut self) -> Result<Node> {
        let first = self.parse_and()?;
        let mut rest = Vec::new();
        while self.eat(&TokenKind::Or) {
            rest.push(self.parse_and()?);
        }
        Ok(Self::binary(Connective::Or, first, rest))
    }

    fn parse_and(&mut self) -> Result<Node> {
        let first = self.parse_term()?;
        let mut rest = Vec::new();
        while self.eat(&TokenKind::And) {
            rest.push(self.parse_term()?);
        }
        Ok(Self::binary(Connective::And, first, rest))
    }

    /// 构建二叉节点，只取前两个操作数
    fn binary(connective: Connective, first: Node, rest: Vec<Node>) -> Node {
        let mut rest = rest.into_iter();
        match rest.next() {
            None => first,
            Some(second) => {
                let dropped = rest.count();
                if dropped > 0 {
                    debug!(%connective, dropped, "逻辑链超过两个操作数，多余部分被丢弃");
                }
                Node::operator(connective, first, second)
            }
        }
    }

    fn parse_term(&mut self) -> Result<Node> {
        let position = self.position();
        if self.eat(&TokenKind::LParen) {
            if self.depth >= MAX_NESTING_DEPTH {
                return Err(RuleError::syntax(
                    position,
                    format!("括号嵌套过深, 最多 {} 层", MAX_NESTING_DEPTH),
                ));
            }
            self.depth += 1;
            let node = self.parse_or()?;
            self.depth -= 1;
            if !self.eat(&TokenKind::RParen) {
                return Err(RuleError::syntax(self.position(), "缺少右括号"));
            }
            return Ok(node);
        }

        self.parse_comparison().map(Node::Operand)
    }

    fn parse_comparison(&mut self) -> Result<Operand> {
        let position = self.position();
        let field = match self.advance() {
            Some(Token {
                kind: TokenKind::Identifier(name),
                ..
            }) => name,
            Some(Token {
                kind: TokenKind::Number { lexeme, .. },
                ..
            }) => {
                return Err(RuleError::UnsupportedOperand(format!(
                    "左侧必须是字段名, 实际为字面量 {}",
                    lexeme
                )));
            }
            Some(Token {
                kind: TokenKind::Str(s),
                ..
            }) => {
                return Err(RuleError::UnsupportedOperand(format!(
                    "左侧必须是字段名, 实际为字面量 '{}'",
                    s
                )));
            }
            Some(token) => {
                return Err(RuleError::syntax(
                    position,
                    format!("期望字段名, 实际为 {:?}", token.kind),
                ));
            }
            None => return Err(RuleError::syntax(position, "期望比较表达式, 输入已结束")),
        };

        let comparator = self.parse_comparator()?;
        let literal = self.parse_literal(comparator)?;

        Ok(Operand {
            field,
            comparator,
            literal,
        })
    }

    fn parse_comparator(&mut self) -> Result<Comparator> {
        let position = self.position();
        match self.advance() {
            Some(Token {
                kind: TokenKind::Comparator(symbol),
                ..
            }) => symbol.parse(),
            Some(Token {
                kind: TokenKind::Identifier(word),
                ..
            }) if matches!(word.as_str(), "in" | "is" | "not") => {
                Err(RuleError::UnsupportedOperator(word))
            }
            Some(token) => Err(RuleError::syntax(
                position,
                format!("期望比较操作符, 实际为 {:?}", token.kind),
            )),
            None => Err(RuleError::syntax(position, "期望比较操作符, 输入已结束")),
        }
    }

    /// 解析右侧字面量，等值比较的字面量转为文本
    fn parse_literal(&mut self, comparator: Comparator) -> Result<Value> {
        let position = self.position();
        match self.advance() {
            Some(Token {
                kind: TokenKind::Number { value, .. },
                ..
            }) if comparator.is_ordering() => Ok(Value::Number(value)),
            Some(Token {
                kind: TokenKind::Number { value, lexeme },
                ..
            }) => Ok(Value::Text(number_text(&lexeme, value))),
            Some(Token {
                kind: TokenKind::Str(s),
                ..
            }) => Ok(Value::Text(s)),
            // 等值比较允许不加引号的文本：status == active
            Some(Token {
                kind: TokenKind::Identifier(word),
                ..
            }) if !comparator.is_ordering() => Ok(Value::Text(word)),
            Some(Token {
                kind: TokenKind::Identifier(word),
                ..
            }) => Err(RuleError::UnsupportedOperand(format!(
                "{} 右侧必须是字面量, 实际为字段 {}",
                comparator, word
            ))),
            Some(Token {
                kind: TokenKind::LParen,
                ..
            }) => Err(RuleError::UnsupportedOperand(format!(
                "{} 右侧必须是字面量, 实际为表达式",
                comparator
            ))),
            Some(Token {
                kind: TokenKind::Minus,
                ..
            }) => Err(RuleError::UnsupportedOperand(format!(
                "{} 右侧必须是字面量, 实际为负号表达式",
                comparator
            ))),
            Some(token) => Err(RuleError::syntax(
                position,
                format!("期望字面量, 实际为 {:?}", token.kind),
            )),
            None => Err(RuleError::syntax(position, "期望字面量, 输入已结束")),
        }
    }
}

/// 数值字面量的文本形式
///
/// 整数保留全部数字（只去掉前导零），小数使用最短往返写法并保留小数部分：
/// `18` -> "18"，`18.0` -> "18.0"，`1.50` -> "1.5"。
fn number_text(lexeme: &str, value: f64) -> String {
    if lexeme.contains('.') {
        format!("{:?}", value)
    } else {
        let digits = lexeme.trim_start_matches('0');
        if digits.is_empty() {
            "0".to_string()
        } else {
            digits.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_comparison() {
        let node = parse_rule("age > 18").unwrap();
        assert_eq!(node, Node::operand("age", Comparator::Gt, 18));
    }

    #[test]
    fn test_all_comparators() {
        let cases = [
            ("a > 1", Comparator::Gt),
            ("a < 1", Comparator::Lt),
            ("a >= 1", Comparator::Gte),
            ("a <= 1", Comparator::Lte),
            ("a == 1", Comparator::Eq),
            ("a != 1", Comparator::Neq),
        ];
        for (text, expected) in cases {
            match parse_rule(text).unwrap() {
                Node::Operand(op) => assert_eq!(op.comparator, expected, "{}", text),
                other => panic!("unexpected node {:?}", other),
            }
        }
    }

    #[test]
    fn test_ordering_keeps_literal_type() {
        assert_eq!(
            parse_rule("score <= 9.5").unwrap(),
            Node::operand("score", Comparator::Lte, 9.5)
        );
        assert_eq!(
            parse_rule("name > 'm'").unwrap(),
            Node::operand("name", Comparator::Gt, "m")
        );
    }

    #[test]
    fn test_equality_coerces_to_text() {
        let quoted = parse_rule("status == 'active'").unwrap();
        let bare = parse_rule("status = active").unwrap();
        assert_eq!(quoted, bare);
        assert_eq!(quoted, Node::operand("status", Comparator::Eq, "active"));

        assert_eq!(
            parse_rule("age != 18").unwrap(),
            Node::operand("age", Comparator::Neq, "18")
        );
        assert_eq!(
            parse_rule("ratio == 1.50").unwrap(),
            Node::operand("ratio", Comparator::Eq, "1.5")
        );
    }

    #[test]
    fn test_equality_literal_keeps_written_digits() {
        assert_eq!(
            parse_rule("account == 12345678901234567891").unwrap(),
            Node::operand("account", Comparator::Eq, "12345678901234567891")
        );
        assert_eq!(
            parse_rule("version == 18.0").unwrap(),
            Node::operand("version", Comparator::Eq, "18.0")
        );
        assert_eq!(
            parse_rule("code != 007").unwrap(),
            Node::operand("code", Comparator::Neq, "7")
        );
    }

    #[test]
    fn test_nesting_depth_limit() {
        let nested = |depth: usize| {
            format!("{}a > 1{}", "(".repeat(depth), ")".repeat(depth))
        };

        assert!(parse_rule(&nested(MAX_NESTING_DEPTH)).is_ok());

        let err = parse_rule(&nested(MAX_NESTING_DEPTH + 1)).unwrap_err();
        assert!(matches!(err, RuleError::Syntax { position, .. } if position == MAX_NESTING_DEPTH));

        let err = parse_rule(&nested(5000)).unwrap_err();
        assert!(matches!(err, RuleError::Syntax { .. }));
    }

    #[test]
    fn test_negative_literal_is_unsupported_operand() {
        for text in ["age > -5", "delta == -1"] {
            assert!(
                matches!(parse_rule(text).unwrap_err(), RuleError::UnsupportedOperand(_)),
                "{}",
                text
            );
        }
        assert!(matches!(
            parse_rule("-age > 5").unwrap_err(),
            RuleError::Syntax { .. }
        ));
    }

    #[test]
    fn test_and_or_connectives() {
        let node = parse_rule("age > 18 AND status == 'active'").unwrap();
        assert_eq!(
            node,
            Node::operator(
                Connective::And,
                Node::operand("age", Comparator::Gt, 18),
                Node::operand("status", Comparator::Eq, "active"),
            )
        );

        let node = parse_rule("a > 1 OR b < 2").unwrap();
        assert!(matches!(
            node,
            Node::Operator {
                connective: Connective::Or,
                ..
            }
        ));
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let node = parse_rule("a > 1 and b > 2 or c > 3").unwrap();
        assert_eq!(
            node,
            Node::operator(
                Connective::Or,
                Node::operator(
                    Connective::And,
                    Node::operand("a", Comparator::Gt, 1),
                    Node::operand("b", Comparator::Gt, 2),
                ),
                Node::operand("c", Comparator::Gt, 3),
            )
        );
    }

    #[test]
    fn test_parentheses() {
        let node = parse_rule("(a > 1 OR b > 2) AND (c > 3)").unwrap();
        assert_eq!(node.operator_count(), 2);
        assert_eq!(node.operands().len(), 3);
        assert!(matches!(
            node,
            Node::Operator {
                connective: Connective::And,
                ..
            }
        ));
    }

    #[test]
    fn test_chain_keeps_first_two_operands() {
        let node = parse_rule("a>1 AND b>2 AND c>3").unwrap();
        assert_eq!(
            node,
            Node::operator(
                Connective::And,
                Node::operand("a", Comparator::Gt, 1),
                Node::operand("b", Comparator::Gt, 2),
            )
        );
        assert!(node.operands().iter().all(|o| o.field != "c"));
    }

    #[test]
    fn test_chain_still_requires_valid_syntax() {
        let err = parse_rule("a>1 AND b>2 AND c>").unwrap_err();
        assert!(matches!(err, RuleError::Syntax { .. }));
    }

    #[test]
    fn test_uppercase_connective_without_spaces_fails() {
        let err = parse_rule("(a > 1)AND(b > 2)").unwrap_err();
        assert!(matches!(err, RuleError::Syntax { .. }));
    }

    #[test]
    fn test_syntax_errors() {
        for text in ["", "   ", "age >", "age 18", "(age > 18", "age > 18)", "age", "> 18"] {
            let err = parse_rule(text).unwrap_err();
            assert!(
                matches!(err, RuleError::Syntax { .. }),
                "{:?} -> {:?}",
                text,
                err
            );
        }
    }

    #[test]
    fn test_syntax_error_position() {
        let err = parse_rule("age > 18 and").unwrap_err();
        assert!(matches!(err, RuleError::Syntax { position: 12, .. }));
    }

    #[test]
    fn test_unsupported_operand() {
        assert!(matches!(
            parse_rule("age > limit").unwrap_err(),
            RuleError::UnsupportedOperand(_)
        ));
        assert!(matches!(
            parse_rule("18 < age").unwrap_err(),
            RuleError::UnsupportedOperand(_)
        ));
        assert!(matches!(
            parse_rule("age > (18)").unwrap_err(),
            RuleError::UnsupportedOperand(_)
        ));
    }

    #[test]
    fn test_unsupported_operator() {
        for (text, op) in [
            ("a <> 1", "<>"),
            ("a => 1", "==>"),
            ("a === 1", "==="),
            ("role in 'admin'", "in"),
        ] {
            match parse_rule(text).unwrap_err() {
                RuleError::UnsupportedOperator(found) => assert_eq!(found, op, "{}", text),
                other => panic!("{} -> {:?}", text, other),
            }
        }
    }

    #[test]
    fn test_parse_requires_normalized_input() {
        assert!(parse("status = active").is_err());
        assert!(parse("status == active").is_ok());
    }
}
