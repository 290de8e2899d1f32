//! 规则文本词法分析

use crate::error::{Result, RuleError};
use std::iter::Peekable;
use std::str::CharIndices;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Identifier(String),
    /// 数值及其原始写法，等值比较按原始写法转为文本
    Number { value: f64, lexeme: String },
    Str(String),
    /// 由 `<>=!` 组成的连续符号，是否受支持由解析器判断
    Comparator(String),
    LParen,
    RParen,
    /// 负号不参与字面量，由解析器作为不支持的操作数处理
    Minus,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// 字节偏移
    pub position: usize,
}

pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        while let Some(&(position, ch)) = self.chars.peek() {
            let kind = match ch {
                c if c.is_whitespace() => {
                    self.chars.next();
                    continue;
                }
                '(' => {
                    self.chars.next();
                    TokenKind::LParen
                }
                ')' => {
                    self.chars.next();
                    TokenKind::RParen
                }
                '-' => {
                    self.chars.next();
                    TokenKind::Minus
                }
                '\'' | '"' => self.read_string(position, ch)?,
                '<' | '>' | '=' | '!' => self.read_comparator(position),
                c if c.is_ascii_digit() => self.read_number(position)?,
                c if c.is_ascii_alphabetic() || c == '_' => self.read_word(position),
                other => {
                    return Err(RuleError::syntax(
                        position,
                        format!("无法识别的字符 '{}'", other),
                    ));
                }
            };

            tokens.push(Token { kind, position });
        }

        Ok(tokens)
    }

    fn read_string(&mut self, start: usize, quote: char) -> Result<TokenKind> {
        self.chars.next();
        let content_start = start + quote.len_utf8();

        for (i, c) in self.chars.by_ref() {
            if c == quote {
                return Ok(TokenKind::Str(self.input[content_start..i].to_string()));
            }
        }

        Err(RuleError::syntax(start, "字符串缺少结束引号"))
    }

    fn read_comparator(&mut self, start: usize) -> TokenKind {
        let end = self.consume_while(|c| matches!(c, '<' | '>' | '=' | '!'));
        TokenKind::Comparator(self.input[start..end].to_string())
    }

    fn read_number(&mut self, start: usize) -> Result<TokenKind> {
        let mut end = self.consume_while(|c| c.is_ascii_digit());

        if let Some(&(_, '.')) = self.chars.peek() {
            self.chars.next();
            let fraction_start = end + 1;
            end = self.consume_while(|c| c.is_ascii_digit());
            if end == fraction_start {
                return Err(RuleError::syntax(start, "小数点后缺少数字"));
            }
        }

        if let Some(&(_, c)) = self.chars.peek() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                return Err(RuleError::syntax(start, "无效的数字字面量"));
            }
        }

        let lexeme = &self.input[start..end];
        let value = lexeme
            .parse::<f64>()
            .map_err(|e| RuleError::syntax(start, format!("无效的数字 '{}': {}", lexeme, e)))?;

        Ok(TokenKind::Number {
            value,
            lexeme: lexeme.to_string(),
        })
    }

    fn read_word(&mut self, start: usize) -> TokenKind {
        let end = self.consume_while(|c| c.is_ascii_alphanumeric() || c == '_');
        match &self.input[start..end] {
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            word => TokenKind::Identifier(word.to_string()),
        }
    }

    /// 消费满足条件的字符，返回结束位置的字节偏移
    fn consume_while(&mut self, pred: impl Fn(char) -> bool) -> usize {
        while let Some(&(_, c)) = self.chars.peek() {
            if !pred(c) {
                break;
            }
            self.chars.next();
        }
        self.chars
            .peek()
            .map(|&(i, _)| i)
            .unwrap_or(self.input.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_comparison_tokens() {
        assert_eq!(
            kinds("age >= 18.5"),
            vec![
                TokenKind::Identifier("age".to_string()),
                TokenKind::Comparator(">=".to_string()),
                TokenKind::Number {
                    value: 18.5,
                    lexeme: "18.5".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_strings_and_keywords() {
        assert_eq!(
            kinds(r#"(a == 'x y') or b != "z""#),
            vec![
                TokenKind::LParen,
                TokenKind::Identifier("a".to_string()),
                TokenKind::Comparator("==".to_string()),
                TokenKind::Str("x y".to_string()),
                TokenKind::RParen,
                TokenKind::Or,
                TokenKind::Identifier("b".to_string()),
                TokenKind::Comparator("!=".to_string()),
                TokenKind::Str("z".to_string()),
            ]
        );
    }

    #[test]
    fn test_uppercase_keyword_is_identifier() {
        assert_eq!(
            kinds("AND"),
            vec![TokenKind::Identifier("AND".to_string())]
        );
    }

    #[test]
    fn test_token_positions() {
        let tokens = Lexer::new("x > 'é' and y < 2").tokenize().unwrap();
        let positions: Vec<_> = tokens.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![0, 2, 4, 9, 13, 15, 17]);
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::new("name == 'abc").tokenize().unwrap_err();
        assert!(matches!(err, RuleError::Syntax { position: 8, .. }));
    }

    #[test]
    fn test_long_integer_keeps_lexeme() {
        assert_eq!(
            kinds("12345678901234567891"),
            vec![TokenKind::Number {
                value: 12345678901234567891.0,
                lexeme: "12345678901234567891".to_string(),
            }]
        );
    }

    #[test]
    fn test_minus_token() {
        assert_eq!(
            kinds("-5"),
            vec![
                TokenKind::Minus,
                TokenKind::Number {
                    value: 5.0,
                    lexeme: "5".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_invalid_characters() {
        assert!(Lexer::new("a > 1 + 2").tokenize().is_err());
        assert!(Lexer::new("a > 1.").tokenize().is_err());
        assert!(Lexer::new("a > 18abc").tokenize().is_err());
        assert!(Lexer::new("a.b > 1").tokenize().is_err());
    }
}
