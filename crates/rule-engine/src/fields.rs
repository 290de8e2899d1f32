//! 字段引用提取
//!
//! 直接扫描原始规则文本（无需规范化），提取引号外的标识符，忽略逻辑关键字。
//! 评估前用于一次性校验评估数据是否包含规则需要的全部字段。

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z_][A-Za-z0-9_]*\b").expect("identifier pattern is valid")
});

const KEYWORDS: [&str; 2] = ["and", "or"];

/// 提取规则文本中引用的字段名（去重、无序）
pub fn extract_fields(text: &str) -> HashSet<String> {
    let unquoted = mask_quoted(text);

    IDENTIFIER
        .find_iter(&unquoted)
        .map(|m| m.as_str())
        .filter(|word| !KEYWORDS.iter().any(|kw| word.eq_ignore_ascii_case(kw)))
        .map(str::to_string)
        .collect()
}

/// 用空格替换单引号或双引号内的文本（包括引号本身）
fn mask_quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut open_quote: Option<char> = None;

    for ch in text.chars() {
        match open_quote {
            Some(quote) => {
                if ch == quote {
                    open_quote = None;
                }
                out.push(' ');
            }
            None if ch == '\'' || ch == '"' => {
                open_quote = Some(ch);
                out.push(' ');
            }
            None => out.push(ch),
        }
    }

    out
}
