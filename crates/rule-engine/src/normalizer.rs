//! 规则文本规范化
//!
//! 解析前的两步纯词法改写：
//! 1. 单独的 `=` 改写为 `==`（不影响 `==`、`!=`、`<=`、`>=`）
//! 2. ` AND ` / ` OR ` 改写为语法使用的小写关键字
//!
//! 规范化不报错，非法输入在解析阶段暴露。

use crate::operators::Connective;

pub fn normalize(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 4);

    for (i, &ch) in chars.iter().enumerate() {
        if ch == '=' {
            let prev = i.checked_sub(1).map(|j| chars[j]);
            let next = chars.get(i + 1).copied();
            if !matches!(prev, Some('=' | '!' | '<' | '>')) && next != Some('=') {
                out.push_str("==");
                continue;
            }
        }
        out.push(ch);
    }

    out.replace(
        Connective::Or.separator(),
        &format!(" {} ", Connective::Or.keyword()),
    )
    .replace(
        Connective::And.separator(),
        &format!(" {} ", Connective::And.keyword()),
    )
}
