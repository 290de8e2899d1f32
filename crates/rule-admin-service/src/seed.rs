//! 启动时预加载规则
//!
//! 种子文件为 JSON 数组，每个元素包含 `name` 与 `rule_string`（也接受 `ruleString`）。
//! 未通过语法校验的条目记录警告后跳过，不影响服务启动。

use std::path::Path;

use anyhow::Context;
use rule_engine::RuleService;
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct SeedRule {
    name: String,
    #[serde(alias = "ruleString")]
    rule_string: String,
}

/// 从文件加载种子规则，返回成功写入的条数
pub async fn load_seed_file(service: &RuleService, path: &Path) -> anyhow::Result<usize> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("读取种子文件失败: {}", path.display()))?;

    let loaded = load_seed_rules(service, &content).await?;
    info!(path = %path.display(), loaded, "Seed rules loaded");
    Ok(loaded)
}

/// 从 JSON 文本加载种子规则
pub async fn load_seed_rules(service: &RuleService, content: &str) -> anyhow::Result<usize> {
    let seeds: Vec<SeedRule> = serde_json::from_str(content).context("种子文件格式无效")?;

    let mut loaded = 0;
    for seed in seeds {
        match service.create_rule(&seed.name, &seed.rule_string).await {
            Ok(_) => loaded += 1,
            Err(e) => warn!(
                name = %seed.name,
                rule_string = %seed.rule_string,
                error = %e,
                "跳过无效的种子规则"
            ),
        }
    }

    Ok(loaded)
}
