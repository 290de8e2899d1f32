//! 规则存储管理
//!
//! `RuleRepository` 是请求层依赖的存储接口，通过依赖注入传入 `RuleService`。
//! `RuleStore` 是基于 DashMap 的线程安全内存实现，保证创建/更新后立即可读。

use crate::error::{Result, RuleError};
use crate::models::Rule;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::{info, instrument, warn};

/// 规则存储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RuleRepository: Send + Sync {
    /// 保存新规则，返回分配的 ID
    async fn create(&self, name: &str, rule_string: &str) -> Result<i64>;
    async fn get(&self, id: i64) -> Result<Option<Rule>>;
    async fn list(&self) -> Result<Vec<Rule>>;
    /// 更新规则文本，规则不存在时返回 `RuleNotFound`
    async fn update(&self, id: i64, rule_string: &str) -> Result<()>;
}

/// 内存规则存储
#[derive(Clone)]
pub struct RuleStore {
    rules: Arc<DashMap<i64, Rule>>,
    next_id: Arc<AtomicI64>,
}

impl RuleStore {
    /// 创建新的规则存储
    pub fn new() -> Self {
        Self {
            rules: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }

    /// 获取当前存储的规则数量
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// 检查存储是否为空
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.rules.contains_key(&id)
    }
}

impl Default for RuleStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RuleRepository for RuleStore {
    #[instrument(skip(self, rule_string))]
    async fn create(&self, name: &str, rule_string: &str) -> Result<i64> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.rules.insert(id, Rule::new(id, name, rule_string));

        info!(rule_id = id, "规则已保存");
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Option<Rule>> {
        Ok(self.rules.get(&id).map(|r| r.clone()))
    }

    async fn list(&self) -> Result<Vec<Rule>> {
        let mut rules: Vec<Rule> = self.rules.iter().map(|r| r.value().clone()).collect();
        rules.sort_by_key(|r| r.id);
        Ok(rules)
    }

    #[instrument(skip(self, rule_string))]
    async fn update(&self, id: i64, rule_string: &str) -> Result<()> {
        match self.rules.get_mut(&id) {
            Some(mut rule) => {
                rule.rule_string = rule_string.to_string();
                rule.updated_at = Utc::now();
                info!(rule_id = id, "规则已更新");
                Ok(())
            }
            None => {
                warn!("更新不存在的规则: {}", id);
                Err(RuleError::RuleNotFound(id))
            }
        }
    }
}
