//! 应用状态定义
//!
//! 包含 Axum 路由共享的应用状态

use std::sync::Arc;

use rule_engine::{RuleRepository, RuleService, RuleStore};

/// Axum 应用共享状态
///
/// `RuleService` 内部通过 Arc 持有仓储，克隆开销很小
#[derive(Clone)]
pub struct AppState {
    pub rule_service: RuleService,
}

impl AppState {
    /// 使用指定仓储创建应用状态
    pub fn new(repository: Arc<dyn RuleRepository>) -> Self {
        Self {
            rule_service: RuleService::new(repository),
        }
    }

    /// 使用内存存储创建应用状态
    pub fn in_memory() -> Self {
        Self::new(Arc::new(RuleStore::new()))
    }
}
