// ==========================================
// 生产订单管理 - 引擎层外部协作者
// ==========================================
// 职责: 定义用户会话、产品、工艺服务的窄接口
// 说明: Engine 层定义 trait，宿主应用实现
// ==========================================

use crate::domain::order::Order;
use std::collections::HashSet;
use std::error::Error;

// ==========================================
// 用户会话
// ==========================================

/// 当前用户上下文
///
/// 审计记录在未显式指定操作人时使用当前登录用户名
pub trait UserContext: Send + Sync {
    /// 当前用户名（无会话时返回 None）
    fn current_username(&self) -> Option<String>;
}

/// 固定用户上下文
///
/// 用于批处理任务与单元测试
#[derive(Debug, Clone, Default)]
pub struct StaticUserContext {
    username: Option<String>,
}

impl StaticUserContext {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
        }
    }

    /// 无登录用户
    pub fn anonymous() -> Self {
        Self { username: None }
    }
}

impl UserContext for StaticUserContext {
    fn current_username(&self) -> Option<String> {
        self.username.clone()
    }
}

// ==========================================
// 产品目录
// ==========================================

/// 产品目录
///
/// 校验时检查订单引用的产品是否已被删除
pub trait ProductCatalog: Send + Sync {
    fn is_product_removed(&self, product_id: &str) -> bool;
}

/// 全部产品有效
#[derive(Debug, Clone, Default)]
pub struct ActiveProductCatalog;

impl ProductCatalog for ActiveProductCatalog {
    fn is_product_removed(&self, _product_id: &str) -> bool {
        false
    }
}

/// 基于已删除产品集合的目录
#[derive(Debug, Clone, Default)]
pub struct RemovedProductSet {
    removed: HashSet<String>,
}

impl RemovedProductSet {
    pub fn new<I, S>(removed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            removed: removed.into_iter().map(Into::into).collect(),
        }
    }
}

impl ProductCatalog for RemovedProductSet {
    fn is_product_removed(&self, product_id: &str) -> bool {
        self.removed.contains(product_id)
    }
}

// ==========================================
// 工艺服务
// ==========================================

/// 工艺服务
///
/// 每次保存订单时调用，负责工艺的创建/更新（具体规则不在本模块内）
pub trait TechnologyService: Send + Sync {
    fn create_or_update_technology(
        &self,
        order: &mut Order,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// 空操作工艺服务
#[derive(Debug, Clone, Default)]
pub struct NoOpTechnologyService;

impl TechnologyService for NoOpTechnologyService {
    fn create_or_update_technology(
        &self,
        order: &mut Order,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        tracing::debug!(
            "NoOpTechnologyService: 跳过工艺更新 - number={}, technology={:?}",
            order.number,
            order.technology_id
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_user_context() {
        assert_eq!(
            StaticUserContext::new("planner").current_username(),
            Some("planner".to_string())
        );
        assert_eq!(StaticUserContext::anonymous().current_username(), None);
    }

    #[test]
    fn test_product_catalogs() {
        assert!(!ActiveProductCatalog.is_product_removed("P-1"));

        let catalog = RemovedProductSet::new(["P-9"]);
        assert!(catalog.is_product_removed("P-9"));
        assert!(!catalog.is_product_removed("P-1"));
    }

    #[test]
    fn test_noop_technology_service() {
        let mut order = Order::new("ORD-1");
        order.technology_id = Some("T-1".to_string());
        assert!(NoOpTechnologyService
            .create_or_update_technology(&mut order)
            .is_ok());
        assert_eq!(order.technology_id, Some("T-1".to_string()));
    }
}
