//! 审计拦截器
//!
//! 写入前为新增的聚合填写创建信息，为修改的聚合填写最后修改信息。
//! 只处理开启了审计（`#[aggregate_root(auditable)]`）的聚合。
//!
use crate::{
    error::DomainResult as Result,
    persist::{EntityState, SaveChangesContext, SaveChangesInterceptor},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// 时间来源
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 固定时间（测试用）
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// 当前操作者
pub trait CurrentUser: Send + Sync {
    fn user_id(&self) -> Option<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousUser;

impl CurrentUser for AnonymousUser {
    fn user_id(&self) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct StaticUser(pub String);

impl CurrentUser for StaticUser {
    fn user_id(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

pub struct AuditableEntityInterceptor {
    clock: Arc<dyn Clock>,
    current_user: Arc<dyn CurrentUser>,
}

impl AuditableEntityInterceptor {
    pub fn new(clock: Arc<dyn Clock>, current_user: Arc<dyn CurrentUser>) -> Self {
        Self {
            clock,
            current_user,
        }
    }
}

impl Default for AuditableEntityInterceptor {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock), Arc::new(AnonymousUser))
    }
}

#[async_trait]
impl SaveChangesInterceptor for AuditableEntityInterceptor {
    fn name(&self) -> &str {
        "auditable_entity"
    }

    async fn saving_changes(&self, ctx: &mut SaveChangesContext) -> Result<()> {
        let now = self.clock.now();
        // 未配置当前用户时，退回到本次保存的触发主体
        let user = self
            .current_user
            .user_id()
            .or_else(|| ctx.event_context().actor_id().map(str::to_string));

        for entry in ctx.entries_mut() {
            let state = entry.state();
            let Some(audit) = entry.aggregate_mut().audit_info_mut() else {
                continue;
            };
            match state {
                EntityState::Added => audit.mark_created(now, user.as_deref()),
                EntityState::Modified => audit.mark_modified(now, user.as_deref()),
                EntityState::Deleted | EntityState::Unchanged => {}
            }
        }

        Ok(())
    }
}
