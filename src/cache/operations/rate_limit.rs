use std::time::Duration;

use crate::cache::backend::{CacheError, CacheStore, WindowCount};
use crate::cache::keys::rate_limit_key;

/// 速率限制缓存操作
pub struct RateLimitCacheOperations;

impl RateLimitCacheOperations {
    /// 增加客户端在当前窗口内的请求计数，返回加一后的值和窗口剩余时间
    pub async fn increment(
        cache: &dyn CacheStore,
        client: &str,
        window: Duration,
    ) -> Result<WindowCount, CacheError> {
        cache.incr_window(&rate_limit_key(client), window).await
    }
}
