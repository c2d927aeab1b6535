/// 缓存后端
/// 定义缓存存储接口以及 Redis 和内存两种实现
use std::time::Duration;

use async_trait::async_trait;

pub mod memory;
pub mod redis_cache;

pub use self::memory::MemoryCache;
pub use self::redis_cache::RedisCache;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(#[from] redis::RedisError),
    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 限流窗口内的计数，以及距窗口重置的剩余时间
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowCount {
    pub count: i64,
    pub resets_in: Duration,
}

/// 带过期时间的键值存储，缓存和限流计数共用
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// 键不存在或已过期时返回 None
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// 写入并覆盖旧值，ttl 后过期
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    async fn del(&self, key: &str) -> Result<(), CacheError>;

    /// 计数加一；仅当计数从无到 1 时设置窗口过期时间，两步是原子的
    async fn incr_window(&self, key: &str, window: Duration) -> Result<WindowCount, CacheError>;
}
