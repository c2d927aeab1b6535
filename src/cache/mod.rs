// 缓存模块
// 包含缓存后端、缓存键和缓存操作

pub mod backend;
pub mod keys;
pub mod operations;

// 重新导出常用类型，方便其他模块使用
pub use backend::{CacheError, CacheStore, MemoryCache, RedisCache, WindowCount};
pub use operations::{PlanetCache, RateLimitCacheOperations};
