/// 缓存操作
/// 提供缓存操作的功能实现

// 行星缓存操作
pub mod planet;

pub mod rate_limit;

// 重新导出常用操作
pub use planet::PlanetCache;
pub use rate_limit::RateLimitCacheOperations;
