/// 缓存键模块
/// 提供各种缓存键生成函数
pub mod planet_keys;
pub mod rate_limit_keys;

pub use planet_keys::{PLANETS_ALL_KEY, planet_key};
pub use rate_limit_keys::rate_limit_key;
