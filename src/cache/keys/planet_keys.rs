/// 行星缓存键前缀
const PLANET_PREFIX: &str = "planet:";

/// 行星列表缓存键
pub const PLANETS_ALL_KEY: &str = "planet:all";

/// 生成单个行星缓存键
pub fn planet_key(id: i32) -> String {
    format!("{}{}", PLANET_PREFIX, id)
}
