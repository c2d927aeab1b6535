// 数据库模块
// 包含实体定义和存储库实现

pub mod models;
pub mod repositories;

pub use models::planet::Planet;
pub use repositories::memory::MemoryPlanetStore;
pub use repositories::planet::{PgPlanetStore, PlanetStore};
