// 业务逻辑模块
pub mod planet;

pub use planet::PlanetService;
