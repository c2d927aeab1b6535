use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 行星实体，对应 planets 表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Planet {
    pub id: i32,
    pub name: String,
}
