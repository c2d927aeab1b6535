use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::models::planet::Planet;

/// 记录存储：planets 表的增删改查
#[async_trait]
pub trait PlanetStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Planet>, sqlx::Error>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Planet>, sqlx::Error>;

    /// 插入新行，返回数据库分配的 id
    async fn insert(&self, name: &str) -> Result<i32, sqlx::Error>;

    /// 返回受影响的行数，0 表示不存在
    async fn update(&self, id: i32, name: &str) -> Result<u64, sqlx::Error>;

    /// 返回受影响的行数，0 表示不存在
    async fn delete(&self, id: i32) -> Result<u64, sqlx::Error>;
}

/// 基于 Postgres 的存储库实现
#[derive(Clone)]
pub struct PgPlanetStore {
    pool: PgPool,
}

impl PgPlanetStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 建表，可重复执行
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS planets (
                id SERIAL PRIMARY KEY,
                name TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        tracing::info!("planets table ready");
        Ok(())
    }
}

#[async_trait]
impl PlanetStore for PgPlanetStore {
    async fn list(&self) -> Result<Vec<Planet>, sqlx::Error> {
        let planets = sqlx::query_as::<_, Planet>("SELECT id, name FROM planets ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(planets)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Planet>, sqlx::Error> {
        let planet = sqlx::query_as::<_, Planet>("SELECT id, name FROM planets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(planet)
    }

    async fn insert(&self, name: &str) -> Result<i32, sqlx::Error> {
        let id = sqlx::query_scalar::<_, i32>("INSERT INTO planets (name) VALUES ($1) RETURNING id")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!("Inserted planet {}", id);
        Ok(id)
    }

    async fn update(&self, id: i32, name: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE planets SET name = $1 WHERE id = $2")
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: i32) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM planets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
