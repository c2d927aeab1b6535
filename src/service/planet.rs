use std::sync::Arc;

use crate::{
    cache::PlanetCache,
    database::{Planet, PlanetStore},
    error::{AppError, StoreOp},
};

/// 行星业务逻辑：读走缓存，写后使缓存失效
///
/// 所有写操作都在数据库确认成功之后、返回结果之前清理相关缓存键。
/// 同一 id 的并发读写之间不加锁，慢读可能把旧值写回缓存，最长存活一个 TTL。
#[derive(Clone)]
pub struct PlanetService {
    store: Arc<dyn PlanetStore>,
    cache: PlanetCache,
}

impl PlanetService {
    pub fn new(store: Arc<dyn PlanetStore>, cache: PlanetCache) -> Self {
        Self { store, cache }
    }

    pub async fn list(&self) -> Result<Vec<Planet>, AppError> {
        if let Some(planets) = self.cache.get_all().await {
            return Ok(planets);
        }

        let planets = self.store.list().await.map_err(|e| {
            tracing::error!("error selecting planets: {}", e);
            AppError::store(StoreOp::List, e)
        })?;

        self.cache.cache_all(&planets).await;
        Ok(planets)
    }

    pub async fn get(&self, id: i32) -> Result<Planet, AppError> {
        if let Some(planet) = self.cache.get_planet(id).await {
            return Ok(planet);
        }

        let planet = self
            .store
            .find_by_id(id)
            .await
            .map_err(|e| {
                tracing::error!("error selecting planet {}: {}", id, e);
                AppError::store(StoreOp::Get, e)
            })?
            .ok_or(AppError::NotFound(StoreOp::Get))?;

        self.cache.cache_planet(&planet).await;
        Ok(planet)
    }

    /// 新行星不单独缓存，只清理列表缓存
    pub async fn create(&self, name: &str) -> Result<Planet, AppError> {
        let name = validate_name(name)?;

        let id = self.store.insert(name).await.map_err(|e| {
            tracing::error!("error adding planet: {}", e);
            AppError::store(StoreOp::Create, e)
        })?;

        self.cache.invalidate_all().await;
        tracing::info!("Planet {} created", id);

        Ok(Planet {
            id,
            name: name.to_string(),
        })
    }

    pub async fn update(&self, id: i32, name: &str) -> Result<Planet, AppError> {
        let name = validate_name(name)?;

        let affected = self.store.update(id, name).await.map_err(|e| {
            tracing::error!("Error updating planet {}: {}", id, e);
            AppError::store(StoreOp::Update, e)
        })?;
        if affected == 0 {
            return Err(AppError::NotFound(StoreOp::Update));
        }

        self.cache.invalidate_planet(id).await;
        self.cache.invalidate_all().await;

        Ok(Planet {
            id,
            name: name.to_string(),
        })
    }

    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        let affected = self.store.delete(id).await.map_err(|e| {
            tracing::error!("error deleting planet {}: {}", id, e);
            AppError::store(StoreOp::Delete, e)
        })?;
        if affected == 0 {
            return Err(AppError::NotFound(StoreOp::Delete));
        }

        self.cache.invalidate_planet(id).await;
        self.cache.invalidate_all().await;
        Ok(())
    }
}

/// 名称必填且不能全是空白，通过校验后原样保存
fn validate_name(name: &str) -> Result<&str, AppError> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("name must not be empty".into()));
    }
    Ok(name)
}
