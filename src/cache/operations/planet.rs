use std::sync::Arc;
use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};

use crate::cache::backend::{CacheError, CacheStore};
use crate::cache::keys::{PLANETS_ALL_KEY, planet_key};
use crate::database::models::planet::Planet;

/// 行星缓存操作
///
/// 缓存只是加速手段：读取失败或反序列化失败都按未命中处理，
/// 写入和删除失败只记录日志，不会让请求失败。
#[derive(Clone)]
pub struct PlanetCache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl PlanetCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub async fn get_planet(&self, id: i32) -> Option<Planet> {
        self.read(&planet_key(id)).await
    }

    pub async fn cache_planet(&self, planet: &Planet) {
        self.write(&planet_key(planet.id), planet).await;
    }

    pub async fn get_all(&self) -> Option<Vec<Planet>> {
        self.read(PLANETS_ALL_KEY).await
    }

    pub async fn cache_all(&self, planets: &[Planet]) {
        self.write(PLANETS_ALL_KEY, planets).await;
    }

    /// 使单个行星缓存失效
    pub async fn invalidate_planet(&self, id: i32) {
        self.invalidate(&planet_key(id)).await;
    }

    /// 使列表缓存失效
    pub async fn invalidate_all(&self) {
        self.invalidate(PLANETS_ALL_KEY).await;
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.try_read(key).await {
            Ok(Some(value)) => {
                tracing::debug!("Cache hit for {}", key);
                Some(value)
            }
            Ok(None) => {
                tracing::debug!("Cache miss for {}", key);
                None
            }
            Err(e) => {
                tracing::warn!("Treating cache {} as a miss: {}", key, e);
                None
            }
        }
    }

    async fn try_read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.store.get(key).await? {
            Some(json) => Ok(Some(decode(&json)?)),
            None => Ok(None),
        }
    }

    async fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let result = match serde_json::to_string(value) {
            Ok(json) => self.store.set_ex(key, &json, self.ttl).await,
            Err(e) => Err(CacheError::from(e)),
        };

        if let Err(e) = result {
            tracing::warn!("Failed to cache {}: {}", key, e);
        }
    }

    async fn invalidate(&self, key: &str) {
        match self.store.del(key).await {
            Ok(()) => tracing::info!("Cache invalidated for {}", key),
            Err(e) => tracing::warn!("Failed to invalidate cache for {}: {}", key, e),
        }
    }
}

/// 缓存中的 JSON 无法解析时返回 Serialization 错误
fn decode<T: DeserializeOwned>(json: &str) -> Result<T, CacheError> {
    Ok(serde_json::from_str(json)?)
}
