use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::database::models::planet::Planet;
use crate::database::repositories::planet::PlanetStore;

#[derive(Default)]
struct Table {
    rows: BTreeMap<i32, String>,
    last_id: i32,
}

/// 进程内存储，id 单调递增且不复用；记录读查询次数，并可模拟数据库不可用
#[derive(Default)]
pub struct MemoryPlanetStore {
    table: Mutex<Table>,
    reads: AtomicUsize,
    unavailable: AtomicBool,
}

impl MemoryPlanetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// list 和 find_by_id 被调用的总次数
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), sqlx::Error> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(sqlx::Error::PoolTimedOut);
        }
        Ok(())
    }
}

#[async_trait]
impl PlanetStore for MemoryPlanetStore {
    async fn list(&self) -> Result<Vec<Planet>, sqlx::Error> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check()?;

        let table = self.table.lock().await;
        Ok(table
            .rows
            .iter()
            .map(|(id, name)| Planet {
                id: *id,
                name: name.clone(),
            })
            .collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Planet>, sqlx::Error> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check()?;

        let table = self.table.lock().await;
        Ok(table.rows.get(&id).map(|name| Planet {
            id,
            name: name.clone(),
        }))
    }

    async fn insert(&self, name: &str) -> Result<i32, sqlx::Error> {
        self.check()?;

        let mut table = self.table.lock().await;
        table.last_id += 1;
        let id = table.last_id;
        table.rows.insert(id, name.to_string());
        Ok(id)
    }

    async fn update(&self, id: i32, name: &str) -> Result<u64, sqlx::Error> {
        self.check()?;

        let mut table = self.table.lock().await;
        match table.rows.get_mut(&id) {
            Some(existing) => {
                *existing = name.to_string();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: i32) -> Result<u64, sqlx::Error> {
        self.check()?;

        let mut table = self.table.lock().await;
        Ok(table.rows.remove(&id).map_or(0, |_| 1))
    }
}
