use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient, Script, aio::MultiplexedConnection};

use super::{CacheError, CacheStore, WindowCount};

/// INCR 后仅在首次计数时设置过期时间，在服务端一次完成，避免计数键永不过期；
/// 同时返回剩余毫秒数
const INCR_WINDOW_SCRIPT: &str = r#"
local count = redis.call('INCR', KEYS[1])
if count == 1 then
    redis.call('EXPIRE', KEYS[1], ARGV[1])
end
return {count, redis.call('PTTL', KEYS[1])}
"#;

/// Redis 缓存实现，所有请求共用一个多路复用连接
#[derive(Clone)]
pub struct RedisCache {
    conn: MultiplexedConnection,
    incr_window: Script,
}

impl RedisCache {
    /// 建立连接并 PING 一次，连接失败直接返回错误
    pub async fn connect(redis_url: &str) -> Result<Self, CacheError> {
        let client = RedisClient::open(redis_url)?;
        let mut conn = client.get_multiplexed_async_connection().await?;

        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        tracing::info!("Connected to redis");

        Ok(Self {
            conn,
            incr_window: Script::new(INCR_WINDOW_SCRIPT),
        })
    }
}

/// Redis 过期时间以秒为单位，最少 1 秒
fn whole_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

/// PTTL 为负表示键没有过期时间或已不存在，按整个窗口计
fn remaining(pttl_ms: i64, window: Duration) -> Duration {
    u64::try_from(pttl_ms).map_or(window, Duration::from_millis)
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(key, value, whole_secs(ttl)).await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(key).await?;
        Ok(())
    }

    async fn incr_window(&self, key: &str, window: Duration) -> Result<WindowCount, CacheError> {
        let mut conn = self.conn.clone();
        let (count, pttl): (i64, i64) = self
            .incr_window
            .key(key)
            .arg(whole_secs(window))
            .invoke_async(&mut conn)
            .await?;
        Ok(WindowCount {
            count,
            resets_in: remaining(pttl, window),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_second_ttl_rounds_up_to_one() {
        assert_eq!(whole_secs(Duration::from_millis(200)), 1);
        assert_eq!(whole_secs(Duration::from_secs(300)), 300);
    }

    #[test]
    fn remaining_uses_pttl_or_falls_back_to_window() {
        let window = Duration::from_secs(60);
        assert_eq!(remaining(14_500, window), Duration::from_millis(14_500));
        assert_eq!(remaining(-1, window), window);
        assert_eq!(remaining(-2, window), window);
    }
}
