use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {name}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub db_user: String,
    pub db_password: String,
    pub db_host: String,
    pub db_port: u16,
    pub db_name: String,
    pub db_max_connections: u32,
    pub redis_addr: String,
    pub server_host: String,
    pub server_port: u16,
    pub rate_limit_window_secs: u64,
    pub rate_limit_requests: u32,
    pub cache_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 通过任意查找函数构建配置，测试时不必修改进程环境变量
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        Ok(Config {
            db_user: required("DB_USER")?,
            // 允许空密码（trust / peer 认证）
            db_password: lookup("DB_PASSWORD").unwrap_or_default(),
            db_host: required("DB_HOST")?,
            db_port: parse(&lookup, "DB_PORT", None)?,
            db_name: required("DB_NAME")?,
            db_max_connections: parse(&lookup, "DB_MAX_CONNECTIONS", Some(10))?,
            redis_addr: required("REDIS_ADDR")?,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            server_port: parse(&lookup, "SERVER_PORT", Some(8080))?,
            rate_limit_window_secs: parse(&lookup, "RATE_LIMIT_WINDOW", Some(60))?,
            rate_limit_requests: parse(&lookup, "RATE_LIMIT_REQUESTS", Some(20))?,
            cache_ttl_secs: parse(&lookup, "CACHE_TTL", Some(300))?,
        })
    }

    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode=disable",
            self.db_user, self.db_password, self.db_host, self.db_port, self.db_name
        )
    }

    /// REDIS_ADDR 允许 `host:port` 或完整的 `redis://` 地址
    pub fn redis_url(&self) -> String {
        if self.redis_addr.contains("://") {
            self.redis_addr.clone()
        } else {
            format!("redis://{}", self.redis_addr)
        }
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

fn parse<F, T>(lookup: &F, name: &'static str, default: Option<T>) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => default.ok_or(ConfigError::Missing(name)),
    }
}
