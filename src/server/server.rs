use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_model::UserId;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::settings;
use crate::settings::Settings;
use anyhow::anyhow;
use sqlx::{MySql, Pool};
use std::sync::Arc;
use std::time::Duration;

pub struct Server {
    pub identity_service: Arc<dyn IdentityService>,
    pub connection_service: Arc<dyn ConnectionService>,
    pool: Option<Pool<MySql>>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let identity_service = build_identity_service(&settings.identity)?;
        let store = StoreBackend::try_new(&settings.store).await?;
        let connection_cache = build_connection_cache(&settings.cache).await?;

        let connection_service: Arc<dyn ConnectionService> = Arc::new(RealConnectionService::new(
            store.user_repo,
            store.connection_repo,
            connection_cache,
        ));

        info!(
            identity = %settings.identity.backend,
            store = %settings.store.backend,
            cache = %settings.cache.backend,
            "server started"
        );

        Ok(Self {
            identity_service,
            connection_service,
            pool: store.pool,
        })
    }

    /// Server without a database pool, for in-process use.
    pub fn from_parts(
        identity_service: Arc<dyn IdentityService>,
        connection_service: Arc<dyn ConnectionService>,
    ) -> Self {
        Self {
            identity_service,
            connection_service,
            pool: None,
        }
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}

pub struct StoreBackend {
    pub user_repo: Arc<dyn UserRepo>,
    pub connection_repo: Arc<dyn ConnectionRepo>,
    pub pool: Option<Pool<MySql>>,
}

impl StoreBackend {
    pub async fn try_new(settings: &settings::Store) -> anyhow::Result<Self> {
        let backend = match settings.backend.as_str() {
            "memory" => StoreBackend {
                user_repo: Arc::new(MemoryUserRepo::new()),
                connection_repo: Arc::new(MemoryConnectionRepo::new()),
                pool: None,
            },
            "mysql" => {
                let dsn = settings
                    .mysql_dsn
                    .as_deref()
                    .ok_or_else(|| anyhow!("store.mysql_dsn is required for the mysql backend"))?;
                let pool = Pool::<MySql>::connect(dsn).await?;
                if settings.apply_schema {
                    apply_schema(&pool).await?;
                    info!("schema applied");
                }
                StoreBackend {
                    user_repo: Arc::new(MySqlUserRepo::new(pool.clone())),
                    connection_repo: Arc::new(MySqlConnectionRepo::new(pool.clone())),
                    pool: Some(pool),
                }
            }
            other => return Err(anyhow!("Unknown store backend: {}", other)),
        };

        for username in &settings.seed_users {
            backend
                .user_repo
                .upsert(UserId::from_username(username), username)
                .await?;
        }
        if !settings.seed_users.is_empty() {
            debug!(count = settings.seed_users.len(), "seeded users");
        }

        Ok(backend)
    }
}

pub fn jwt_config(settings: &settings::Identity) -> anyhow::Result<JwtConfig> {
    let key = std::env::var(&settings.signing_key_env)
        .map_err(|_| anyhow!("{} is not set", settings.signing_key_env))?;

    Ok(JwtConfig {
        issuer: settings.issuer.clone(),
        audience: settings.audience.clone(),
        access_ttl: chrono::Duration::seconds(settings.access_ttl_secs as i64),
        signing_key: key.into_bytes(),
    })
}

fn build_identity_service(
    settings: &settings::Identity,
) -> anyhow::Result<Arc<dyn IdentityService>> {
    match settings.backend.as_str() {
        "fake" => {
            warn!("fake identity backend: bearer tokens are not verified");
            Ok(Arc::new(FakeIdentityService::new()))
        }
        "jwt" => Ok(Arc::new(JwtIdentityService::new(jwt_config(settings)?))),
        other => Err(anyhow!("Unknown identity backend: {}", other)),
    }
}

async fn build_connection_cache(
    settings: &settings::Cache,
) -> anyhow::Result<Arc<dyn ConnectionCache>> {
    if settings.backend != "none" && settings.ttl_secs == 0 {
        return Err(anyhow!(
            "cache.ttl_secs must be positive for the {} backend; use backend \"none\" to disable caching",
            settings.backend
        ));
    }

    match settings.backend.as_str() {
        "none" => Ok(Arc::new(NoConnectionCache)),
        "memory" => Ok(Arc::new(MemoryConnectionCache::new(Duration::from_secs(
            settings.ttl_secs,
        )))),
        "redis" => {
            let dsn = settings
                .redis_dsn
                .as_deref()
                .ok_or_else(|| anyhow!("cache.redis_dsn is required for the redis backend"))?;
            let redis_client = redis::Client::open(dsn)?;
            let redis_manager = redis_client.get_connection_manager().await?;
            Ok(Arc::new(RedisConnectionCache::new(
                redis_manager,
                settings.prefix.clone(),
                settings.ttl_secs,
            )))
        }
        other => Err(anyhow!("Unknown cache backend: {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_settings(backend: &str, ttl_secs: u64) -> settings::Cache {
        settings::Cache {
            backend: backend.to_string(),
            redis_dsn: None,
            prefix: "careernet".to_string(),
            ttl_secs,
        }
    }

    #[tokio::test]
    async fn zero_ttl_is_rejected_unless_caching_is_off() {
        assert!(build_connection_cache(&cache_settings("memory", 0)).await.is_err());
        assert!(build_connection_cache(&cache_settings("redis", 0)).await.is_err());
        assert!(build_connection_cache(&cache_settings("none", 0)).await.is_ok());
        assert!(build_connection_cache(&cache_settings("memory", 60)).await.is_ok());
    }

    #[tokio::test]
    async fn unknown_cache_backend_is_rejected() {
        assert!(build_connection_cache(&cache_settings("memcached", 60)).await.is_err());
    }
}
