use careernet::application_impl::RealConnectionService;
use careernet::application_port::ConnectionService;
use careernet::infra_memory::NoConnectionCache;
use careernet::logger::*;
use careernet::server::StoreBackend;
use careernet::settings::{Parser, parse_settings};
use chrono::{Duration, Utc};
use std::sync::Arc;

/// Delete rejected connection requests that were resolved long ago.
#[derive(Parser, Debug)]
struct Args {
    #[arg(long)]
    settings: Option<String>,
    /// Keep rejections resolved within this many days.
    #[arg(long, default_value_t = 90)]
    older_than_days: i64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let logger = Logger::new_bootstrap();

    let settings = parse_settings(args.settings.as_deref())?;
    logger.reload_from_config(&LogConfig::from(&settings.log))?;

    let store = StoreBackend::try_new(&settings.store).await?;
    let pool = store.pool.clone();
    let service = RealConnectionService::new(
        store.user_repo,
        store.connection_repo,
        Arc::new(NoConnectionCache),
    );

    let cutoff = Utc::now() - Duration::days(args.older_than_days);
    let purged = service.purge_rejected(cutoff).await?;
    println!("purged {purged} rejected request(s) resolved before {cutoff}");

    if let Some(pool) = pool {
        pool.close().await;
    }
    Ok(())
}
