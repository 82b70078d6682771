//! One-off utility: mirror identity-service accounts into profile records.
//!
//! Safe to re-run; accounts that already have a profile are skipped.
//! Exits 0 on success, 1 on fatal error.

use ps_auth_simple::SimpleIdentityProvider;
use ps_core::import;
use ps_db_sqlite::SqliteEventRepo;
use std::env;

async fn run() -> anyhow::Result<()> {
    let export_path = env::args()
        .nth(1)
        .or_else(|| env::var("ACCOUNTS_EXPORT").ok())
        .ok_or_else(|| anyhow::anyhow!("usage: migrate-users <accounts-export.json>"))?;
    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:photoshare.db".to_string());

    let repo = SqliteEventRepo::new(&database_url).await?;
    // Only the account export is needed here; no admin hash.
    let identity = SimpleIdentityProvider::new("").with_accounts_file(export_path.into());

    let summary = import::run_import(&identity, &repo).await?;
    log::info!(
        "import finished: {} created, {} skipped, {} failed ({} total)",
        summary.created,
        summary.skipped,
        summary.failed,
        summary.total()
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Err(e) = run().await {
        log::error!("user import failed: {e}");
        std::process::exit(1);
    }
}
