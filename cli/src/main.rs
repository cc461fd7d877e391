pub mod cli;

use anyhow::Context;
use clap::Parser;

use cli::{Cli, Command};
use session::db::{Db, schema};
use session::{SessionHandler, SqlSessionStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    common::logger::init_logger("sessionctl", cli.json_logs);

    let cfg = cli.store_config();
    tracing::debug!(table = %cfg.table_name, max_age_secs = cfg.max_age_secs, "config resolved");

    if cli.command == Command::Init {
        let db = Db::connect(&cfg.database_url)
            .await
            .with_context(|| format!("failed to connect to {}", cfg.database_url))?;
        schema::ensure_table(&db, &cfg.table_name)
            .await
            .context("failed to provision session table")?;
        tracing::info!(table = %cfg.table_name, "session table ready");
        return Ok(());
    }

    let store = SqlSessionStore::connect(&cfg)
        .await
        .with_context(|| format!("failed to open session store at {}", cfg.database_url))?;

    let ok = match cli.command {
        Command::Init => true,
        Command::Open => store.open("", "sessionctl").await,
        Command::Read { id } => {
            println!("{}", store.read(&id).await);
            true
        }
        Command::Write { id, data } => store.write(&id, &data).await,
        Command::Destroy { id } => store.destroy(&id).await,
        Command::Gc { max_lifetime } => {
            store
                .gc(max_lifetime.unwrap_or(store.max_age_secs()))
                .await
        }
    };

    store.close().await;

    if !ok {
        anyhow::bail!("operation failed; see logs");
    }
    Ok(())
}
