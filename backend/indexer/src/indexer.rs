//! Long-running background task that polls the Soroban RPC and writes
//! decoded escrow ledger events to the database.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::Config;
use crate::db;
use crate::errors::Result;
use crate::rpc;

pub struct IndexerState {
    pub pool: SqlitePool,
    pub config: Config,
    pub client: Client,
}

/// Where the next poll starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub ledger: u32,
    pub cursor: Option<String>,
}

impl Position {
    /// Resume from the persisted cursor, or from `start_ledger` on a fresh
    /// database.
    pub async fn load(pool: &SqlitePool, start_ledger: u32) -> Result<Self> {
        let last_ledger = db::get_last_ledger(pool).await?;
        let cursor = db::get_cursor_string(pool).await?;
        let ledger = if last_ledger > 0 {
            last_ledger as u32
        } else {
            start_ledger
        };
        Ok(Position { ledger, cursor })
    }

    /// Advance past a fetched page. The ledger never moves backwards.
    pub fn advance(&self, latest_ledger: Option<u64>, cursor: Option<String>) -> Self {
        let ledger = latest_ledger
            .map(|l| u32::try_from(l).unwrap_or(u32::MAX).max(self.ledger))
            .unwrap_or(self.ledger);
        Position { ledger, cursor }
    }
}

/// Run the indexer loop until `shutdown` is cancelled.
pub async fn run(state: Arc<IndexerState>, shutdown: CancellationToken) {
    info!("Indexer starting, contract: {}", state.config.contract_id);

    let mut position = match Position::load(&state.pool, state.config.start_ledger).await {
        Ok(position) => position,
        Err(e) => {
            error!("Failed to load indexer cursor: {e}");
            Position {
                ledger: state.config.start_ledger,
                cursor: None,
            }
        }
    };

    info!("Resuming from ledger {}", position.ledger);

    loop {
        let polled = tokio::select! {
            _ = shutdown.cancelled() => break,
            polled = poll_once(&state.pool, &state.client, &state.config, &position) => polled,
        };
        match polled {
            Ok(next) => position = next,
            Err(e) => error!("Indexer poll error: {e}"),
        }

        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(Duration::from_secs(state.config.poll_interval_secs)) => {}
        }
    }

    info!("Indexer stopped at ledger {}", position.ledger);
}

/// Perform a single poll iteration and persist the new position.
async fn poll_once(
    pool: &SqlitePool,
    client: &Client,
    config: &Config,
    position: &Position,
) -> Result<Position> {
    let page = rpc::fetch_events(
        client,
        &config.rpc_url,
        &config.contract_id,
        position.ledger,
        position.cursor.as_deref(),
        config.events_per_page,
    )
    .await?;

    if !page.events.is_empty() {
        let decoded = rpc::decode_events(&page.events, &config.contract_id);
        let inserted = db::insert_events(pool, &decoded).await?;
        info!(
            "Polled {} raw events, {} new records stored",
            page.events.len(),
            inserted
        );
    }

    let next = position.advance(page.latest_ledger, page.cursor);
    db::save_cursor(pool, next.ledger as i64, next.cursor.as_deref()).await?;
    Ok(next)
}
