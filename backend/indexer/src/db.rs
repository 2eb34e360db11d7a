//! Database layer: migrations, queries, and cursor management.

use sqlx::{sqlite::SqlitePoolOptions, QueryBuilder, Sqlite, SqlitePool};
use tracing::info;

use crate::errors::Result;
use crate::events::{EventKind, EventRecord, LedgerEvent};

const EVENT_COLUMNS: &str = "id, event_type, subject, actor, amount, entry_key, ledger, \
                             timestamp, contract_id, tx_hash, created_at";

/// Establish a SQLite connection pool and run pending migrations.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };

    // Every connection to `:memory:` opens its own database.
    let max_connections = if url.contains(":memory:") { 1 } else { 5 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(&url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied successfully");
    Ok(pool)
}

// ─────────────────────────────────────────────────────────
// Cursor helpers
// ─────────────────────────────────────────────────────────

/// Read the last-seen ledger from the cursor row.
/// Returns `0` when no cursor has been persisted yet.
pub async fn get_last_ledger(pool: &SqlitePool) -> Result<i64> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT last_ledger FROM indexer_cursor WHERE id = 1")
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|(v,)| v).unwrap_or(0))
}

/// Persist the last-seen ledger (and optionally a pagination cursor string).
pub async fn save_cursor(
    pool: &SqlitePool,
    last_ledger: i64,
    last_cursor: Option<&str>,
) -> Result<()> {
    sqlx::query("UPDATE indexer_cursor SET last_ledger = ?1, last_cursor = ?2 WHERE id = 1")
        .bind(last_ledger)
        .bind(last_cursor)
        .execute(pool)
        .await?;
    Ok(())
}

/// Read back the raw cursor string (used to resume pagination mid-ledger).
pub async fn get_cursor_string(pool: &SqlitePool) -> Result<Option<String>> {
    let row: Option<(Option<String>,)> =
        sqlx::query_as("SELECT last_cursor FROM indexer_cursor WHERE id = 1")
            .fetch_optional(pool)
            .await?;
    Ok(row.and_then(|(v,)| v))
}

// ─────────────────────────────────────────────────────────
// Event writes
// ─────────────────────────────────────────────────────────

/// Persist a batch of decoded events in one transaction. Events that share
/// the same `(ledger, tx_hash, event_type, subject)` tuple are ignored, so
/// re-polling a ledger range is harmless.
pub async fn insert_events(pool: &SqlitePool, events: &[LedgerEvent]) -> Result<usize> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;
    for ev in events {
        let rows_affected = sqlx::query(
            r#"
            INSERT OR IGNORE INTO events
                (event_type, subject, actor, amount, entry_key, ledger, timestamp,
                 contract_id, tx_hash)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&ev.event_type)
        .bind(&ev.subject)
        .bind(&ev.actor)
        .bind(&ev.amount)
        .bind(&ev.entry_key)
        .bind(ev.ledger)
        .bind(ev.timestamp)
        .bind(&ev.contract_id)
        .bind(&ev.tx_hash)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        count += rows_affected as usize;
    }
    tx.commit().await?;
    Ok(count)
}

// ─────────────────────────────────────────────────────────
// Event reads
// ─────────────────────────────────────────────────────────

/// Fetch a page of events, optionally restricted to one `event_type`,
/// ordered by ledger ascending.
pub async fn get_events(
    pool: &SqlitePool,
    event_type: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<EventRecord>> {
    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {EVENT_COLUMNS} FROM events"));
    if let Some(kind) = event_type {
        query.push(" WHERE event_type = ").push_bind(kind);
    }
    query
        .push(" ORDER BY ledger ASC, id ASC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);

    let rows = query
        .build_query_as::<EventRecord>()
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Every event touching a registry key: the entry's own lifecycle events
/// plus the record events that name it.
pub async fn get_events_for_entry(pool: &SqlitePool, key: &str) -> Result<Vec<EventRecord>> {
    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {EVENT_COLUMNS} FROM events WHERE entry_key = "));
    query.push_bind(key);
    query.push(" OR (subject = ").push_bind(key);
    push_type_filter(&mut query, &EventKind::ENTRY_TYPES);
    query.push(") ORDER BY ledger ASC, id ASC");

    let rows = query
        .build_query_as::<EventRecord>()
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Lifecycle of one ledger record, oldest first.
pub async fn get_events_for_record(pool: &SqlitePool, record_id: u64) -> Result<Vec<EventRecord>> {
    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {EVENT_COLUMNS} FROM events WHERE subject = "));
    query.push_bind(record_id.to_string());
    push_type_filter(&mut query, &EventKind::RECORD_TYPES);
    query.push(" ORDER BY ledger ASC, id ASC");

    let rows = query
        .build_query_as::<EventRecord>()
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Events where `address` acted or is the subject (role changes, payouts).
pub async fn get_events_for_account(pool: &SqlitePool, address: &str) -> Result<Vec<EventRecord>> {
    let rows = sqlx::query_as::<_, EventRecord>(&format!(
        "SELECT {EVENT_COLUMNS} FROM events \
         WHERE actor = ?1 OR subject = ?1 \
         ORDER BY ledger ASC, id ASC"
    ))
    .bind(address)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

fn push_type_filter(query: &mut QueryBuilder<Sqlite>, types: &[&str]) {
    query.push(" AND event_type IN (");
    let mut separated = query.separated(", ");
    for kind in types {
        separated.push_bind(kind.to_string());
    }
    separated.push_unseparated(")");
}
