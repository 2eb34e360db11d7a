//! Soroban RPC client: polls `getEvents` and decodes escrow ledger events.
//!
//! ## Resilience
//!
//! * Exponential back-off is applied when the RPC returns a transport error,
//!   an HTTP 429 or a soft JSON-RPC error, doubling from
//!   [`INITIAL_BACKOFF_SECS`] up to [`MAX_BACKOFF_SECS`] seconds.
//! * Only malformed-request errors (`-32600`, `-32601`) are surfaced.
//!
//! ## Decoding
//!
//! Requests ask for `xdrFormat: "json"`, so topics and data arrive as
//! `topicJson` / `valueJson` in Stellar's JSON rendering of `ScVal`
//! (`{"symbol":"rec_new"}`, `{"u64":"42"}`, `{"map":[{"key":..,"val":..}]}`).
//! [`scval_to_json`] flattens those into plain JSON before fields are read.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::errors::{IndexerError, Result};
use crate::events::{EventKind, LedgerEvent};

pub const MAX_BACKOFF_SECS: u64 = 60;
pub const INITIAL_BACKOFF_SECS: u64 = 2;

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<EventsResult>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct EventsResult {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    #[serde(rename = "latestLedger")]
    pub latest_ledger: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawEvent {
    /// Topics as JSON `ScVal`s.
    #[serde(rename = "topicJson", default)]
    pub topic_json: Vec<Value>,
    /// Event data as a JSON `ScVal`.
    #[serde(rename = "valueJson", default)]
    pub value_json: Value,
    #[serde(rename = "contractId")]
    pub contract_id: Option<String>,
    #[serde(rename = "txHash")]
    pub tx_hash: Option<String>,
    pub ledger: Option<u64>,
    #[serde(rename = "ledgerClosedAt")]
    pub ledger_closed_at: Option<String>,
    #[serde(rename = "inSuccessfulContractCall")]
    pub in_successful_contract_call: Option<bool>,
}

/// One page of `getEvents` output.
#[derive(Debug)]
pub struct EventPage {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    pub latest_ledger: Option<u64>,
}

// ─────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────

/// Fetch a page of events from the RPC.
///
/// * `start_ledger`: the ledger sequence to scan from (inclusive).
/// * `cursor`: optional opaque pagination cursor from a previous response.
/// * `limit`: maximum number of events to return.
pub async fn fetch_events(
    client: &Client,
    rpc_url: &str,
    contract_id: &str,
    start_ledger: u32,
    cursor: Option<&str>,
    limit: u32,
) -> Result<EventPage> {
    let mut backoff = INITIAL_BACKOFF_SECS;
    let request = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "getEvents",
        "params": build_params(contract_id, start_ledger, cursor, limit),
    });

    loop {
        let response = match client.post(rpc_url).json(&request).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("RPC request failed (will retry in {backoff}s): {e}");
                backoff = sleep_and_grow(backoff).await;
                continue;
            }
        };

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Rate-limited by RPC (will retry in {backoff}s)");
            backoff = sleep_and_grow(backoff).await;
            continue;
        }

        let body: RpcResponse = response.json().await?;

        if let Some(err) = body.error {
            if is_hard_error(err.code) {
                return Err(IndexerError::Rpc {
                    code: err.code,
                    message: err.message,
                });
            }
            warn!(
                "RPC soft error (will retry in {backoff}s): {} {}",
                err.code, err.message
            );
            backoff = sleep_and_grow(backoff).await;
            continue;
        }

        let result = body.result.ok_or_else(|| {
            IndexerError::EventParse("Empty result from getEvents".to_string())
        })?;

        debug!(
            "Fetched {} events (latest_ledger={:?})",
            result.events.len(),
            result.latest_ledger
        );

        return Ok(EventPage {
            events: result.events,
            cursor: result.cursor,
            latest_ledger: result.latest_ledger,
        });
    }
}

/// Next back-off delay after `current`, capped at [`MAX_BACKOFF_SECS`].
pub fn next_backoff(current: u64) -> u64 {
    current.saturating_mul(2).min(MAX_BACKOFF_SECS)
}

async fn sleep_and_grow(backoff: u64) -> u64 {
    tokio::time::sleep(Duration::from_secs(backoff)).await;
    next_backoff(backoff)
}

fn is_hard_error(code: i64) -> bool {
    code == -32600 || code == -32601
}

fn build_params(contract_id: &str, start_ledger: u32, cursor: Option<&str>, limit: u32) -> Value {
    let mut params = json!({
        "xdrFormat": "json",
        "filters": [
            {
                "type": "contract",
                "contractIds": [contract_id]
            }
        ],
        "pagination": {
            "limit": limit
        }
    });

    if let Some(cur) = cursor {
        params["pagination"]["cursor"] = json!(cur);
    } else {
        params["startLedger"] = json!(start_ledger);
    }

    params
}

// ─────────────────────────────────────────────────────────
// Event decoding
// ─────────────────────────────────────────────────────────

/// Decode a list of raw RPC events into [`LedgerEvent`] rows.
///
/// Events from failed contract calls are dropped.
pub fn decode_events(raw: &[RawEvent], contract_id: &str) -> Vec<LedgerEvent> {
    raw.iter()
        .filter(|e| e.in_successful_contract_call != Some(false))
        .filter_map(|e| decode_single(e, contract_id))
        .collect()
}

fn decode_single(raw: &RawEvent, contract_id: &str) -> Option<LedgerEvent> {
    let topics: Vec<Value> = raw.topic_json.iter().map(scval_to_json).collect();
    let Some(name) = topics.first().and_then(scalar_to_string) else {
        debug!("Skipping event without JSON topics (tx {:?})", raw.tx_hash);
        return None;
    };
    let kind = EventKind::from_topic(&name);

    let ledger = raw.ledger.unwrap_or(0) as i64;
    let timestamp = raw
        .ledger_closed_at
        .as_deref()
        .and_then(parse_iso_to_unix)
        .unwrap_or(0);

    let subject = topics.get(1).and_then(scalar_to_string);
    let decoded = decode_data(&scval_to_json(&raw.value_json), kind);

    let entry_key = if kind.is_entry_event() {
        subject.clone()
    } else if kind.is_record_event() {
        decoded.entry_key
    } else {
        None
    };
    // Pause events carry the admin only as a topic.
    let actor = match kind {
        EventKind::ProtocolPaused | EventKind::ProtocolUnpaused => {
            decoded.actor.or_else(|| subject.clone())
        }
        _ => decoded.actor,
    };

    Some(LedgerEvent {
        event_type: kind.as_str().to_string(),
        subject,
        actor,
        amount: decoded.amount,
        entry_key,
        ledger,
        timestamp,
        contract_id: raw
            .contract_id
            .clone()
            .unwrap_or_else(|| contract_id.to_string()),
        tx_hash: raw.tx_hash.clone(),
    })
}

#[derive(Debug, Default)]
struct DecodedData {
    actor: Option<String>,
    amount: Option<String>,
    entry_key: Option<String>,
}

/// Read the fields of a flattened event payload.
fn decode_data(value: &Value, kind: EventKind) -> DecodedData {
    match kind {
        EventKind::EntryCreated => DecodedData {
            actor: extract_field(value, &["payee"]),
            amount: extract_field(value, &["unit_price"]),
            entry_key: None,
        },
        EventKind::EntryApproved => DecodedData {
            actor: extract_field(value, &["approver"]),
            ..Default::default()
        },
        EventKind::EntryUpdated => DecodedData {
            amount: extract_field(value, &["unit_price"]),
            ..Default::default()
        },
        EventKind::EntryRemoved | EventKind::ProofAttached => DecodedData {
            actor: extract_field(value, &["by"]),
            ..Default::default()
        },
        EventKind::RecordCreated => DecodedData {
            actor: extract_field(value, &["depositor"]),
            amount: extract_field(value, &["amount"]),
            entry_key: extract_field(value, &["registry_key"]),
        },
        EventKind::RecordReleased => DecodedData {
            actor: extract_field(value, &["payee"]),
            amount: extract_field(value, &["amount"]),
            entry_key: None,
        },
        EventKind::RecordRefunded => DecodedData {
            actor: extract_field(value, &["depositor"]),
            amount: extract_field(value, &["amount"]),
            entry_key: None,
        },
        EventKind::PayoutWithdrawn => DecodedData {
            actor: extract_field(value, &["destination"]),
            amount: extract_field(value, &["amount"]),
            entry_key: None,
        },
        EventKind::TokenRecovered => DecodedData {
            actor: extract_field(value, &["by"]),
            amount: extract_field(value, &["amount"]),
            entry_key: None,
        },
        EventKind::RewardIssued => DecodedData {
            actor: extract_field(value, &["recipient"]),
            amount: extract_field(value, &["reward"]),
            entry_key: None,
        },
        EventKind::RoleSet | EventKind::RoleDel => DecodedData {
            // The data is the caller address.
            actor: value
                .as_str()
                .map(String::from)
                .or_else(|| extract_field(value, &["by", "address"])),
            ..Default::default()
        },
        EventKind::ProtocolPaused | EventKind::ProtocolUnpaused | EventKind::Unknown => {
            DecodedData::default()
        }
    }
}

fn extract_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| value.get(key).and_then(scalar_to_string))
}

fn scalar_to_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Flatten a JSON `ScVal` into plain JSON.
///
/// Strings, symbols and addresses become strings; 64- and 128-bit integers
/// become decimal strings; maps become objects keyed by their flattened key.
/// `"void"` (a `None` option) and unsupported variants become `null`.
fn scval_to_json(v: &Value) -> Value {
    let Some((tag, inner)) = v.as_object().and_then(|m| m.iter().next()) else {
        return Value::Null;
    };
    match tag.as_str() {
        "symbol" | "string" | "address" | "bytes" | "bool" | "u32" | "i32" => inner.clone(),
        "u64" | "i64" | "timepoint" | "duration" | "u256" | "i256" => decimal_string(inner),
        "u128" | "i128" => match inner.as_object() {
            Some(parts) => join_parts(tag, parts).map_or(Value::Null, Value::String),
            None => decimal_string(inner),
        },
        "vec" => {
            let items = inner.as_array().map(Vec::as_slice).unwrap_or_default();
            // A unit enum variant is a vec holding just its name.
            if let [only] = items {
                if let Some(name) = only.get("symbol") {
                    return name.clone();
                }
            }
            Value::Array(items.iter().map(scval_to_json).collect())
        }
        "map" => {
            let entries = inner.as_array().map(Vec::as_slice).unwrap_or_default();
            let object: Map<String, Value> = entries
                .iter()
                .filter_map(|entry| {
                    let key = scalar_to_string(&scval_to_json(entry.get("key")?))?;
                    Some((key, scval_to_json(entry.get("val")?)))
                })
                .collect();
            Value::Object(object)
        }
        _ => Value::Null,
    }
}

fn decimal_string(v: &Value) -> Value {
    match v {
        Value::String(s) => Value::String(s.clone()),
        Value::Number(n) => Value::String(n.to_string()),
        _ => Value::Null,
    }
}

/// Rebuild a 128-bit integer sent as `{"hi":..,"lo":..}`.
fn join_parts(tag: &str, parts: &Map<String, Value>) -> Option<String> {
    let hi = parts.get("hi")?;
    let lo = parse_int::<u64>(parts.get("lo")?)?;
    if tag == "i128" {
        let hi = parse_int::<i64>(hi)?;
        Some(((i128::from(hi) << 64) | i128::from(lo)).to_string())
    } else {
        let hi = parse_int::<u64>(hi)?;
        Some(((u128::from(hi) << 64) | u128::from(lo)).to_string())
    }
}

fn parse_int<T: std::str::FromStr>(v: &Value) -> Option<T> {
    match v {
        Value::Number(n) => n.to_string().parse().ok(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Parse an ISO-8601 timestamp string into a Unix epoch (seconds).
fn parse_iso_to_unix(s: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
