//! Google Sheets `LedgerStore` adapter (spec SPEC_FULL §10.6). Exchanges a
//! service-account key for a short-lived bearer token via the standard
//! JWT-assertion grant, then drives the Sheets API v4 REST surface
//! directly over `reqwest` — there is no official Rust Sheets client, so
//! this follows the same "typed request/response over a generic HTTP
//! client" shape as `HttpUpstreamClient`.

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use warwatch_core::error::PersistenceError;
use warwatch_core::store::Row;
use warwatch_core::{Cell, LedgerStore, RetryPolicy};

const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

#[derive(Debug, Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    token_uri: Option<String>,
}

#[derive(Debug, Serialize)]
struct Claims {
    iss: String,
    scope: String,
    aud: String,
    iat: u64,
    exp: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    access_token: String,
    expires_at_epoch: u64,
}

pub struct GoogleSheetsLedgerStore {
    http: Client,
    key: ServiceAccountKey,
    spreadsheet_id: String,
    retry: RetryPolicy,
    token: Mutex<Option<CachedToken>>,
}

impl GoogleSheetsLedgerStore {
    pub fn load(credentials_path: &Path, spreadsheet_id: String) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(credentials_path)?;
        let key: ServiceAccountKey = serde_json::from_str(&contents)?;
        Ok(Self {
            http: Client::new(),
            key,
            spreadsheet_id,
            retry: RetryPolicy::persistence_default(),
            token: Mutex::new(None),
        })
    }

    fn now_epoch() -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).expect("system clock before epoch").as_secs()
    }

    async fn access_token(&self) -> Result<String, PersistenceError> {
        {
            let cached = self.token.lock().expect("token mutex poisoned");
            if let Some(token) = cached.as_ref() {
                if token.expires_at_epoch > Self::now_epoch() + 30 {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let now = Self::now_epoch();
        let claims = Claims {
            iss: self.key.client_email.clone(),
            scope: SHEETS_SCOPE.to_string(),
            aud: self.key.token_uri.clone().unwrap_or_else(|| TOKEN_URL.to_string()),
            iat: now,
            exp: now + 3600,
        };
        let header = Header::new(Algorithm::RS256);
        let encoding_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| PersistenceError::Other(anyhow::anyhow!(e)))?;
        let assertion = jsonwebtoken::encode(&header, &claims, &encoding_key)
            .map_err(|e| PersistenceError::Other(anyhow::anyhow!(e)))?;

        let response: TokenResponse = self
            .http
            .post(claims.aud.clone())
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PersistenceError::Transient(e.to_string()))?
            .json()
            .await
            .map_err(|e| PersistenceError::Other(anyhow::anyhow!(e)))?;

        let mut cached = self.token.lock().expect("token mutex poisoned");
        *cached = Some(CachedToken {
            access_token: response.access_token.clone(),
            expires_at_epoch: now + response.expires_in,
        });
        Ok(response.access_token)
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "https://sheets.googleapis.com/v4/spreadsheets/{}/values/{}",
            self.spreadsheet_id,
            urlencoding::encode(range)
        )
    }

    async fn authorized(&self, req: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, PersistenceError> {
        let token = self.access_token().await?;
        Ok(req.bearer_auth(token))
    }
}

fn cell_to_json(cell: &Cell) -> serde_json::Value {
    match cell {
        Cell::Str(s) => json!(s),
        Cell::Int(i) => json!(i),
        Cell::Float(f) => json!(f),
        Cell::Bool(b) => json!(b),
        Cell::Empty => json!(""),
    }
}

fn json_to_cell(value: &serde_json::Value) -> Cell {
    match value {
        serde_json::Value::String(s) if s.is_empty() => Cell::Empty,
        serde_json::Value::String(s) => Cell::Str(s.clone()),
        serde_json::Value::Number(n) if n.is_i64() => Cell::Int(n.as_i64().unwrap()),
        serde_json::Value::Number(n) => Cell::Float(n.as_f64().unwrap_or_default()),
        serde_json::Value::Bool(b) => Cell::Bool(*b),
        _ => Cell::Empty,
    }
}

fn a1_range(tab: &str, start_row: usize, end_row: Option<usize>) -> String {
    match end_row {
        Some(end) => format!("'{tab}'!A{start_row}:AF{end}"),
        None => format!("'{tab}'!A{start_row}:AF"),
    }
}

#[async_trait]
impl LedgerStore for GoogleSheetsLedgerStore {
    async fn ensure_tab(&self, name: &str) -> Result<(), PersistenceError> {
        if self.tab_exists(name).await? {
            return Ok(());
        }
        let url = format!(
            "https://sheets.googleapis.com/v4/spreadsheets/{}:batchUpdate",
            self.spreadsheet_id
        );
        let body = json!({
            "requests": [{ "addSheet": { "properties": { "title": name } } }]
        });
        self.retry
            .execute(|| async {
                let req = self.authorized(self.http.post(&url).json(&body)).await?;
                req.send().await.map_err(|e| PersistenceError::Transient(e.to_string()))?;
                Ok(())
            })
            .await
    }

    async fn tab_exists(&self, name: &str) -> Result<bool, PersistenceError> {
        let url = format!("https://sheets.googleapis.com/v4/spreadsheets/{}", self.spreadsheet_id);
        let req = self.authorized(self.http.get(&url)).await?;
        let response: serde_json::Value = req
            .send()
            .await
            .map_err(|e| PersistenceError::Transient(e.to_string()))?
            .json()
            .await
            .map_err(|e| PersistenceError::Other(anyhow::anyhow!(e)))?;
        let exists = response["sheets"]
            .as_array()
            .map(|sheets| {
                sheets
                    .iter()
                    .any(|s| s["properties"]["title"].as_str() == Some(name))
            })
            .unwrap_or(false);
        Ok(exists)
    }

    async fn read_range(&self, tab: &str, start_row: usize, end_row: usize) -> Result<Vec<Row>, PersistenceError> {
        let end = if end_row == usize::MAX { None } else { Some(end_row) };
        let url = self.values_url(&a1_range(tab, start_row, end));
        let req = self.authorized(self.http.get(&url)).await?;
        let response: serde_json::Value = req
            .send()
            .await
            .map_err(|e| PersistenceError::Transient(e.to_string()))?
            .json()
            .await
            .map_err(|e| PersistenceError::Other(anyhow::anyhow!(e)))?;
        let rows = response["values"]
            .as_array()
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|row| {
                row.as_array()
                    .map(|cells| cells.iter().map(json_to_cell).collect())
                    .unwrap_or_default()
            })
            .collect();
        Ok(rows)
    }

    async fn overwrite_range(&self, tab: &str, start_row: usize, rows: Vec<Row>) -> Result<(), PersistenceError> {
        let end_row = start_row + rows.len().saturating_sub(1);
        let url = format!("{}?valueInputOption=RAW", self.values_url(&a1_range(tab, start_row, Some(end_row))));
        let body = json!({
            "values": rows.iter().map(|row| row.iter().map(cell_to_json).collect::<Vec<_>>()).collect::<Vec<_>>(),
        });
        self.retry
            .execute(|| async {
                let req = self.authorized(self.http.put(&url).json(&body)).await?;
                req.send().await.map_err(|e| PersistenceError::Transient(e.to_string()))?;
                Ok(())
            })
            .await
    }

    async fn append_rows(&self, tab: &str, rows: Vec<Row>) -> Result<(), PersistenceError> {
        let url = format!(
            "{}:append?valueInputOption=RAW&insertDataOption=INSERT_ROWS",
            self.values_url(&format!("'{tab}'!A1"))
        );
        let body = json!({
            "values": rows.iter().map(|row| row.iter().map(cell_to_json).collect::<Vec<_>>()).collect::<Vec<_>>(),
        });
        self.retry
            .execute(|| async {
                let req = self.authorized(self.http.post(&url).json(&body)).await?;
                req.send().await.map_err(|e| PersistenceError::Transient(e.to_string()))?;
                Ok(())
            })
            .await
    }

    async fn clear_range(&self, tab: &str, start_row: usize, end_row: usize) -> Result<(), PersistenceError> {
        let end = if end_row == usize::MAX { None } else { Some(end_row) };
        let url = format!("{}:clear", self.values_url(&a1_range(tab, start_row, end)));
        self.retry
            .execute(|| async {
                let req = self.authorized(self.http.post(&url)).await?;
                req.send().await.map_err(|e| PersistenceError::Transient(e.to_string()))?;
                Ok(())
            })
            .await
    }

    async fn ensure_capacity(&self, _tab: &str, _rows: usize, _cols: usize) -> Result<(), PersistenceError> {
        // The Sheets API grows a tab automatically on write; nothing to
        // pre-allocate ahead of `append_rows`/`overwrite_range`.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a1_range_open_ended_uses_bare_column_reference() {
        assert_eq!(a1_range("Records - 1", 2, None), "'Records - 1'!A2:AF");
        assert_eq!(a1_range("Records - 1", 2, Some(10)), "'Records - 1'!A2:AF10");
    }

    #[test]
    fn cell_round_trips_through_json() {
        assert_eq!(json_to_cell(&cell_to_json(&Cell::Int(42))), Cell::Int(42));
        assert_eq!(json_to_cell(&cell_to_json(&Cell::Str("hi".into()))), Cell::Str("hi".into()));
        assert_eq!(json_to_cell(&cell_to_json(&Cell::Empty)), Cell::Empty);
    }
}
