use std::sync::mpsc::Sender;
use std::sync::{Mutex, RwLock};
use std::time::Duration;

use reqwest::Method;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::BackendSettings;

use super::auth::{AuthEvent, Session};
use super::error::{BackendError, Result};

/// Blocking client for the hosted backend.
///
/// Holds the current auth session: once signed in, requests carry the
/// user's access token instead of the anon key.
pub struct BackendClient {
    pub(super) http: Client,
    pub(super) base_url: String,
    pub(super) anon_key: String,
    pub(super) session: RwLock<Option<Session>>,
    pub(super) listeners: Mutex<Vec<Sender<AuthEvent>>>,
}

impl BackendClient {
    pub fn new(settings: &BackendSettings) -> Result<Self> {
        let url = settings.url.trim().trim_end_matches('/').to_string();
        if url.is_empty() {
            return Err(BackendError::InvalidUrl("URL cannot be empty".into()));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(BackendError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .user_agent(format!("melodex/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: url,
            anon_key: settings.anon_key.clone(),
            session: RwLock::new(None),
            listeners: Mutex::new(Vec::new()),
        })
    }

    pub(super) fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    pub(super) fn access_token(&self) -> Option<String> {
        self.session
            .read()
            .ok()
            .and_then(|s| s.as_ref().map(|s| s.access_token.clone()))
    }

    /// Start a request with the `apikey` header and the best available bearer token.
    pub(super) fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let token = self.access_token().unwrap_or_else(|| self.anon_key.clone());
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
    }

    /// Fetch rows from `table`. `query` holds PostgREST params (`select`, filters, `limit`).
    pub fn select<T: DeserializeOwned>(&self, table: &str, query: &[(&str, String)]) -> Result<Vec<T>> {
        let url = self.rest_url(table);
        debug!(table, ?query, "select");
        let response = self.request(Method::GET, &url).query(query).send()?;
        let response = check(response)?;
        response
            .json::<Vec<T>>()
            .map_err(|e| BackendError::Parse(format!("rows from {table}: {e}")))
    }

    pub fn insert<T: Serialize>(&self, table: &str, row: &T) -> Result<()> {
        let url = self.rest_url(table);
        debug!(table, "insert");
        let response = self
            .request(Method::POST, &url)
            .header("Prefer", "return=minimal")
            .json(row)
            .send()?;
        check(response).map(drop)
    }

    /// Insert `rows`, merging into existing rows on primary-key conflict.
    pub fn upsert<T: Serialize>(&self, table: &str, rows: &[T]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let url = self.rest_url(table);
        debug!(table, count = rows.len(), "upsert");
        let response = self
            .request(Method::POST, &url)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(rows)
            .send()?;
        check(response).map(drop)
    }

    /// Patch every row matching `filters` with the fields of `patch`.
    pub fn update<T: Serialize>(&self, table: &str, filters: &[(&str, String)], patch: &T) -> Result<()> {
        let url = self.rest_url(table);
        debug!(table, ?filters, "update");
        let response = self
            .request(Method::PATCH, &url)
            .query(filters)
            .header("Prefer", "return=minimal")
            .json(patch)
            .send()?;
        check(response).map(drop)
    }

    pub fn delete(&self, table: &str, filters: &[(&str, String)]) -> Result<()> {
        if filters.is_empty() {
            // PostgREST would refuse anyway; never send an unfiltered delete.
            return Err(BackendError::Api {
                status: 400,
                message: format!("refusing to delete from {table} without a filter"),
            });
        }
        let url = self.rest_url(table);
        debug!(table, ?filters, "delete");
        let response = self.request(Method::DELETE, &url).query(filters).send()?;
        check(response).map(drop)
    }
}

/// PostgREST equality filter value.
pub(super) fn eq(value: &str) -> String {
    format!("eq.{value}")
}

/// Case-insensitive "contains" filter value. Wildcards in `term` are dropped.
pub(super) fn ilike_contains(term: &str) -> String {
    let cleaned: String = term
        .trim()
        .chars()
        .filter(|c| !matches!(c, '*' | '%'))
        .collect();
    format!("ilike.*{cleaned}*")
}

/// Turn a non-success response into `BackendError::Api`.
pub(super) fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(api_error(status.as_u16(), &body))
}

/// Build an API error, pulling the message out of the usual JSON error shapes.
pub(super) fn api_error(status: u16, body: &str) -> BackendError {
    BackendError::Api {
        status,
        message: error_message(body),
    }
}

pub(super) fn error_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|k| v.get(*k).and_then(|m| m.as_str()))
        })
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string())
}
