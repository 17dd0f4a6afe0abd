//! PostgREST Remote Store
//!
//! HTTP implementation of [`RemoteStore`] for a PostgREST (Supabase-style)
//! endpoint: `GET`/`POST`/`PATCH`/`DELETE` on `/rest/v1/{table}` with filters
//! in the query string.

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{Client, Method, RequestBuilder, Response};

use crate::domain::{Collection, DomainError, DomainResult, RemoteId};
use super::sync_config::SyncConfig;
use super::traits::{RemoteStore, Row};

/// Characters left unescaped in filter values (`id=in.(1,2)`)
const FILTER_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'.')
    .remove(b',')
    .remove(b'(')
    .remove(b')')
    .remove(b'_')
    .remove(b'-');

/// Characters left unescaped in path segments
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'_').remove(b'-').remove(b'.');

/// PostgREST implementation of the remote store
pub struct RestStore {
    client: Client,
    base_url: String,
    token: String,
}

impl RestStore {
    pub fn new(config: &SyncConfig) -> DomainResult<Self> {
        if !config.is_usable() {
            return Err(DomainError::InvalidInput("url and token are required".to_string()));
        }
        Ok(Self {
            client: Client::new(),
            base_url: config.url.trim().trim_end_matches('/').to_string(),
            token: config.token.trim().to_string(),
        })
    }

    /// Check that the endpoint answers and the token is accepted
    pub async fn validate(&self) -> DomainResult<()> {
        let url = format!(
            "{}?{}&limit=1",
            table_url(&self.base_url, Collection::Themes),
            select_query(&["id"])
        );
        self.send(self.request(Method::GET, &url)).await?;
        Ok(())
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.token)
            .bearer_auth(&self.token)
    }

    async fn send(&self, request: RequestBuilder) -> DomainResult<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(DomainError::Remote(format!("HTTP {}: {}", status, body.trim())))
    }

    async fn send_for_rows(&self, request: RequestBuilder) -> DomainResult<Vec<Row>> {
        let response = self.send(request).await?;
        Ok(response.json::<Vec<Row>>().await?)
    }
}

#[async_trait]
impl RemoteStore for RestStore {
    async fn select(&self, collection: Collection, columns: &[&str]) -> DomainResult<Vec<Row>> {
        let columns = if columns.is_empty() { collection.columns() } else { columns };
        let url = format!(
            "{}?{}&order=id.asc",
            table_url(&self.base_url, collection),
            select_query(columns)
        );
        self.send_for_rows(self.request(Method::GET, &url)).await
    }

    async fn insert(&self, collection: Collection, rows: Vec<Row>) -> DomainResult<Vec<Row>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let url = format!(
            "{}?{}",
            table_url(&self.base_url, collection),
            select_query(collection.columns())
        );
        let request = self
            .request(Method::POST, &url)
            .header("Prefer", "return=representation")
            .json(&rows);
        let inserted = self.send_for_rows(request).await?;
        log::debug!("Inserted {} rows into {}", inserted.len(), collection);
        Ok(inserted)
    }

    async fn update(
        &self,
        collection: Collection,
        patches: Vec<(RemoteId, Row)>,
    ) -> DomainResult<Vec<Row>> {
        // PostgREST applies one body per request, so each id gets its own PATCH
        let mut updated = Vec::with_capacity(patches.len());
        for (id, patch) in patches {
            let url = format!(
                "{}?{}&{}",
                table_url(&self.base_url, collection),
                eq_filter(id),
                select_query(collection.columns())
            );
            let request = self
                .request(Method::PATCH, &url)
                .header("Prefer", "return=representation")
                .json(&patch);
            updated.extend(self.send_for_rows(request).await?);
        }
        Ok(updated)
    }

    async fn delete_by_ids(&self, collection: Collection, ids: &[RemoteId]) -> DomainResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let url = format!("{}?{}", table_url(&self.base_url, collection), in_filter(ids));
        self.send(self.request(Method::DELETE, &url)).await?;
        Ok(())
    }
}

fn table_url(base_url: &str, collection: Collection) -> String {
    format!(
        "{}/rest/v1/{}",
        base_url,
        utf8_percent_encode(collection.table(), PATH_SEGMENT)
    )
}

fn select_query(columns: &[&str]) -> String {
    format!("select={}", utf8_percent_encode(&columns.join(","), FILTER_VALUE))
}

fn eq_filter(id: RemoteId) -> String {
    format!("id={}", utf8_percent_encode(&format!("eq.{}", id), FILTER_VALUE))
}

fn in_filter(ids: &[RemoteId]) -> String {
    let list = ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(",");
    format!("id={}", utf8_percent_encode(&format!("in.({})", list), FILTER_VALUE))
}
