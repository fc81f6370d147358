//! HTTP implementation of [`StorefrontBackend`].
//!
//! Talks to the hosted backend's REST surface: row operations live under
//! `{base}/rest/v1/{collection}` and stored procedures under
//! `{base}/rest/v1/rpc/{procedure}`. Every request carries the project API key
//! twice, as an `apikey` header and as a bearer token, which is what the
//! hosted gateway expects.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::json;

use shopkit_orders::{NewOrder, NewOrderItem, OrderId, OrderRecord};
use shopkit_tracking::TrackingEvent;

use super::r#trait::{BackendError, PromoRpcReply, StorefrontBackend};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Storefront backend over HTTP.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpBackend {
    /// Create a backend client for the given project base URL and API key.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn rows_url(&self, collection: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, collection)
    }

    fn rpc_url(&self, procedure: &str) -> String {
        format!("{}/rest/v1/rpc/{}", self.base_url, procedure)
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn insert_rows<T: serde::Serialize + ?Sized>(
        &self,
        collection: &str,
        rows: &T,
    ) -> Result<(), BackendError> {
        let response = self
            .authed(self.client.post(self.rows_url(collection)).json(rows))
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        ensure_success(&response)?;
        Ok(())
    }

    async fn select_rows<T: DeserializeOwned>(
        &self,
        collection: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, BackendError> {
        let response = self
            .authed(self.client.get(self.rows_url(collection)).query(query))
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        ensure_success(&response)?;
        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }
}

fn ensure_success(response: &reqwest::Response) -> Result<(), BackendError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(BackendError::Status(status.as_u16()))
    }
}

#[async_trait::async_trait]
impl StorefrontBackend for HttpBackend {
    async fn insert_order(&self, order: &NewOrder) -> Result<(), BackendError> {
        self.insert_rows("orders", order).await
    }

    async fn insert_order_items(&self, items: &[NewOrderItem]) -> Result<(), BackendError> {
        self.insert_rows("order_items", items).await
    }

    async fn fetch_order(&self, id: OrderId) -> Result<Option<OrderRecord>, BackendError> {
        let mut orders: Vec<NewOrder> = self
            .select_rows("orders", &[("id", format!("eq.{id}"))])
            .await?;

        let Some(order) = orders.pop() else {
            return Ok(None);
        };

        let items: Vec<NewOrderItem> = self
            .select_rows(
                "order_items",
                &[
                    ("order_id", format!("eq.{id}")),
                    ("order", "line_no.asc".to_string()),
                ],
            )
            .await?;

        Ok(Some(OrderRecord { order, items }))
    }

    async fn fetch_tracking_events(&self, id: OrderId) -> Result<Vec<TrackingEvent>, BackendError> {
        self.select_rows(
            "order_tracking",
            &[
                ("order_id", format!("eq.{id}")),
                ("order", "created_at.asc".to_string()),
            ],
        )
        .await
    }

    async fn validate_promo_code(&self, code: &str) -> Result<PromoRpcReply, BackendError> {
        let response = self
            .authed(
                self.client
                    .post(self.rpc_url("validate_promo_code"))
                    .json(&json!({ "promo_code_text": code })),
            )
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        ensure_success(&response)?;

        // The procedure returns a one-row result set.
        let mut replies: Vec<PromoRpcReply> = response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        replies
            .pop()
            .ok_or_else(|| BackendError::Decode("empty promo validation result set".to_string()))
    }
}
