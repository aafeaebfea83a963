//! REST implementation of [`CommerceBackend`] over HTTPS.
//!
//! Resource-oriented routes:
//!
//! - `GET /cart`, `POST /cart`, `PUT /cart/{id}`, `DELETE /cart/{id}`,
//!   `DELETE /cart/clear`
//! - `GET /quotations`, `POST /quotations`, `DELETE /quotations/{id}`,
//!   `DELETE /quotations/clear`
//! - `GET /profile`
//! - `POST /orders/checkout`, `POST /orders/direct`
//!
//! Every request carries a bearer token from the [`CredentialStore`].
//! Non-2xx responses carry a JSON `message` field which becomes the
//! surfaced error reason.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use marula_core::{LineItem, LineItemId, Order, ProductId};

use crate::api::{
    AddItemRequest, CommerceBackend, OrderRequest, ProfileResponse, UpdateQuantityRequest,
};
use crate::config::EngineConfig;
use crate::credentials::CredentialStore;
use crate::error::ApiError;

/// REST client for the commerce API.
#[derive(Debug, Clone)]
pub struct RestBackend {
    client: reqwest::Client,
    base_url: String,
    credentials: CredentialStore,
}

impl RestBackend {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying HTTP client cannot be built.
    pub fn new(config: &EngineConfig, credentials: CredentialStore) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            credentials,
        })
    }

    /// Issue a request and read the response body as text.
    ///
    /// Non-2xx statuses are mapped to the error taxonomy here; callers only
    /// see response text for successful requests.
    async fn execute<B: serde::Serialize + ?Sized + Sync>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<String, ApiError> {
        let mut request = self
            .client
            .request(method, format!("{}{path}", self.base_url))
            .header(reqwest::header::AUTHORIZATION, self.credentials.bearer()?);

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                path,
                body = %text.chars().take(500).collect::<String>(),
                "commerce API returned non-success status"
            );
            return Err(error_for_status(status, &text));
        }

        Ok(text)
    }

    /// Issue a request and parse a JSON response.
    async fn execute_json<T: DeserializeOwned, B: serde::Serialize + ?Sized + Sync>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        let text = self.execute(method, path, body).await?;
        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                path,
                body = %text.chars().take(500).collect::<String>(),
                "failed to parse commerce API response"
            );
            ApiError::Parse(e)
        })
    }

    /// Issue a request and discard the response body.
    async fn execute_no_content(&self, method: Method, path: &str) -> Result<(), ApiError> {
        self.execute::<()>(method, path, None).await.map(|_| ())
    }
}

/// Map a non-2xx response to the error taxonomy.
fn error_for_status(status: StatusCode, body: &str) -> ApiError {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    let message = serde_json::from_str::<ErrorBody>(body).map_or_else(
        |_| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        },
        |b| b.message,
    );

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::AuthRejected(message),
        StatusCode::NOT_FOUND => ApiError::NotFound(message),
        _ => ApiError::Server {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl CommerceBackend for RestBackend {
    #[instrument(skip(self))]
    async fn fetch_cart(&self) -> Result<Vec<LineItem>, ApiError> {
        self.execute_json::<_, ()>(Method::GET, "/cart", None).await
    }

    #[instrument(skip(self))]
    async fn add_cart_item(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<LineItem, ApiError> {
        let body = AddItemRequest {
            product_id,
            quantity,
        };
        self.execute_json(Method::POST, "/cart", Some(&body)).await
    }

    #[instrument(skip(self))]
    async fn update_cart_item(
        &self,
        id: LineItemId,
        quantity: u32,
    ) -> Result<LineItem, ApiError> {
        let body = UpdateQuantityRequest { quantity };
        self.execute_json(Method::PUT, &format!("/cart/{id}"), Some(&body))
            .await
    }

    #[instrument(skip(self))]
    async fn remove_cart_item(&self, id: LineItemId) -> Result<(), ApiError> {
        self.execute_no_content(Method::DELETE, &format!("/cart/{id}"))
            .await
    }

    #[instrument(skip(self))]
    async fn clear_cart(&self) -> Result<(), ApiError> {
        self.execute_no_content(Method::DELETE, "/cart/clear").await
    }

    #[instrument(skip(self))]
    async fn fetch_quotations(&self) -> Result<Vec<LineItem>, ApiError> {
        self.execute_json::<_, ()>(Method::GET, "/quotations", None)
            .await
    }

    #[instrument(skip(self))]
    async fn add_quotation(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<LineItem, ApiError> {
        let body = AddItemRequest {
            product_id,
            quantity,
        };
        self.execute_json(Method::POST, "/quotations", Some(&body))
            .await
    }

    #[instrument(skip(self))]
    async fn remove_quotation(&self, id: LineItemId) -> Result<(), ApiError> {
        self.execute_no_content(Method::DELETE, &format!("/quotations/{id}"))
            .await
    }

    #[instrument(skip(self))]
    async fn clear_quotations(&self) -> Result<(), ApiError> {
        self.execute_no_content(Method::DELETE, "/quotations/clear")
            .await
    }

    #[instrument(skip(self))]
    async fn fetch_profile(&self) -> Result<ProfileResponse, ApiError> {
        self.execute_json::<_, ()>(Method::GET, "/profile", None)
            .await
    }

    #[instrument(skip(self, order))]
    async fn submit_cart_order(&self, order: &OrderRequest) -> Result<Order, ApiError> {
        self.execute_json(Method::POST, "/orders/checkout", Some(order))
            .await
    }

    #[instrument(skip(self, order))]
    async fn submit_direct_order(&self, order: &OrderRequest) -> Result<Order, ApiError> {
        self.execute_json(Method::POST, "/orders/direct", Some(order))
            .await
    }
}
