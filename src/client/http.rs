//! `reqwest` implementation of the client APIs.
//!
//! Non-success statuses become [`ReviewError`]s through [`ReviewError::from_status`];
//! connection failures and timeouts count as transient server errors.

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::Value;
use uuid::Uuid;

use super::{ClientConfig, FlashcardApi, ReviewApi};
use crate::models::{
    Flashcard, FlashcardPage, ListFlashcards, ReviewCard, ReviewError, UpdateCardReview,
    UpdateFlashcard,
};
use crate::server::auth::USER_ID_HEADER;

pub struct HttpClient {
    client: Client,
    config: ClientConfig,
}

fn transport_error(err: reqwest::Error) -> ReviewError {
    if err.is_timeout() {
        ReviewError::TransientServer("request timed out".to_string())
    } else {
        ReviewError::TransientServer(err.to_string())
    }
}

fn malformed(err: impl ToString) -> ReviewError {
    ReviewError::MalformedResponse(err.to_string())
}

impl HttpClient {
    pub fn new(config: ClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.config.url(path))
            .header(USER_ID_HEADER, self.config.user_id.to_string())
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ReviewError> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| format!("HTTP {}", status));
        debug!("Request failed with {}: {}", status, message);

        Err(ReviewError::from_status(status.as_u16(), message))
    }
}

#[async_trait]
impl ReviewApi for HttpClient {
    async fn fetch_session(&self, limit: u32) -> Result<Vec<ReviewCard>, ReviewError> {
        let path = format!("/review/session?limit={}", limit);
        let response = self.send(self.request(Method::GET, &path)).await?;
        let body: Value = response.json().await.map_err(malformed)?;

        let cards = body
            .get("cards")
            .filter(|cards| cards.is_array())
            .cloned()
            .ok_or_else(|| malformed("`cards` is not an array"))?;

        serde_json::from_value(cards).map_err(malformed)
    }

    async fn submit_review(&self, update: UpdateCardReview) -> Result<(), ReviewError> {
        self.send(self.request(Method::POST, "/review/update").json(&update))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl FlashcardApi for HttpClient {
    async fn list_flashcards(&self, query: ListFlashcards) -> Result<FlashcardPage, ReviewError> {
        let path = format!(
            "/flashcards?page={}&pageSize={}&sortBy={}&order={}",
            query.page,
            query.page_size,
            query.sort_by.column(),
            query.order.keyword().to_lowercase(),
        );
        let response = self.send(self.request(Method::GET, &path)).await?;
        response.json().await.map_err(malformed)
    }

    async fn update_flashcard(
        &self,
        id: Uuid,
        update: &UpdateFlashcard,
    ) -> Result<Flashcard, ReviewError> {
        let path = format!("/flashcards/{}", id);
        let response = self
            .send(self.request(Method::PATCH, &path).json(update))
            .await?;
        response.json().await.map_err(malformed)
    }

    async fn delete_flashcard(&self, id: Uuid) -> Result<(), ReviewError> {
        let path = format!("/flashcards/{}", id);
        self.send(self.request(Method::DELETE, &path)).await?;
        Ok(())
    }
}
