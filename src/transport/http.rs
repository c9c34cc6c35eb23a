//! HTTP transport
//!
//! `reqwest`-based client for the answer service's REST and streaming
//! endpoints.

use async_trait::async_trait;
use bytes::Bytes;
use futures::{stream, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use tracing::{debug, error, instrument, warn};

use super::{blocked_message, rejection_message, ByteStream, ChatTransport};
use crate::{
    chat::models::{
        ChatId, ChatListResponse, ChatRequest, ChatSummary, GeneratedTitle, NewChatRequest,
        NewChatResponse,
    },
    config::Config,
    error::{ClientError, ClientResult, STREAM_FAILURE_MESSAGE},
};

/// Answer service client over HTTP
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a new transport
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.api_url.clone(),
        }
    }

    /// Build an HTTP client with the configured timeout
    pub fn build_client(config: &Config) -> ClientResult<reqwest::Client> {
        let client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(
                config.request_timeout_seconds.min(30),
            ))
            .timeout(std::time::Duration::from_secs(config.request_timeout_seconds))
            .build()?;
        Ok(client)
    }

    /// Build headers with bearer authentication
    fn auth_headers(&self, token: &str) -> ClientResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ClientError::Config("Auth token contains invalid characters".into()))?;
        headers.insert(reqwest::header::AUTHORIZATION, value);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Turn a non-2xx response into a rejection
    async fn reject(response: reqwest::Response, endpoint: &str) -> ClientError {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        error!(status = %status, body = %text, endpoint = %endpoint, "Request rejected");
        ClientError::Rejected {
            status,
            message: rejection_message(status, &text),
        }
    }

    /// Read and parse a JSON body
    async fn parse_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        endpoint: &str,
    ) -> ClientResult<T> {
        let body = response.text().await?;
        debug!(body = %body, endpoint = %endpoint, "Response body");

        serde_json::from_str(&body).map_err(|e| {
            error!(error = %e, body = %body, endpoint = %endpoint, "Failed to parse response");
            ClientError::Upstream(format!("Failed to parse {} response: {}", endpoint, e))
        })
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    fn name(&self) -> &'static str {
        "http"
    }

    #[instrument(skip(self, request, token), fields(chat_id = ?request.chat_id, history = request.conversation_history.len()))]
    async fn open_chat_stream(
        &self,
        request: &ChatRequest,
        token: &str,
    ) -> ClientResult<ByteStream> {
        let url = format!("{}/api/chat", self.base_url);
        debug!(url = %url, "Opening chat stream");

        let response = self
            .client
            .post(&url)
            .headers(self.auth_headers(token)?)
            .header(ACCEPT, "text/event-stream")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to send chat request");
                e
            })?;

        let status = response.status();
        debug!(status = %status, "Chat response status");

        if !status.is_success() {
            return Err(Self::reject(response, "chat").await);
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("application/json"))
            .unwrap_or(false);

        if is_json {
            // A JSON reply is either a block or a single non-streamed frame.
            let body = response.bytes().await?;
            let frame = match serde_json::from_slice::<Value>(&body) {
                Ok(value) => {
                    if let Some(message) = blocked_message(&value) {
                        warn!(status = %status, message = %message, "Chat request blocked");
                        return Err(ClientError::Rejected { status, message });
                    }
                    Bytes::from(format!("data: {}\n", value))
                }
                Err(e) => {
                    error!(error = %e, body_len = body.len(), "Unparseable JSON chat response");
                    return Err(ClientError::Rejected {
                        status,
                        message: STREAM_FAILURE_MESSAGE.to_string(),
                    });
                }
            };
            return Ok(Box::pin(stream::once(async move { Ok(frame) })));
        }

        Ok(Box::pin(
            response.bytes_stream().map(|chunk| chunk.map_err(ClientError::from)),
        ))
    }

    #[instrument(skip(self, request, token), fields(user_id = %request.user_id))]
    async fn create_chat(
        &self,
        request: &NewChatRequest,
        token: &str,
    ) -> ClientResult<NewChatResponse> {
        let url = format!("{}/api/chats/new", self.base_url);
        debug!(url = %url, title = ?request.title, "Creating chat session");

        let response = self
            .client
            .post(&url)
            .headers(self.auth_headers(token)?)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::reject(response, "create chat").await);
        }

        let created: NewChatResponse = Self::parse_json(response, "create chat").await?;
        debug!(chat_id = %created.id, "Chat session created");
        Ok(created)
    }

    #[instrument(skip(self, token))]
    async fn list_chats(&self, user_id: &str, token: &str) -> ClientResult<Vec<ChatSummary>> {
        let url = format!("{}/api/chats", self.base_url);
        debug!(url = %url, "Listing chats");

        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers(token)?)
            .query(&[("user_id", user_id)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::reject(response, "list chats").await);
        }

        let listing: ChatListResponse = Self::parse_json(response, "list chats").await?;
        let chats = listing.into_chats();
        debug!(count = chats.len(), "Listed chats");
        Ok(chats)
    }

    #[instrument(skip(self, token), fields(chat_id = %chat_id))]
    async fn generate_title(&self, chat_id: &ChatId, token: &str) -> ClientResult<String> {
        let url = format!("{}/api/chats/{}/generate-title", self.base_url, chat_id);
        debug!(url = %url, "Generating chat title");

        let response = self
            .client
            .post(&url)
            .headers(self.auth_headers(token)?)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::reject(response, "generate title").await);
        }

        let generated: GeneratedTitle = Self::parse_json(response, "generate title").await?;
        Ok(generated.title)
    }
}
