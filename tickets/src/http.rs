//! HTTP ticket service client.
//!
//! Talks JSON to the backend:
//!
//! | Operation | Request |
//! |---|---|
//! | `list_tickets` | `GET {base}/tickets` |
//! | `create_ticket` | `POST {base}/tickets` |
//! | `update_ticket` | `PUT {base}/tickets/{id}` |

use crate::service::{ServiceError, ServiceFuture, TicketService};
use crate::types::{AuthToken, Ticket, TicketDraft, TicketId};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Ticket service reached over HTTP
#[derive(Clone)]
pub struct HttpTicketService {
    client: Client,
    base_url: String,
    token: Option<AuthToken>,
}

impl HttpTicketService {
    /// Client for `base_url` with the given request timeout
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Transport`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Send `token` as a bearer credential on every request
    #[must_use]
    pub fn with_token(mut self, token: AuthToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Base URL without trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token.expose()),
            None => request,
        }
    }

    async fn send(
        &self,
        request: RequestBuilder,
        ticket: Option<TicketId>,
    ) -> Result<Response, ServiceError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(match (status, ticket) {
            (StatusCode::UNAUTHORIZED, _) => ServiceError::Unauthorized,
            (StatusCode::NOT_FOUND, Some(id)) => ServiceError::NotFound(id),
            (StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY, _) => {
                ServiceError::Validation(body)
            }
            (status, _) => ServiceError::Server {
                status: status.as_u16(),
                message: body,
            },
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
        response
            .json::<T>()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))
    }
}

impl std::fmt::Debug for HttpTicketService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTicketService")
            .field("base_url", &self.base_url)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

impl TicketService for HttpTicketService {
    fn list_tickets(&self) -> ServiceFuture<'_, Vec<Ticket>> {
        Box::pin(async move {
            let url = format!("{}/tickets", self.base_url);
            let response = self.send(self.client.get(url), None).await?;
            Self::decode(response).await
        })
    }

    fn create_ticket(&self, draft: TicketDraft) -> ServiceFuture<'_, Ticket> {
        Box::pin(async move {
            let url = format!("{}/tickets", self.base_url);
            let response = self.send(self.client.post(url).json(&draft), None).await?;
            Self::decode(response).await
        })
    }

    fn update_ticket(&self, ticket: Ticket) -> ServiceFuture<'_, ()> {
        Box::pin(async move {
            let url = format!("{}/tickets/{}", self.base_url, ticket.id);
            self.send(self.client.put(url).json(&ticket), Some(ticket.id))
                .await?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let service = HttpTicketService::new("http://localhost:3000/", Duration::from_secs(1)).unwrap();
        assert_eq!(service.base_url(), "http://localhost:3000");
    }

    #[test]
    fn test_debug_hides_token() {
        let service = HttpTicketService::new("http://localhost:3000", Duration::from_secs(1))
            .unwrap()
            .with_token(AuthToken::new("s3cret"));

        assert!(!format!("{service:?}").contains("s3cret"));
    }
}
