/// User-profile store gateway
///
/// Talks to the external profile service that owns the tracked lists.
///
/// API Flow:
/// 1. Read:   GET    {base}/{list}?page=&limit=
/// 2. Add:    POST   {base}/{list}                  body: TrackedItem
/// 3. Remove: DELETE {base}/{list}/{media_type}/{media_id}
/// 4. Clear:  DELETE {base}/{list}
/// 5. Watch:  PUT    {base}/recent-watches          body: TrackedItem
///
/// Every response body is `{success, message, data?}`. 409 and 404 still
/// carry that envelope and are mapped to `already_present` / `not_found`.
use reqwest::{Client as HttpClient, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use super::{normalize_paging, TrackedListsGateway};
use crate::{
    error::{AppError, AppResult},
    models::{
        GatewayResponse, MediaType, ResponseCode, TrackedItem, TrackedListKind, TrackedPage,
    },
};

#[derive(Clone)]
pub struct ProfileStoreGateway {
    http_client: HttpClient,
    base_url: String,
    token: Option<String>,
}

impl ProfileStoreGateway {
    pub fn new(base_url: String, token: Option<String>) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> AppResult<GatewayResponse<T>> {
        let response = self.authorize(request).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> AppResult<GatewayResponse<T>> {
        let status = response.status();
        let code = match status {
            StatusCode::CONFLICT => Some(ResponseCode::AlreadyPresent),
            StatusCode::NOT_FOUND => Some(ResponseCode::NotFound),
            s if s.is_success() => None,
            _ => {
                let body = response.text().await.unwrap_or_default();
                tracing::error!(status = %status, body = %body, "Profile store request failed");
                return Err(AppError::ExternalApi(format!(
                    "Profile store returned status {}: {}",
                    status, body
                )));
            }
        };

        let text = response.text().await?;
        let mut decoded: GatewayResponse<T> = serde_json::from_str(&text).map_err(|e| {
            tracing::error!(error = %e, response = %text, "Failed to parse profile store response");
            AppError::ExternalApi(format!("Failed to parse profile store response: {}", e))
        })?;

        if code.is_some() {
            decoded.success = false;
            decoded.code = decoded.code.or(code);
        }
        Ok(decoded)
    }
}

#[async_trait::async_trait]
impl TrackedListsGateway for ProfileStoreGateway {
    async fn add(
        &self,
        list: TrackedListKind,
        item: TrackedItem,
    ) -> AppResult<GatewayResponse<TrackedItem>> {
        if let Err(message) = item.validate() {
            return Ok(GatewayResponse::rejected(ResponseCode::Invalid, message));
        }
        let request = self.http_client.post(self.url(list.as_str())).json(&item);
        self.send(request).await
    }

    async fn remove(
        &self,
        list: TrackedListKind,
        media_id: u64,
        media_type: MediaType,
    ) -> AppResult<GatewayResponse<()>> {
        let path = format!("{}/{}/{}", list.as_str(), media_type, media_id);
        let request = self.http_client.delete(self.url(&path));
        self.send(request).await
    }

    async fn list(
        &self,
        list: TrackedListKind,
        page: u32,
        limit: u32,
    ) -> AppResult<GatewayResponse<TrackedPage>> {
        let (page, limit) = normalize_paging(page, limit);
        let request = self
            .http_client
            .get(self.url(list.as_str()))
            .query(&[("page", page), ("limit", limit)]);
        self.send(request).await
    }

    async fn clear(&self, list: TrackedListKind) -> AppResult<GatewayResponse<()>> {
        if list != TrackedListKind::RecentWatches {
            return Ok(GatewayResponse::rejected(
                ResponseCode::Unsupported,
                format!("{} cannot be cleared", list.label()),
            ));
        }

        let request = self.http_client.delete(self.url(list.as_str()));
        self.send(request).await
    }

    async fn record_watch(&self, item: TrackedItem) -> AppResult<GatewayResponse<TrackedItem>> {
        if let Err(message) = item.validate() {
            return Ok(GatewayResponse::rejected(ResponseCode::Invalid, message));
        }
        let request = self
            .http_client
            .put(self.url(TrackedListKind::RecentWatches.as_str()))
            .json(&item);
        self.send(request).await
    }

    fn name(&self) -> &'static str {
        "profile-store"
    }
}
