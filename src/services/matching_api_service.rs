use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::FeedError;
use crate::models::{
    CandidateRecord, SearchRequest, SearchResponse, SelfProfile, SelfProfileResource,
};

pub const PROFILE_PATH: &[&str] = &["api", "v1", "resource", "profile"];
pub const SEARCH_PATH: &[&str] = &["api", "v1", "search", "users"];
pub const LIKE_PATH: &[&str] = &["api", "v1", "user", "like"];
pub const HIDE_PATH: &[&str] = &["api", "v1", "user", "hide"];
const MESSAGE_SEGMENT: &str = "message";

/// The matching backend as seen by the feed.
#[async_trait]
pub trait MatchingApi: Send + Sync {
    async fn self_profile(&self) -> Result<SelfProfile, FeedError>;

    /// Ranked candidates, in backend order.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<CandidateRecord>, FeedError>;

    async fn like(&self, id: &str, message: Option<&str>) -> Result<(), FeedError>;

    async fn hide(&self, id: &str) -> Result<(), FeedError>;
}

pub struct HttpMatchingApi {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpMatchingApi {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, FeedError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| FeedError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(FeedError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            token,
        })
    }

    /// Appends path segments; each one is percent-encoded, so ids and free
    /// text messages cannot escape their segment.
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url, FeedError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FeedError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send(
        &self,
        req: reqwest::RequestBuilder,
        url: &Url,
    ) -> Result<reqwest::Response, FeedError> {
        let resp = self
            .authorize(req)
            .send()
            .await
            .map_err(|e| FeedError::connect_failed(url.as_str(), e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::non_ok(url.as_str(), status.as_u16()));
        }
        debug!("🌐 {} -> {}", url, status);
        Ok(resp)
    }

    async fn read_json<T: DeserializeOwned>(
        resp: reqwest::Response,
        url: &Url,
    ) -> Result<T, FeedError> {
        let body = resp
            .text()
            .await
            .map_err(|e| FeedError::connect_failed(url.as_str(), e))?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl MatchingApi for HttpMatchingApi {
    async fn self_profile(&self) -> Result<SelfProfile, FeedError> {
        let url = self.endpoint(PROFILE_PATH.iter().copied())?;
        let resp = self.send(self.client.get(url.clone()), &url).await?;
        let resource: SelfProfileResource = Self::read_json(resp, &url).await?;
        Ok(resource.user)
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<CandidateRecord>, FeedError> {
        let url = self.endpoint(SEARCH_PATH.iter().copied())?;
        let resp = self
            .send(self.client.post(url.clone()).json(request), &url)
            .await?;
        let body: SearchResponse = Self::read_json(resp, &url).await?;
        Ok(body.users.unwrap_or_default())
    }

    async fn like(&self, id: &str, message: Option<&str>) -> Result<(), FeedError> {
        let mut segments: Vec<&str> = LIKE_PATH.to_vec();
        segments.push(id);
        if let Some(message) = message {
            segments.extend([MESSAGE_SEGMENT, message]);
        }
        let url = self.endpoint(segments)?;
        self.send(self.client.post(url.clone()), &url).await?;
        Ok(())
    }

    async fn hide(&self, id: &str) -> Result<(), FeedError> {
        let mut segments: Vec<&str> = HIDE_PATH.to_vec();
        segments.push(id);
        let url = self.endpoint(segments)?;
        self.send(self.client.post(url.clone()), &url).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn endpoints_encode_segments() {
        let api = HttpMatchingApi::new("http://backend.localhost:8080/", None).unwrap();
        let url = api
            .endpoint(["api", "v1", "user", "like", "c1", "hi there/you?"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://backend.localhost:8080/api/v1/user/like/c1/hi%20there%2Fyou%3F"
        );
    }

    #[tokio::test]
    async fn like_with_message_puts_text_after_message_segment() {
        use axum::extract::Path;
        use axum::routing::post;
        use axum::Router;
        use std::sync::{Arc, Mutex};

        let seen: Arc<Mutex<Vec<(String, String)>>> = Arc::default();
        let recorder = seen.clone();
        let app = Router::new().route(
            "/api/v1/user/like/:id/message/:text",
            post(move |Path((id, text)): Path<(String, String)>| {
                let recorder = recorder.clone();
                async move {
                    recorder.lock().unwrap().push((id, text));
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let api = HttpMatchingApi::new(&format!("http://{}", addr), None).unwrap();
        api.like("c1", Some("hi there")).await.unwrap();
        assert_eq!(
            *seen.lock().unwrap(),
            vec![("c1".to_string(), "hi there".to_string())]
        );
    }

    #[test]
    fn base_path_is_kept() {
        let api = HttpMatchingApi::new("https://example.org/matching", None).unwrap();
        let url = api.endpoint(SEARCH_PATH.iter().copied()).unwrap();
        assert_eq!(url.as_str(), "https://example.org/matching/api/v1/search/users");
    }

    #[test]
    fn rejects_non_base_urls() {
        assert!(matches!(
            HttpMatchingApi::new("mailto:someone@example.org", None),
            Err(FeedError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            HttpMatchingApi::new("not a url", None),
            Err(FeedError::InvalidBaseUrl(_))
        ));
    }
}
