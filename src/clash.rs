// src/clash.rs
use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Deserialize};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::UpstreamError;
use crate::models::{ClanDetails, MemberList};

const CLAN_FALLBACK: &str = "Failed to fetch clan data";
const MEMBERS_FALLBACK: &str = "Failed to fetch clan members";

/// Error payload the upstream API sends alongside non-2xx statuses
#[derive(Debug, Default, Deserialize)]
struct UpstreamErrorBody {
    message: Option<String>,
}

/// Clan tags start with `#`, which would otherwise end the URL path.
pub fn encode_tag(tag: &str) -> String {
    tag.replace('#', "%23")
}

/// Thin client for the clan endpoints of the game API
#[derive(Debug, Clone)]
pub struct ClashClient {
    http: Client,
    base_url: String,
}

impl ClashClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn clan_url(&self, tag: &str) -> String {
        format!("{}/v1/clans/{}", self.base_url, encode_tag(tag))
    }

    pub fn members_url(&self, tag: &str) -> String {
        format!("{}/members", self.clan_url(tag))
    }

    /// Fetch clan metadata (`GET /v1/clans/{tag}`)
    #[instrument(skip(self, api_key))]
    pub async fn get_clan(&self, api_key: &str, tag: &str) -> Result<ClanDetails, UpstreamError> {
        let url = self.clan_url(tag);
        self.get_json(&url, api_key, CLAN_FALLBACK).await
    }

    /// Fetch the member roster (`GET /v1/clans/{tag}/members`)
    #[instrument(skip(self, api_key))]
    pub async fn get_clan_members(
        &self,
        api_key: &str,
        tag: &str,
    ) -> Result<MemberList, UpstreamError> {
        let url = self.members_url(tag);
        let list: MemberList = self.get_json(&url, api_key, MEMBERS_FALLBACK).await?;
        info!("Fetched {} members", list.items.len());
        Ok(list)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        api_key: &str,
        fallback: &str,
    ) -> Result<T, UpstreamError> {
        debug!("📡 GET {}", url);

        let resp = self
            .http
            .get(url)
            .bearer_auth(api_key)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| UpstreamError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            // A garbled error body must not mask the upstream status.
            let body: UpstreamErrorBody = resp.json().await.unwrap_or_default();
            let message = body
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| fallback.to_string());

            warn!("Upstream {} answered {}: {}", url, status, message);
            return Err(UpstreamError::Status { status, message });
        }

        resp.json().await.map_err(|source| UpstreamError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use reqwest::StatusCode;
    use serde_json::json;

    fn client_for(server: &MockServer) -> ClashClient {
        ClashClient::new(server.base_url(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn encodes_hash_only() {
        assert_eq!(encode_tag("#2PP"), "%232PP");
        assert_eq!(encode_tag("2PP"), "2PP");
        assert_eq!(encode_tag("#ABC-12_x"), "%23ABC-12_x");
    }

    #[test]
    fn builds_endpoint_urls() {
        let client = ClashClient::with_client(Client::new(), "https://api.example.com/");
        assert_eq!(
            client.clan_url("#2PP"),
            "https://api.example.com/v1/clans/%232PP"
        );
        assert_eq!(
            client.members_url("#2PP"),
            "https://api.example.com/v1/clans/%232PP/members"
        );
    }

    #[tokio::test]
    async fn sends_bearer_and_accept_headers() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(Method::GET)
                .path("/v1/clans/%232PP")
                .header("authorization", "Bearer test-key")
                .header("accept", "application/json");
            then.status(200).json_body(json!({
                "name": "Night Raiders",
                "tag": "#2PP",
                "clanLevel": 12,
                "members": 3
            }));
        });

        let clan = client_for(&server).get_clan("test-key", "#2PP").await.unwrap();

        assert_eq!(mock.calls(), 1);
        assert_eq!(clan.name.as_deref(), Some("Night Raiders"));
        assert_eq!(clan.clan_level, Some(12));
        assert_eq!(clan.members, Some(3));
    }

    #[tokio::test]
    async fn forwards_upstream_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(Method::GET).path("/v1/clans/%23NOPE");
            then.status(404)
                .json_body(json!({ "reason": "notFound", "message": "Clan not found" }));
        });

        let err = client_for(&server).get_clan("k", "#NOPE").await.unwrap_err();

        match err {
            UpstreamError::Status { status, message } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(message, "Clan not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unparseable_error_body_uses_fallback() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(Method::GET).path("/v1/clans/%232PP/members");
            then.status(503).body("<html>maintenance</html>");
        });

        let err = client_for(&server)
            .get_clan_members("k", "#2PP")
            .await
            .unwrap_err();

        match err {
            UpstreamError::Status { status, message } => {
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(message, MEMBERS_FALLBACK);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_success_body_is_decode_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(Method::GET).path("/v1/clans/%232PP/members");
            then.status(200).body("not json");
        });

        let err = client_for(&server)
            .get_clan_members("k", "#2PP")
            .await
            .unwrap_err();

        assert!(matches!(err, UpstreamError::Decode { .. }));
    }
}
