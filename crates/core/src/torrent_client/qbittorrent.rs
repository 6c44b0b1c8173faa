//! qBittorrent legacy Web UI client.
//!
//! Older qBittorrent releases expose `POST /command/download` with a
//! `urls` form field, protected by HTTP digest authentication.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Response, StatusCode, Url};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::RemoteSettings;

use super::digest::DigestChallenge;
use super::{TorrentClient, TorrentClientError};

/// qBittorrent client implementation.
pub struct QBittorrentClient {
    client: Client,
    settings: RemoteSettings,
    url: Url,
    /// Last digest challenge (reused until the server sends a new one).
    challenge: Arc<RwLock<Option<DigestChallenge>>>,
    nonce_count: AtomicU32,
}

impl QBittorrentClient {
    /// Create a new qBittorrent client.
    pub fn new(settings: RemoteSettings, timeout_secs: u32) -> Result<Self, TorrentClientError> {
        let url = Url::parse(&settings.download_url)
            .map_err(|e| TorrentClientError::InvalidUrl(format!("{}: {}", settings.download_url, e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs as u64))
            .build()
            .map_err(|e| TorrentClientError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            settings,
            url,
            challenge: Arc::new(RwLock::new(None)),
            nonce_count: AtomicU32::new(0),
        })
    }

    /// Request URI as it appears in the digest (`/command/download`).
    fn digest_uri(&self) -> String {
        match self.url.query() {
            Some(query) => format!("{}?{}", self.url.path(), query),
            None => self.url.path().to_string(),
        }
    }

    fn authorization(&self, challenge: &DigestChallenge) -> String {
        let nc = self.nonce_count.fetch_add(1, Ordering::SeqCst) + 1;
        let cnonce = uuid::Uuid::new_v4().simple().to_string();
        challenge.authorization(
            &self.settings.username,
            &self.settings.password,
            "POST",
            &self.digest_uri(),
            nc,
            &cnonce,
        )
    }

    async fn post_form(
        &self,
        params: &[(&str, &str)],
        authorization: Option<String>,
    ) -> Result<Response, TorrentClientError> {
        let mut request = self.client.post(self.url.clone()).form(params);
        if let Some(value) = authorization {
            request = request.header(header::AUTHORIZATION, value);
        }
        Ok(request.send().await?)
    }

    /// Store the challenge carried by a 401 response.
    async fn refresh_challenge(&self, response: &Response) -> Result<DigestChallenge, TorrentClientError> {
        let challenge = response
            .headers()
            .get_all(header::WWW_AUTHENTICATE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(DigestChallenge::parse)
            .ok_or_else(|| {
                TorrentClientError::AuthenticationFailed(
                    "server did not offer an MD5 digest challenge".to_string(),
                )
            })?;

        self.nonce_count.store(0, Ordering::SeqCst);
        *self.challenge.write().await = Some(challenge.clone());
        Ok(challenge)
    }

    /// Authenticated form POST. Reuses the cached challenge and answers a
    /// fresh one once if the server asks for it.
    async fn authenticated_post(&self, params: &[(&str, &str)]) -> Result<(), TorrentClientError> {
        let cached = self.challenge.read().await.clone();
        let response = self
            .post_form(params, cached.as_ref().map(|c| self.authorization(c)))
            .await?;

        let response = if response.status() == StatusCode::UNAUTHORIZED {
            if cached.is_some() {
                warn!("qBittorrent digest nonce expired, re-authenticating");
            }
            let challenge = self.refresh_challenge(&response).await?;
            let retried = self
                .post_form(params, Some(self.authorization(&challenge)))
                .await?;
            if retried.status() == StatusCode::UNAUTHORIZED {
                return Err(TorrentClientError::AuthenticationFailed(
                    "Invalid credentials".to_string(),
                ));
            }
            retried
        } else {
            response
        };

        let status = response.status();
        if !status.is_success() {
            return Err(TorrentClientError::Rejected {
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl TorrentClient for QBittorrentClient {
    fn name(&self) -> &str {
        "qbittorrent"
    }

    async fn add_magnet(&self, uri: &str) -> Result<(), TorrentClientError> {
        self.authenticated_post(&[("urls", uri)]).await?;
        debug!(hash = ?extract_hash_from_magnet(uri), "Magnet pushed to qBittorrent");
        Ok(())
    }
}

/// Extract info hash from a magnet URI.
fn extract_hash_from_magnet(magnet: &str) -> Option<String> {
    let (_, query) = magnet.split_once('?')?;

    query
        .split('&')
        .find_map(|param| param.strip_prefix("xt=urn:btih:"))
        .map(|hash| hash.to_lowercase())
}
