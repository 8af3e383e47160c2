use std::fmt;
use std::time::Duration;

use draft_core::{PlatformCredentials, UploadedAsset};
use draft_logging::{draft_debug, draft_warn};
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;

pub const DEFAULT_PLATFORM_BASE_URL: &str = "https://api.weixin.qq.com";
const TOKEN_PATH: &str = "/cgi-bin/token";
const ADD_MATERIAL_PATH: &str = "/cgi-bin/material/add_material";
const ADD_DRAFT_PATH: &str = "/cgi-bin/draft/add";

#[derive(Debug, Clone)]
pub struct PlatformSettings {
    pub base_url: String,
    pub request_timeout: Duration,
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PLATFORM_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformFailure {
    Transport,
    Status(u16),
    Malformed,
    Rejected { code: i64 },
}

impl PlatformFailure {
    /// Business or HTTP code worth surfacing to callers, if any.
    pub fn code(&self) -> Option<i64> {
        match self {
            PlatformFailure::Status(status) => Some(i64::from(*status)),
            PlatformFailure::Rejected { code } => Some(*code),
            PlatformFailure::Transport | PlatformFailure::Malformed => None,
        }
    }
}

impl fmt::Display for PlatformFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformFailure::Transport => write!(f, "transport error"),
            PlatformFailure::Status(code) => write!(f, "http status {code}"),
            PlatformFailure::Malformed => write!(f, "malformed reply"),
            PlatformFailure::Rejected { code } => write!(f, "errcode {code}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct PlatformError {
    pub kind: PlatformFailure,
    pub message: String,
}

impl PlatformError {
    fn new(kind: PlatformFailure, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Article record in the shape the draft endpoint expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftArticle {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub digest: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb_media_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_cover_pic: Option<u8>,
}

#[derive(Debug, Serialize)]
struct DraftBody<'a> {
    articles: &'a [DraftArticle],
}

/// Error fields every platform reply may carry.
#[derive(Debug, Default, Deserialize)]
struct ReplyStatus {
    #[serde(default)]
    errcode: i64,
    #[serde(default)]
    errmsg: String,
}

#[derive(Debug, Deserialize)]
struct TokenReply {
    #[serde(flatten)]
    status: ReplyStatus,
    #[serde(default)]
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct MaterialReply {
    #[serde(flatten)]
    status: ReplyStatus,
    #[serde(default)]
    media_id: String,
    #[serde(default)]
    url: String,
}

#[derive(Debug, Deserialize)]
struct DraftReply {
    #[serde(flatten)]
    status: ReplyStatus,
    #[serde(default)]
    media_id: String,
}

/// Platform API client bound to one credential pair.
///
/// Built per call and dropped afterwards; access tokens are requested per
/// operation and never shared between clients.
pub struct PlatformClient {
    http: reqwest::Client,
    base_url: String,
    credentials: PlatformCredentials,
}

impl PlatformClient {
    pub fn new(
        settings: &PlatformSettings,
        credentials: &PlatformCredentials,
    ) -> Result<Self, PlatformError> {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| PlatformError::new(PlatformFailure::Transport, err.to_string()))?;
        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            credentials: credentials.clone(),
        })
    }

    fn url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, PlatformError> {
        Url::parse_with_params(&format!("{}{path}", self.base_url), params).map_err(|err| {
            PlatformError::new(
                PlatformFailure::Transport,
                format!("invalid platform url: {err}"),
            )
        })
    }

    pub async fn access_token(&self) -> Result<String, PlatformError> {
        let url = self.url(
            TOKEN_PATH,
            &[
                ("grant_type", "client_credential"),
                ("appid", self.credentials.app_id.as_str()),
                ("secret", self.credentials.app_secret.as_str()),
            ],
        )?;
        let response = self.http.get(url).send().await.map_err(transport_error)?;
        let reply: TokenReply = read_reply(response).await?;
        check(&reply.status)?;
        if reply.access_token.is_empty() {
            return Err(PlatformError::new(
                PlatformFailure::Malformed,
                "token reply without access_token",
            ));
        }
        draft_debug!("Obtained access token for app {}", self.credentials.app_id);
        Ok(reply.access_token)
    }

    /// Store an image as a persistent asset, streaming it from `file`.
    pub async fn add_image_material(
        &self,
        file: tokio::fs::File,
        file_name: &str,
        byte_len: u64,
        mime: &str,
    ) -> Result<UploadedAsset, PlatformError> {
        let token = self.access_token().await?;
        let url = self.url(
            ADD_MATERIAL_PATH,
            &[("access_token", token.as_str()), ("type", "image")],
        )?;

        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
        let part = Part::stream_with_length(body, byte_len)
            .file_name(file_name.to_string())
            .mime_str(mime)
            .map_err(|err| PlatformError::new(PlatformFailure::Malformed, err.to_string()))?;
        let form = Form::new().part("media", part);

        let response = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;
        let reply: MaterialReply = read_reply(response).await?;
        check(&reply.status)?;
        if reply.media_id.is_empty() {
            return Err(PlatformError::new(
                PlatformFailure::Malformed,
                "material reply without media_id",
            ));
        }
        Ok(UploadedAsset {
            asset_id: reply.media_id,
            remote_url: reply.url,
        })
    }

    /// Create a draft and return the platform-assigned draft id.
    pub async fn add_draft(&self, articles: &[DraftArticle]) -> Result<String, PlatformError> {
        let token = self.access_token().await?;
        let url = self.url(ADD_DRAFT_PATH, &[("access_token", token.as_str())])?;

        let response = self
            .http
            .post(url)
            .json(&DraftBody { articles })
            .send()
            .await
            .map_err(transport_error)?;
        let reply: DraftReply = read_reply(response).await?;
        check(&reply.status)?;
        if reply.media_id.is_empty() {
            return Err(PlatformError::new(
                PlatformFailure::Malformed,
                "draft reply without media_id",
            ));
        }
        Ok(reply.media_id)
    }
}

async fn read_reply<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, PlatformError> {
    let status = response.status();
    let body = response.text().await.map_err(transport_error)?;
    if !status.is_success() {
        return Err(PlatformError::new(
            PlatformFailure::Status(status.as_u16()),
            status.to_string(),
        ));
    }
    serde_json::from_str(&body)
        .map_err(|err| PlatformError::new(PlatformFailure::Malformed, err.to_string()))
}

fn check(status: &ReplyStatus) -> Result<(), PlatformError> {
    if status.errcode == 0 {
        return Ok(());
    }
    draft_warn!(
        "Platform rejected request errcode={} errmsg={}",
        status.errcode,
        status.errmsg
    );
    Err(PlatformError::new(
        PlatformFailure::Rejected {
            code: status.errcode,
        },
        status.errmsg.clone(),
    ))
}

fn transport_error(err: reqwest::Error) -> PlatformError {
    PlatformError::new(PlatformFailure::Transport, err.without_url().to_string())
}
