use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use tokio::io::AsyncWriteExt;

use crate::{UploadError, UploadFailure};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Downloads cover images. Redirects follow the reqwest default policy.
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    settings: FetchSettings,
}

impl ImageFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, UploadError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| UploadError::new(UploadFailure::Transport, err.to_string()))
    }

    /// Issue the GET and check the status; the body is read later by
    /// [`ImageResponse::write_to`].
    pub async fn open(&self, url: &str) -> Result<ImageResponse, UploadError> {
        let client = self.build_client()?;
        let response = client.get(url).send().await.map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::new(
                UploadFailure::FetchFailed(status.as_u16()),
                format!("GET {url} returned {status}"),
            ));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        Ok(ImageResponse {
            response,
            content_type,
        })
    }
}

pub struct ImageResponse {
    response: reqwest::Response,
    content_type: Option<String>,
}

impl ImageResponse {
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Stream the body into `sink`, returning the number of bytes written.
    pub async fn write_to(self, sink: &mut tokio::fs::File) -> Result<u64, UploadError> {
        let mut written: u64 = 0;
        let mut stream = self.response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(transport_error)?;
            sink.write_all(&chunk).await.map_err(storage_error)?;
            written += chunk.len() as u64;
        }
        sink.flush().await.map_err(storage_error)?;
        sink.sync_all().await.map_err(storage_error)?;
        Ok(written)
    }
}

fn transport_error(err: reqwest::Error) -> UploadError {
    UploadError::new(UploadFailure::Transport, err.to_string())
}

pub(crate) fn storage_error(err: std::io::Error) -> UploadError {
    UploadError::new(UploadFailure::Storage, err.to_string())
}
