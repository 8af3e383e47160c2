use std::time::Duration;

use draft_core::{ConversionRequest, ConversionResult};
use draft_logging::{draft_debug, draft_error, draft_info};
use serde::Deserialize;

use crate::{ConversionError, ConversionFailure};

pub const DEFAULT_RENDER_BASE_URL: &str = "https://www.md2wechat.cn";
pub const API_KEY_HEADER: &str = "X-API-Key";
const CONVERT_PATH: &str = "/api/convert";
/// Upper bound on upstream body text copied into error messages.
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub base_url: String,
    pub request_timeout: Duration,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_RENDER_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[async_trait::async_trait]
pub trait Renderer: Send + Sync {
    async fn convert(
        &self,
        request: &ConversionRequest,
        api_key: Option<&str>,
    ) -> Result<ConversionResult, ConversionError>;
}

#[derive(Debug, Deserialize)]
struct RenderEnvelope {
    code: i64,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: Option<ConversionResult>,
}

/// Rendering-service client. One attempt per call, bounded by the request
/// timeout.
#[derive(Debug, Clone)]
pub struct HttpRenderer {
    settings: RenderSettings,
}

impl HttpRenderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, ConversionError> {
        reqwest::Client::builder()
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| ConversionError::new(ConversionFailure::Transport, err.to_string()))
    }

    fn endpoint(&self) -> String {
        format!(
            "{}{CONVERT_PATH}",
            self.settings.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait::async_trait]
impl Renderer for HttpRenderer {
    async fn convert(
        &self,
        request: &ConversionRequest,
        api_key: Option<&str>,
    ) -> Result<ConversionResult, ConversionError> {
        draft_info!(
            "Rendering markdown theme={} font_size={} markdown_len={} authenticated={}",
            request.theme,
            request.font_size,
            request.markdown.len(),
            api_key.is_some()
        );
        let client = self.build_client()?;

        let mut builder = client.post(self.endpoint()).json(request);
        if let Some(key) = api_key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        let response = builder.send().await.map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        if !status.is_success() {
            draft_error!("Rendering service returned status {}", status);
            return Err(ConversionError::new(
                ConversionFailure::UpstreamStatus(status.as_u16()),
                clip(&body),
            ));
        }

        let envelope: RenderEnvelope = serde_json::from_str(&body).map_err(|err| {
            draft_error!("Rendering service body is not valid: {}", err);
            ConversionError::new(ConversionFailure::MalformedResponse, err.to_string())
        })?;

        if envelope.code != 0 {
            draft_error!(
                "Rendering service business error code={} msg={}",
                envelope.code,
                envelope.msg
            );
            return Err(ConversionError::new(
                ConversionFailure::UpstreamBusiness {
                    code: envelope.code,
                },
                envelope.msg,
            ));
        }

        let result = envelope.data.ok_or_else(|| {
            ConversionError::new(
                ConversionFailure::EmptyPayload,
                "rendering service returned no data",
            )
        })?;
        draft_debug!(
            "Rendered html_len={} word_count={} read_time={}",
            result.html.len(),
            result.word_count,
            result.estimated_read_time
        );
        Ok(result)
    }
}

fn transport_error(err: reqwest::Error) -> ConversionError {
    ConversionError::new(ConversionFailure::Transport, err.to_string())
}

fn clip(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY;
    while end > 0 && !body.is_char_boundary(end) {
        end -= 1;
    }
    body[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::{clip, HttpRenderer, RenderSettings, MAX_ERROR_BODY};

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let renderer = HttpRenderer::new(RenderSettings {
            base_url: "http://render.local/".into(),
            ..RenderSettings::default()
        });
        assert_eq!(renderer.endpoint(), "http://render.local/api/convert");
    }

    #[test]
    fn clip_respects_char_boundaries() {
        let body = "错".repeat(MAX_ERROR_BODY);
        let clipped = clip(&body);
        assert!(clipped.len() <= MAX_ERROR_BODY);
        assert!(clipped.chars().all(|c| c == '错'));
    }
}
