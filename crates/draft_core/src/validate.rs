use std::fmt;

use url::Url;

use crate::model::{Credentials, DraftRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialField {
    AppId,
    AppSecret,
}

impl fmt::Display for CredentialField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialField::AppId => write!(f, "platform app id"),
            CredentialField::AppSecret => write!(f, "platform app secret"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("field `{0}` is required")]
    MissingField(&'static str),
    #[error("missing {0}")]
    MissingCredential(CredentialField),
    #[error("cover image url `{url}` is not an absolute http(s) url")]
    InvalidCoverUrl { url: String },
}

/// Check required input before any remote call is made.
pub fn validate(request: &DraftRequest, credentials: &Credentials) -> Result<(), ValidationError> {
    let required = [
        ("markdown", &request.markdown),
        ("theme", &request.theme),
        ("fontSize", &request.font_size),
    ];
    if let Some((name, _)) = required
        .iter()
        .find(|(_, value)| value.trim().is_empty())
    {
        return Err(ValidationError::MissingField(*name));
    }

    if credentials.platform.app_id.trim().is_empty() {
        return Err(ValidationError::MissingCredential(CredentialField::AppId));
    }
    if credentials.platform.app_secret.trim().is_empty() {
        return Err(ValidationError::MissingCredential(CredentialField::AppSecret));
    }

    if let Some(url) = request.cover_image_url() {
        let is_http = Url::parse(url)
            .map(|parsed| matches!(parsed.scheme(), "http" | "https") && parsed.has_host())
            .unwrap_or(false);
        if !is_http {
            return Err(ValidationError::InvalidCoverUrl {
                url: url.to_string(),
            });
        }
    }

    Ok(())
}
