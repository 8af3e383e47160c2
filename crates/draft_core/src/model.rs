use std::fmt;

use serde::{Deserialize, Serialize};

/// Inbound request: one Markdown document plus rendering preferences.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DraftRequest {
    pub markdown: String,
    pub theme: String,
    pub font_size: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
}

impl DraftRequest {
    pub fn new(
        markdown: impl Into<String>,
        theme: impl Into<String>,
        font_size: impl Into<String>,
    ) -> Self {
        Self {
            markdown: markdown.into(),
            theme: theme.into(),
            font_size: font_size.into(),
            cover_image_url: None,
        }
    }

    pub fn with_cover_image(mut self, url: impl Into<String>) -> Self {
        self.cover_image_url = Some(url.into());
        self
    }

    /// The cover URL, ignoring blank values.
    pub fn cover_image_url(&self) -> Option<&str> {
        self.cover_image_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn conversion_request(&self) -> ConversionRequest {
        ConversionRequest {
            markdown: self.markdown.clone(),
            theme: self.theme.clone(),
            font_size: self.font_size.clone(),
        }
    }
}

/// Body sent to the rendering service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRequest {
    pub markdown: String,
    pub theme: String,
    pub font_size: String,
}

/// Rendered output exactly as the rendering service reported it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub html: String,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub font_size: String,
    #[serde(default)]
    pub word_count: u32,
    #[serde(default, rename = "estimatedReadTime")]
    pub estimated_read_time: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    pub asset_id: String,
    pub remote_url: String,
}

/// Article handed to the draft publisher. Missing title and digest are
/// derived from `body` at publish time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Article {
    pub title: Option<String>,
    pub author: Option<String>,
    pub digest: Option<String>,
    pub body: String,
    pub source_url: Option<String>,
    pub cover_asset_id: Option<String>,
    pub show_cover: Option<u8>,
}

impl Article {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftResult {
    pub media_id: String,
}

/// Unified success payload of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishOutcome {
    #[serde(rename = "media_id")]
    pub media_id: String,
    pub html: String,
    pub theme: String,
    pub font_size: String,
    pub word_count: u32,
    #[serde(rename = "estimatedReadTime")]
    pub estimated_read_time: u32,
}

impl PublishOutcome {
    pub fn new(draft: DraftResult, conversion: &ConversionResult) -> Self {
        Self {
            media_id: draft.media_id,
            html: conversion.html.clone(),
            theme: conversion.theme.clone(),
            font_size: conversion.font_size.clone(),
            word_count: conversion.word_count,
            estimated_read_time: conversion.estimated_read_time,
        }
    }
}

/// App credentials for the publishing platform, bound per call.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct PlatformCredentials {
    pub app_id: String,
    pub app_secret: String,
}

impl PlatformCredentials {
    pub fn new(app_id: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_secret: app_secret.into(),
        }
    }
}

impl fmt::Debug for PlatformCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformCredentials")
            .field("app_id", &self.app_id)
            .field("app_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq, Default)]
pub struct Credentials {
    pub platform: PlatformCredentials,
    pub render_api_key: Option<String>,
}

impl Credentials {
    pub fn new(platform: PlatformCredentials, render_api_key: Option<String>) -> Self {
        Self {
            platform,
            render_api_key: render_api_key.filter(|key| !key.trim().is_empty()),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("platform", &self.platform)
            .field(
                "render_api_key",
                &self.render_api_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}
