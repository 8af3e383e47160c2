use draft_core::{
    extract_title_from_html, generate_digest, Article, DraftResult, PlatformCredentials,
};
use draft_logging::{draft_debug, draft_info};

use crate::platform::{DraftArticle, PlatformClient, PlatformError, PlatformFailure, PlatformSettings};
use crate::{PublishError, PublishFailure};

#[async_trait::async_trait]
pub trait DraftPublisher: Send + Sync {
    async fn create_draft(
        &self,
        credentials: &PlatformCredentials,
        articles: Vec<Article>,
        cover_asset_id: Option<String>,
    ) -> Result<DraftResult, PublishError>;
}

#[derive(Debug, Clone, Default)]
pub struct PlatformDraftPublisher {
    platform: PlatformSettings,
}

impl PlatformDraftPublisher {
    pub fn new(platform: PlatformSettings) -> Self {
        Self { platform }
    }
}

#[async_trait::async_trait]
impl DraftPublisher for PlatformDraftPublisher {
    async fn create_draft(
        &self,
        credentials: &PlatformCredentials,
        articles: Vec<Article>,
        cover_asset_id: Option<String>,
    ) -> Result<DraftResult, PublishError> {
        let records = assemble_articles(articles, cover_asset_id.as_deref());
        for (index, record) in records.iter().enumerate() {
            draft_debug!(
                "Draft article {} title={:?} content_len={} thumb={:?}",
                index,
                record.title,
                record.content.len(),
                record.thumb_media_id
            );
        }

        let client = PlatformClient::new(&self.platform, credentials).map_err(rejected)?;
        let media_id = client.add_draft(&records).await.map_err(rejected)?;
        draft_info!("Draft created media_id={}", media_id);
        Ok(DraftResult { media_id })
    }
}

/// Resolve each article into the record the platform stores:
/// - missing title → derived from the rendered body
/// - missing digest → generated from the rendered body
/// - an uploaded cover wins over the article's own asset reference.
pub fn assemble_articles(articles: Vec<Article>, cover_asset_id: Option<&str>) -> Vec<DraftArticle> {
    articles
        .into_iter()
        .map(|article| {
            let title = non_blank(article.title)
                .unwrap_or_else(|| extract_title_from_html(&article.body));
            let digest = non_blank(article.digest).unwrap_or_else(|| generate_digest(&article.body));
            let thumb_media_id = cover_asset_id
                .map(ToOwned::to_owned)
                .or_else(|| non_blank(article.cover_asset_id));
            DraftArticle {
                title,
                author: non_blank(article.author),
                digest,
                content: article.body,
                content_source_url: non_blank(article.source_url),
                thumb_media_id,
                show_cover_pic: article.show_cover,
            }
        })
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn rejected(err: PlatformError) -> PublishError {
    let kind = match err.kind {
        PlatformFailure::Transport => PublishFailure::Transport,
        ref other => PublishFailure::PlatformRejected { code: other.code() },
    };
    PublishError::new(kind, err.message)
}
