use crate::model::{Article, ConversionRequest, PublishOutcome};
use crate::state::Stage;
use crate::validate::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Convert(ConversionRequest),
    UploadCover {
        image_url: String,
    },
    CreateDraft {
        articles: Vec<Article>,
        cover_asset_id: Option<String>,
    },
    /// Terminal: the run succeeded.
    Complete(PublishOutcome),
    /// Terminal: input was rejected before any remote call.
    Reject(ValidationError),
    /// Terminal: a remote stage failed.
    Abort { stage: Stage },
}

impl Effect {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Effect::Complete(_) | Effect::Reject(_) | Effect::Abort { .. }
        )
    }
}
