use std::fmt;

use crate::model::{Article, ConversionResult, UploadedAsset};
use crate::effect::Effect;

/// Pipeline stage a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Validation,
    Conversion,
    CoverUpload,
    Publish,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Validation => write!(f, "validation"),
            Stage::Conversion => write!(f, "conversion"),
            Stage::CoverUpload => write!(f, "cover upload"),
            Stage::Publish => write!(f, "publish"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Start,
    Converting,
    UploadingCover,
    Publishing,
    Done,
    Failed {
        stage: Stage,
    },
}

impl Phase {
    /// Stage whose remote call is in flight in this phase, if any.
    pub fn active_stage(self) -> Option<Stage> {
        match self {
            Phase::Converting => Some(Stage::Conversion),
            Phase::UploadingCover => Some(Stage::CoverUpload),
            Phase::Publishing => Some(Stage::Publish),
            Phase::Start | Phase::Done | Phase::Failed { .. } => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Done | Phase::Failed { .. })
    }
}

/// State of a single pipeline run. Holds no credentials.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunState {
    phase: Phase,
    markdown: String,
    cover_image_url: Option<String>,
    title: Option<String>,
    conversion: Option<ConversionResult>,
    cover: Option<UploadedAsset>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn conversion(&self) -> Option<&ConversionResult> {
        self.conversion.as_ref()
    }

    pub fn cover(&self) -> Option<&UploadedAsset> {
        self.cover.as_ref()
    }

    pub fn cover_image_url(&self) -> Option<&str> {
        self.cover_image_url.as_deref()
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub(crate) fn accept_request(&mut self, markdown: String, cover_image_url: Option<String>) {
        self.markdown = markdown;
        self.cover_image_url = cover_image_url;
    }

    pub(crate) fn markdown(&self) -> &str {
        &self.markdown
    }

    pub(crate) fn record_conversion(&mut self, title: String, conversion: ConversionResult) {
        self.title = Some(title);
        self.conversion = Some(conversion);
    }

    pub(crate) fn record_cover(&mut self, asset: UploadedAsset) {
        self.cover = Some(asset);
    }

    /// The single article of this run; author and digest are left for the
    /// publisher to resolve.
    pub(crate) fn create_draft_effect(&self) -> Option<Effect> {
        let conversion = self.conversion.as_ref()?;
        let title = self.title.clone()?;
        Some(Effect::CreateDraft {
            articles: vec![Article::new(conversion.html.clone()).with_title(title)],
            cover_asset_id: self.cover.as_ref().map(|asset| asset.asset_id.clone()),
        })
    }
}
