use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use draft_core::{update, Credentials, DraftRequest, Effect, Msg, PublishOutcome, RunState, Stage};
use draft_logging::{draft_debug, draft_error, draft_info, draft_warn};

use crate::fetch::FetchSettings;
use crate::platform::PlatformSettings;
use crate::publish::{DraftPublisher, PlatformDraftPublisher};
use crate::render::{HttpRenderer, RenderSettings, Renderer};
use crate::upload::{MediaUploader, PlatformMediaUploader};
use crate::{PipelineError, RunId};

#[derive(Debug, Clone, Default)]
pub struct EngineSettings {
    pub render: RenderSettings,
    pub platform: PlatformSettings,
    pub fetch: FetchSettings,
    /// Directory for cover scratch files; the OS temp dir when unset.
    pub scratch_dir: Option<PathBuf>,
}

/// Executes the effects of the core state machine against the remote
/// collaborators. Cheap to clone; every run is independent.
#[derive(Clone)]
pub struct Pipeline {
    renderer: Arc<dyn Renderer>,
    uploader: Arc<dyn MediaUploader>,
    publisher: Arc<dyn DraftPublisher>,
}

impl Pipeline {
    pub fn new(
        renderer: Arc<dyn Renderer>,
        uploader: Arc<dyn MediaUploader>,
        publisher: Arc<dyn DraftPublisher>,
    ) -> Self {
        Self {
            renderer,
            uploader,
            publisher,
        }
    }

    pub fn from_settings(settings: EngineSettings) -> Self {
        let scratch_dir = settings.scratch_dir.unwrap_or_else(std::env::temp_dir);
        Self::new(
            Arc::new(HttpRenderer::new(settings.render)),
            Arc::new(PlatformMediaUploader::new(
                settings.fetch,
                settings.platform.clone(),
                scratch_dir,
            )),
            Arc::new(PlatformDraftPublisher::new(settings.platform)),
        )
    }

    /// Run validation, conversion, optional cover upload and draft creation
    /// in order. Stops at the first failing stage.
    pub async fn run(
        &self,
        request: DraftRequest,
        credentials: Credentials,
    ) -> Result<PublishOutcome, PipelineError> {
        let run_id = RunId::new();
        draft_info!(
            "Run {} started app_id={} cover={}",
            run_id,
            credentials.platform.app_id,
            request.cover_image_url().is_some()
        );

        let mut state = RunState::default();
        let mut failure: Option<PipelineError> = None;
        let mut last_stage = Stage::Validation;
        let mut pending = VecDeque::from([Msg::Submitted {
            request,
            credentials: credentials.clone(),
        }]);

        while let Some(msg) = pending.pop_front() {
            let (next, effects) = update(state, msg);
            state = next;
            if effects.is_empty() {
                break;
            }

            for effect in effects {
                match effect {
                    Effect::Convert(conversion) => {
                        last_stage = Stage::Conversion;
                        let api_key = credentials.render_api_key.as_deref();
                        match self.renderer.convert(&conversion, api_key).await {
                            Ok(result) => {
                                draft_debug!(
                                    "Run {} converted words={} read_time={}",
                                    run_id,
                                    result.word_count,
                                    result.estimated_read_time
                                );
                                pending.push_back(Msg::Converted(result));
                            }
                            Err(err) => {
                                failure = Some(err.into());
                                pending.push_back(Msg::StageFailed(Stage::Conversion));
                            }
                        }
                    }
                    Effect::UploadCover { image_url } => {
                        last_stage = Stage::CoverUpload;
                        match self
                            .uploader
                            .upload_cover_image(&credentials.platform, &image_url)
                            .await
                        {
                            Ok(asset) => pending.push_back(Msg::CoverUploaded(asset)),
                            Err(err) => {
                                failure = Some(err.into());
                                pending.push_back(Msg::StageFailed(Stage::CoverUpload));
                            }
                        }
                    }
                    Effect::CreateDraft {
                        articles,
                        cover_asset_id,
                    } => {
                        last_stage = Stage::Publish;
                        match self
                            .publisher
                            .create_draft(&credentials.platform, articles, cover_asset_id)
                            .await
                        {
                            Ok(draft) => pending.push_back(Msg::DraftCreated(draft)),
                            Err(err) => {
                                failure = Some(err.into());
                                pending.push_back(Msg::StageFailed(Stage::Publish));
                            }
                        }
                    }
                    Effect::Complete(outcome) => {
                        draft_info!("Run {} finished media_id={}", run_id, outcome.media_id);
                        return Ok(outcome);
                    }
                    Effect::Reject(err) => {
                        draft_warn!("Run {} rejected: {}", run_id, err);
                        return Err(PipelineError::Validation(err));
                    }
                    Effect::Abort { stage } => {
                        let err = failure
                            .take()
                            .unwrap_or(PipelineError::Stalled { stage });
                        draft_error!("Run {} failed at {}: {}", run_id, stage, err);
                        return Err(err);
                    }
                }
            }
        }

        draft_error!("Run {} stalled after {} in {:?}", run_id, last_stage, state.phase());
        Err(PipelineError::Stalled { stage: last_stage })
    }
}
