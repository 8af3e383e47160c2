//! Draft engine: remote collaborators and effect execution for the
//! publishing pipeline.
mod fetch;
mod pipeline;
mod platform;
mod publish;
mod render;
mod scratch;
mod types;
mod upload;

pub use fetch::{FetchSettings, ImageFetcher, ImageResponse};
pub use pipeline::{EngineSettings, Pipeline};
pub use platform::{
    DraftArticle, PlatformClient, PlatformError, PlatformFailure, PlatformSettings,
    DEFAULT_PLATFORM_BASE_URL,
};
pub use publish::{assemble_articles, DraftPublisher, PlatformDraftPublisher};
pub use render::{HttpRenderer, RenderSettings, Renderer, API_KEY_HEADER, DEFAULT_RENDER_BASE_URL};
pub use scratch::{ensure_scratch_dir, ScratchFile};
pub use types::{
    ConversionError, ConversionFailure, PipelineError, PublishError, PublishFailure, RunId,
    UploadError, UploadFailure,
};
pub use upload::{MediaUploader, PlatformMediaUploader};
