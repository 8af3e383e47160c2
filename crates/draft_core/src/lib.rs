//! md2draft core: data model, validation, content extraction and the pure
//! pipeline state machine. Nothing in this crate performs IO.
mod effect;
mod extract;
mod model;
mod msg;
mod state;
mod update;
mod validate;

pub use effect::Effect;
pub use extract::{
    extract_title, extract_title_from_html, generate_digest, ELLIPSIS, MAX_DIGEST_CHARS,
    MAX_TITLE_CHARS, UNTITLED,
};
pub use model::{
    Article, ConversionRequest, ConversionResult, Credentials, DraftRequest, DraftResult,
    PlatformCredentials, PublishOutcome, UploadedAsset,
};
pub use msg::Msg;
pub use state::{Phase, RunState, Stage};
pub use update::update;
pub use validate::{validate, CredentialField, ValidationError};
