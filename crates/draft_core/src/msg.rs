use crate::model::{ConversionResult, Credentials, DraftRequest, DraftResult, UploadedAsset};
use crate::state::Stage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Caller input for a new run. Credentials are checked, never stored.
    Submitted {
        request: DraftRequest,
        credentials: Credentials,
    },
    /// Rendering service returned a payload.
    Converted(ConversionResult),
    /// Cover image is stored on the platform.
    CoverUploaded(UploadedAsset),
    /// Platform created the draft.
    DraftCreated(DraftResult),
    /// The remote call of `Stage` failed; the cause stays with the executor.
    StageFailed(Stage),
}
