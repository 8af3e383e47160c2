use std::path::PathBuf;

use draft_core::{PlatformCredentials, UploadedAsset};
use draft_logging::{draft_debug, draft_info, draft_warn};
use uuid::Uuid;

use crate::fetch::{storage_error, FetchSettings, ImageFetcher, ImageResponse};
use crate::platform::{PlatformClient, PlatformError, PlatformFailure, PlatformSettings};
use crate::scratch::{ensure_scratch_dir, ScratchFile};
use crate::{UploadError, UploadFailure};

#[async_trait::async_trait]
pub trait MediaUploader: Send + Sync {
    async fn upload_cover_image(
        &self,
        credentials: &PlatformCredentials,
        image_url: &str,
    ) -> Result<UploadedAsset, UploadError>;
}

/// Re-hosts a remote image as a persistent platform asset via a scratch file
/// that lives only as long as one upload call.
#[derive(Debug, Clone)]
pub struct PlatformMediaUploader {
    fetcher: ImageFetcher,
    platform: PlatformSettings,
    scratch_dir: PathBuf,
}

impl PlatformMediaUploader {
    pub fn new(fetch: FetchSettings, platform: PlatformSettings, scratch_dir: PathBuf) -> Self {
        Self {
            fetcher: ImageFetcher::new(fetch),
            platform,
            scratch_dir,
        }
    }

    async fn store_and_upload(
        &self,
        scratch: &ScratchFile,
        image: ImageResponse,
        mime: &str,
        credentials: &PlatformCredentials,
    ) -> Result<UploadedAsset, UploadError> {
        let mut writer = scratch.writer().map_err(storage_error)?;
        let byte_len = image.write_to(&mut writer).await?;
        drop(writer);
        draft_debug!("Stored {} bytes in {}", byte_len, scratch.path().display());

        let file = tokio::fs::File::open(scratch.path())
            .await
            .map_err(storage_error)?;
        let client = PlatformClient::new(&self.platform, credentials).map_err(rejected)?;
        client
            .add_image_material(file, scratch.file_name(), byte_len, mime)
            .await
            .map_err(rejected)
    }
}

#[async_trait::async_trait]
impl MediaUploader for PlatformMediaUploader {
    async fn upload_cover_image(
        &self,
        credentials: &PlatformCredentials,
        image_url: &str,
    ) -> Result<UploadedAsset, UploadError> {
        let upload_id = Uuid::new_v4().simple().to_string();
        draft_info!("Cover upload {} fetching {}", upload_id, image_url);

        let image = self.fetcher.open(image_url).await?;
        let extension = image_extension(image.content_type());

        ensure_scratch_dir(&self.scratch_dir).map_err(storage_error)?;
        let scratch =
            ScratchFile::create(&self.scratch_dir, &upload_id, extension).map_err(storage_error)?;

        let result = self
            .store_and_upload(&scratch, image, mime_for(extension), credentials)
            .await;

        match scratch.release() {
            Ok(path) => draft_debug!("Removed scratch file {}", path.display()),
            Err(err) => draft_warn!("Failed to remove scratch file for {}: {}", upload_id, err),
        }

        if let Ok(asset) = &result {
            draft_info!(
                "Cover upload {} stored as asset {} ({})",
                upload_id,
                asset.asset_id,
                asset.remote_url
            );
        }
        result
    }
}

fn rejected(err: PlatformError) -> UploadError {
    let kind = match err.kind {
        PlatformFailure::Transport => UploadFailure::Transport,
        ref other => UploadFailure::PlatformRejected { code: other.code() },
    };
    UploadError::new(kind, err.message)
}

/// File extension for the scratch copy; the platform classifies media by
/// file name.
fn image_extension(content_type: Option<&str>) -> &'static str {
    let essence = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase());
    match essence.as_deref() {
        Some("image/png") => "png",
        Some("image/gif") => "gif",
        Some("image/bmp") => "bmp",
        Some("image/webp") => "webp",
        _ => "jpg",
    }
}

fn mime_for(extension: &str) -> &'static str {
    match extension {
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::{image_extension, mime_for, rejected};
    use crate::platform::{PlatformError, PlatformFailure};
    use crate::UploadFailure;

    #[test]
    fn extension_follows_content_type() {
        assert_eq!(image_extension(Some("image/png")), "png");
        assert_eq!(image_extension(Some("IMAGE/GIF; charset=binary")), "gif");
        assert_eq!(image_extension(Some("image/jpeg")), "jpg");
        assert_eq!(image_extension(Some("application/octet-stream")), "jpg");
        assert_eq!(image_extension(None), "jpg");
    }

    #[test]
    fn mime_matches_extension() {
        assert_eq!(mime_for("png"), "image/png");
        assert_eq!(mime_for("jpg"), "image/jpeg");
    }

    #[test]
    fn platform_failures_map_to_upload_kinds() {
        let transport = rejected(PlatformError {
            kind: PlatformFailure::Transport,
            message: "refused".into(),
        });
        assert_eq!(transport.kind, UploadFailure::Transport);

        let rejected_err = rejected(PlatformError {
            kind: PlatformFailure::Rejected { code: 40007 },
            message: "invalid media_id".into(),
        });
        assert_eq!(
            rejected_err.kind,
            UploadFailure::PlatformRejected { code: Some(40007) }
        );
        assert_eq!(rejected_err.message, "invalid media_id");
    }
}
