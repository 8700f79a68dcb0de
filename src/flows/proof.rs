use std::future::Future;

use crate::api::{ApiClient, ApiError, FilePart};
use crate::services::mabar;

pub const MAX_PROOF_BYTES: usize = 2 * 1024 * 1024;
const ACCEPTED_TYPES: [&str; 3] = ["image/jpeg", "image/jpg", "image/png"];

#[derive(Debug, Clone, PartialEq)]
pub struct ProofFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProofRejected {
    #[error("Pilih file bukti pembayaran terlebih dahulu.")]
    Missing,

    #[error("Format file harus JPG atau PNG.")]
    UnsupportedType(String),

    #[error("Ukuran file maksimal 2 MB.")]
    TooLarge(usize),
}

pub fn validate_proof(file: &ProofFile) -> Result<(), ProofRejected> {
    if file.bytes.is_empty() {
        return Err(ProofRejected::Missing);
    }
    let content_type = file.content_type.trim().to_ascii_lowercase();
    if !ACCEPTED_TYPES.contains(&content_type.as_str()) {
        return Err(ProofRejected::UnsupportedType(file.content_type.clone()));
    }
    if file.bytes.len() > MAX_PROOF_BYTES {
        return Err(ProofRejected::TooLarge(file.bytes.len()));
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum ProofUploadError {
    #[error(transparent)]
    Rejected(#[from] ProofRejected),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Upload dialog for one participant's payment proof.
#[derive(Debug, Clone)]
pub struct ProofUploadModal {
    pub session_id: i64,
    pub participant_id: i64,
    pub open: bool,
}

impl ProofUploadModal {
    pub fn new(session_id: i64, participant_id: i64) -> Self {
        Self {
            session_id,
            participant_id,
            open: true,
        }
    }

    /// Invalid files never leave the process.
    pub async fn submit<F, Fut>(
        &mut self,
        api: &ApiClient,
        file: Option<ProofFile>,
        on_uploaded: F,
    ) -> Result<(), ProofUploadError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ()>,
    {
        let file = file.ok_or(ProofRejected::Missing)?;
        validate_proof(&file)?;

        let part = FilePart {
            field: "payment_proof".to_string(),
            file_name: file.file_name,
            content_type: file.content_type,
            bytes: file.bytes,
        };
        mabar::upload_proof(api, self.session_id, self.participant_id, part).await?;
        tracing::info!(
            session_id = self.session_id,
            participant_id = self.participant_id,
            "payment proof uploaded"
        );

        on_uploaded().await;
        self.open = false;
        Ok(())
    }
}
