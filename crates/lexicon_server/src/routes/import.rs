//! `POST /api/import`: multipart CSV upload.

use crate::error::{Result, ServerError};
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::State;
use axum::Json;
use lexicon_core::{import_csv_cancellable, ImportCancellation, ImportOutcome, UploadedFile};
use log::{info, warn};
use std::sync::Arc;

/// Multipart field that carries the CSV file.
pub const FILE_FIELD: &str = "file";

/// Owned copy of the uploaded file part.
#[derive(Debug)]
struct FilePart {
    content_type: Option<String>,
    bytes: Bytes,
}

impl FilePart {
    fn as_upload(&self) -> UploadedFile<'_> {
        UploadedFile {
            content_type: self.content_type.as_deref(),
            bytes: &self.bytes,
        }
    }
}

pub async fn import_csv(
    State(state): State<Arc<AppState>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<ImportOutcome>> {
    // A request that is not multipart at all carries no file.
    let file = match multipart {
        Ok(mut multipart) => read_file_field(&mut multipart).await?,
        Err(rejection) => {
            warn!(
                "event=csv_upload module=server status=rejected reason=not_multipart detail={}",
                rejection.body_text()
            );
            None
        }
    };
    if let Some(file) = &file {
        info!(
            "event=csv_upload module=server status=ok bytes={} content_type={}",
            file.bytes.len(),
            file.content_type.as_deref().unwrap_or("none")
        );
    }

    let options = state.import_options();
    let timeout = state.config.import_timeout();
    let cancellation = ImportCancellation::new();
    let task_cancellation = cancellation.clone();
    let run = state.run_blocking(move |conn| {
        let upload = file.as_ref().map(FilePart::as_upload);
        Ok(import_csv_cancellable(conn, upload, options, &task_cancellation)?)
    });
    tokio::pin!(run);

    match tokio::time::timeout(timeout, &mut run).await {
        Ok(outcome) => Ok(Json(outcome?)),
        // The queued or running import rolls back at its next checkpoint.
        Err(_) if cancellation.cancel() => {
            warn!(
                "event=csv_import module=server status=timeout timeout_secs={}",
                timeout.as_secs()
            );
            Err(ServerError::ImportTimeout(timeout.as_secs()))
        }
        // Commit already started; report whatever it produced.
        Err(_) => {
            info!(
                "event=csv_import module=server status=commit_after_deadline timeout_secs={}",
                timeout.as_secs()
            );
            Ok(Json(run.await?))
        }
    }
}

/// Returns the first `file` field, skipping any other fields.
async fn read_file_field(multipart: &mut Multipart) -> Result<Option<FilePart>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;
        return Ok(Some(FilePart {
            content_type,
            bytes,
        }));
    }
    Ok(None)
}
