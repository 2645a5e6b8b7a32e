use std::{
  io::ErrorKind,
  path::{Path, PathBuf},
};

use tempfile::{PathPersistError, TempPath};
use tokio::{
  fs::File,
  io::{AsyncWriteExt, BufWriter},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::{ApiClient, ApiError, RequestSpec};

/// Size of the write buffer used while streaming a response to disk.
pub const COPY_BUFFER_SIZE: usize = 64 * 1024;

impl ApiClient {
  /// Streams a successful response body into `destination`, returning the
  /// number of bytes written.
  ///
  /// The body is written to a temporary file next to `destination` and
  /// renamed over it only once the transfer completes, so a failed or
  /// cancelled download never touches an existing file and leaves nothing
  /// behind. With `overwrite == false` an existing destination fails with
  /// [`ApiError::Conflict`] before any request is sent.
  ///
  /// The client timeout bounds each read of the body rather than the whole
  /// transfer.
  ///
  /// # Errors
  ///
  /// Returns [`ApiError::Status`] for a non-success status and
  /// [`ApiError::Io`] for filesystem failures.
  pub async fn download(
    &self,
    spec: RequestSpec,
    destination: impl AsRef<Path>,
    overwrite: bool,
    cancel: Option<&CancellationToken>,
  ) -> Result<u64, ApiError> {
    let destination = destination.as_ref();
    let fallback = CancellationToken::new();
    let cancel = cancel.unwrap_or(&fallback);

    if !overwrite && tokio::fs::try_exists(destination).await? {
      return Err(ApiError::Conflict {
        path: destination.to_path_buf(),
      });
    }

    let response = self.send_checked(spec, cancel).await?;
    let (file, staging) = staging_file(destination)?;

    let written = match self.copy_body(response, file, cancel).await {
      Ok(written) => written,
      Err(err) => {
        discard(staging);
        return Err(err);
      }
    };

    let persisted = if overwrite {
      staging.persist(destination)
    } else {
      staging.persist_noclobber(destination)
    };
    persisted.map_err(|err| persist_failure(err, destination))?;

    debug!(path = %destination.display(), bytes = written, "download complete");
    Ok(written)
  }

  async fn copy_body(
    &self,
    mut response: reqwest::Response,
    file: File,
    cancel: &CancellationToken,
  ) -> Result<u64, ApiError> {
    let mut writer = BufWriter::with_capacity(COPY_BUFFER_SIZE, file);
    let mut written = 0_u64;

    while let Some(chunk) = self
      .race(cancel, async { response.chunk().await.map_err(ApiError::from) })
      .await?
    {
      writer.write_all(&chunk).await?;
      written += chunk.len() as u64;
      trace!(bytes = written, "download progress");
    }

    writer.flush().await?;
    writer.into_inner().sync_all().await?;
    Ok(written)
  }
}

/// Creates a hidden `.part` file in the destination's directory.
fn staging_file(destination: &Path) -> Result<(File, TempPath), ApiError> {
  let directory = match destination.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
    _ => PathBuf::from("."),
  };
  let stem = destination
    .file_name()
    .map(|name| name.to_string_lossy().into_owned())
    .ok_or_else(|| ApiError::invalid_request(format!("destination `{}` has no file name", destination.display())))?;

  let staging = tempfile::Builder::new()
    .prefix(&format!(".{stem}."))
    .suffix(".part")
    .tempfile_in(&directory)?;
  let (file, path) = staging.into_parts();
  trace!(path = %path.display(), "staging download");
  Ok((File::from_std(file), path))
}

fn discard(staging: TempPath) {
  let path = staging.to_path_buf();
  if let Err(cleanup) = staging.close() {
    warn!(path = %path.display(), error = %cleanup, "failed to remove partial download");
  }
}

fn persist_failure(err: PathPersistError, destination: &Path) -> ApiError {
  let PathPersistError { error, path } = err;
  discard(path);
  match error.kind() {
    ErrorKind::AlreadyExists => ApiError::Conflict {
      path: destination.to_path_buf(),
    },
    _ => ApiError::Io(error),
  }
}
