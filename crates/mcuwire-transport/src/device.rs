use std::fs::OpenOptions;
use std::path::Path;

use tracing::info;

use crate::error::{Result, TransportError};
use crate::traits::LinkStream;

/// Open an existing device or FIFO path for reading and writing.
///
/// No line discipline or baud rate is applied here: the path must already be
/// configured (e.g. with `stty`) before the bridge attaches to it.
pub fn open_device(path: impl AsRef<Path>) -> Result<LinkStream> {
    let path = path.as_ref();
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|e| TransportError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;
    info!(?path, "opened device link");
    Ok(LinkStream::from_device(file))
}
