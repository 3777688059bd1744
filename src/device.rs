//! Opening drm device nodes

use std::{
    fs::{File, OpenOptions},
    os::unix::io::{AsFd, BorrowedFd},
    path::{Path, PathBuf},
};

use drm::{control::Device as ControlDevice, Device as BasicDevice};
use tracing::{error, info, warn};

use crate::error::Error;

/// An open drm device node
///
/// Holds the drm master lock for as long as it is alive, if the kernel
/// granted it. The lock is released and the node closed on drop.
#[derive(Debug)]
pub struct ProbeDevice {
    file: File,
    path: PathBuf,
    privileged: bool,
}

impl ProbeDevice {
    /// Open the drm node at `path` for reading and writing.
    ///
    /// Failing to become drm master is not an error, but property writes
    /// will most likely be rejected by the kernel in that case.
    pub fn open(path: impl AsRef<Path>) -> Result<ProbeDevice, Error> {
        let path = path.as_ref().to_path_buf();
        // std sets O_CLOEXEC on every file it opens
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|source| Error::Open {
                path: path.clone(),
                source,
            })?;

        let mut dev = ProbeDevice {
            file,
            path,
            privileged: false,
        };
        info!(device = ?dev.path, "Opened drm device");

        // Newer kernels grant modesetting rights to the first opener anyway,
        // so this only matters when another client already holds master.
        if dev.acquire_master_lock().is_err() {
            warn!("Unable to become drm master, assuming unprivileged mode");
        } else {
            dev.privileged = true;
        }

        Ok(dev)
    }

    /// Returns whether this device holds the drm master lock
    pub fn is_privileged(&self) -> bool {
        self.privileged
    }

    /// Path to report in access errors
    pub(crate) fn dev_path(&self) -> Option<PathBuf> {
        Some(self.path.clone())
    }
}

impl Drop for ProbeDevice {
    fn drop(&mut self) {
        info!("Dropping device: {:?}", self.path);
        if self.privileged {
            if let Err(err) = self.release_master_lock() {
                error!("Failed to drop drm master state. Error: {}", err);
            }
        }
    }
}

impl AsFd for ProbeDevice {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.file.as_fd()
    }
}
impl BasicDevice for ProbeDevice {}
impl ControlDevice for ProbeDevice {}
