use std::{io, path::PathBuf};

/// Errors thrown while probing a drm device
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The device node could not be opened
    #[error("Failed to open drm device `{path:?}` ({source})")]
    Open {
        /// Path that was attempted
        path: PathBuf,
        /// Underlying io error
        #[source]
        source: io::Error,
    },
    /// The device encountered an access error
    #[error("DRM access error: {errmsg} on device `{dev:?}` ({source})")]
    Access {
        /// Error message associated to the access error
        errmsg: &'static str,
        /// Device on which the error was generated
        dev: Option<PathBuf>,
        /// Underlying device error
        #[source]
        source: io::Error,
    },
    /// None of the device's connectors reports a connected display
    #[error("no connector found")]
    NoConnectedConnector,
    /// A property write given on the command line could not be parsed
    #[error("Invalid property write `{0}`, expected `<name>=<unsigned value>`")]
    InvalidPropertyWrite(String),
    /// The report could not be written out
    #[error("Failed to write report")]
    Report(#[source] io::Error),
}
