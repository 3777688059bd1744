//! Connector selection and mode summaries

use std::{fmt, io};

use drm::control::{connector, Device as ControlDevice, Mode, ModeTypeFlags};
use tracing::{debug, info, warn};

use crate::{device::ProbeDevice, error::Error};

/// Printable summary of a display mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeSummary {
    /// Mode name, usually `<width>x<height>`
    pub name: String,
    /// Vertical refresh rate in Hz
    pub refresh: u32,
    /// Horizontal resolution
    pub width: u16,
    /// Vertical resolution
    pub height: u16,
    /// Pixel clock in kHz
    pub clock: u32,
    /// Whether the driver marks this mode as preferred
    pub preferred: bool,
}

impl From<&Mode> for ModeSummary {
    fn from(mode: &Mode) -> Self {
        let (width, height) = mode.size();
        ModeSummary {
            name: mode.name().to_string_lossy().into_owned(),
            refresh: mode.vrefresh(),
            width,
            height,
            clock: mode.clock(),
            preferred: mode.mode_type().contains(ModeTypeFlags::PREFERRED),
        }
    }
}

/// Name of a connector as userspace usually spells it, e.g. `HDMI-A-1`
pub fn connector_name(info: &connector::Info) -> String {
    format_connector_name(info.interface().as_str(), info.interface_id())
}

pub(crate) fn format_connector_name(interface: &str, interface_id: u32) -> String {
    format!("{}-{}", interface, interface_id)
}

/// Find the first connector of `dev` that has a display attached.
///
/// Connectors are probed in the order the driver lists them. Connectors whose
/// info cannot be read are skipped.
pub fn find_first_connected(dev: &ProbeDevice) -> Result<connector::Info, Error> {
    let res_handles = dev.resource_handles().map_err(|source| Error::Access {
        errmsg: "Error loading resource handles",
        dev: dev.dev_path(),
        source,
    })?;

    let infos = res_handles
        .connectors()
        .iter()
        .map(|&conn| (conn, dev.get_connector(conn, true)));

    let info = first_connected(infos, |info| {
        debug!(connector = ?info.handle(), "{} is {:?}", connector_name(info), info.state());
        info.state() == connector::State::Connected
    })
    .ok_or(Error::NoConnectedConnector)?;

    info!("Connected: {}", connector_name(&info));
    Ok(info)
}

/// First item `is_connected` accepts, skipping (and logging) items that failed to load.
///
/// Stops pulling from `infos` as soon as a match is found.
pub(crate) fn first_connected<H: fmt::Debug, T>(
    infos: impl IntoIterator<Item = (H, io::Result<T>)>,
    is_connected: impl Fn(&T) -> bool,
) -> Option<T> {
    for (handle, info) in infos {
        match info {
            Ok(info) if is_connected(&info) => return Some(info),
            Ok(_) => {}
            Err(err) => warn!(connector = ?handle, "Failed to get connector info: {}", err),
        }
    }
    None
}
