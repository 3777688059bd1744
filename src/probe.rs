//! End-to-end probe of a drm device

use std::io::Write;

use tracing::{debug, info, info_span};

use crate::{
    config::ProbeConfig,
    connector::{connector_name, find_first_connected, ModeSummary},
    device::ProbeDevice,
    edid::MonitorInfo,
    error::Error,
    property::{load_properties, set_property_by_name},
    report::{property_failure_line, write_line, ConnectorReport},
};

/// Run a full probe as described by `config`, writing the report to `out`.
///
/// Opens the device, picks the first connected connector, applies the
/// configured property writes to it and reports its modes and properties.
/// The device is closed again before this returns.
pub fn run(config: &ProbeConfig, out: &mut impl Write) -> Result<ConnectorReport, Error> {
    let device = ProbeDevice::open(&config.device)?;
    let conn = find_first_connected(&device)?;
    let conn_id: u32 = conn.handle().into();

    let _span = info_span!("connector", id = conn_id).entered();

    let modes: Vec<ModeSummary> = conn.modes().iter().map(ModeSummary::from).collect();
    match modes.first() {
        Some(mode) => info!("Selected mode {} {}Hz", mode.name, mode.refresh),
        None => info!("Connector has no valid mode"),
    }

    if !config.writes.is_empty() && !device.is_privileged() {
        debug!("Not drm master, property writes may be rejected");
    }
    for write in &config.writes {
        let result = set_property_by_name(&device, conn.handle(), &write.name, write.value)?;
        for (prop_id, err) in &result.unreadable {
            writeln!(out, "{}", property_failure_line(conn_id, *prop_id, err)).map_err(Error::Report)?;
        }
        for outcome in &result.outcomes {
            writeln!(out, "{}", write_line(write, conn_id, outcome)).map_err(Error::Report)?;
        }
    }

    // re-read after the writes so the report shows what the driver accepted
    let properties = load_properties(&device, conn.handle())?;
    let monitor = match MonitorInfo::from_properties(&device, &properties) {
        Ok(monitor) => Some(monitor),
        Err(err) => {
            debug!("Monitor not identified: {}", err);
            None
        }
    };

    let report = ConnectorReport {
        id: conn_id,
        name: connector_name(&conn),
        monitor,
        modes,
        properties,
    };
    write!(out, "{}", report).map_err(Error::Report)?;
    out.flush().map_err(Error::Report)?;

    Ok(report)
}
