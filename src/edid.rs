//! Monitor identification
//!
//! The connector's `EDID` property holds the id of a blob with the monitor's
//! self description. The probe already has the connector's properties at
//! hand, so the blob id is taken from those and only the blob itself is
//! fetched from the device.

use std::io::{self, Cursor};

use drm::control::Device as ControlDevice;
use edid_rs::MonitorDescriptor;
use thiserror::Error;
use tracing::debug;

use crate::property::{PropertyKind, PropertyRead};

/// Name of the connector property carrying the EDID blob id
pub const EDID_PROPERTY: &str = "EDID";

/// Reasons the attached monitor could not be identified
#[derive(Debug, Error)]
pub enum EdidError {
    /// The connector has no `EDID` blob, or the blob id is unset
    #[error("connector exposes no EDID blob")]
    Missing,
    /// The driver refused to hand out the blob
    #[error("failed to read EDID blob {blob}")]
    Blob {
        /// Blob id
        blob: u64,
        /// Underlying device error
        #[source]
        source: io::Error,
    },
    /// The blob is not valid EDID
    #[error("failed to parse EDID: {0}")]
    Parse(String),
}

/// Information about a monitor, acquired from EDID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorInfo {
    /// Three letter PNP id of the manufacturer, e.g. `DEL`
    pub manufacturer: String,
    /// Monitor name, or the hex product code if the monitor does not name itself
    pub model: String,
}

impl MonitorInfo {
    /// Identify the monitor from already loaded connector properties
    pub fn from_properties(device: &impl ControlDevice, props: &[PropertyRead]) -> Result<MonitorInfo, EdidError> {
        let blob = edid_blob_id(props).ok_or(EdidError::Missing)?;
        let data = device
            .get_property_blob(blob)
            .map_err(|source| EdidError::Blob { blob, source })?;
        debug!(blob, len = data.len(), "Read EDID blob");

        let edid = edid_rs::parse(&mut Cursor::new(data)).map_err(|err| EdidError::Parse(format!("{:?}", err)))?;
        let id = edid.product.manufacturer_id;

        Ok(MonitorInfo {
            manufacturer: manufacturer_code([id.0, id.1, id.2]),
            model: model_name(&edid.descriptors.0, edid.product.product_code),
        })
    }
}

/// Blob id held by the `EDID` property, if it is present and set
pub fn edid_blob_id(props: &[PropertyRead]) -> Option<u64> {
    props.iter().find_map(|prop| match prop {
        PropertyRead::Read(entry)
            if entry.name == EDID_PROPERTY && entry.kind == PropertyKind::Blob && entry.value != 0 =>
        {
            Some(entry.value)
        }
        _ => None,
    })
}

fn manufacturer_code(code: [char; 3]) -> String {
    if code.iter().all(|c| c.is_ascii_uppercase()) {
        return code.iter().collect();
    }
    let mut out = String::new();
    for (i, c) in code.iter().enumerate() {
        if i > 0 {
            out.push('_');
        }
        out.push_str(&(*c as u32).to_string());
    }
    out
}

fn model_name(descriptors: &[MonitorDescriptor], product_code: u16) -> String {
    for desc in descriptors {
        if let MonitorDescriptor::MonitorName(name) = desc {
            let name = name.trim();
            if !name.is_empty() {
                return name.to_owned();
            }
        }
    }
    format!("{:04x}", product_code)
}
