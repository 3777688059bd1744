//! Connector properties
//!
//! Properties are read from the device once and copied into [`PropertyEntry`]
//! snapshots, so the lookups here work without a device at hand.

use std::{ffi::CString, io};

use drm::control::{connector, property, Device as ControlDevice};
use tracing::{debug, trace, warn};

use crate::{device::ProbeDevice, error::Error};

/// One allowed value of an enumerated property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumEntry {
    /// Raw value
    pub value: u64,
    /// Human readable label
    pub name: String,
}

impl EnumEntry {
    /// Create a new enum entry
    pub fn new(value: u64, name: impl Into<String>) -> Self {
        EnumEntry {
            value,
            name: name.into(),
        }
    }
}

/// Value type of a property
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyKind {
    /// Restricted to a named set of values
    Enum(Vec<EnumEntry>),
    /// Unsigned range
    Range {
        /// Lowest accepted value
        min: u64,
        /// Highest accepted value
        max: u64,
    },
    /// Signed range
    SignedRange {
        /// Lowest accepted value
        min: i64,
        /// Highest accepted value
        max: i64,
    },
    /// Boolean flag
    Boolean,
    /// Blob id, e.g. `EDID`
    Blob,
    /// Anything else, object ids and bitmasks included
    Other,
}

impl From<&property::ValueType> for PropertyKind {
    fn from(value_type: &property::ValueType) -> Self {
        match value_type {
            property::ValueType::Enum(values) => {
                let (_, enums) = values.values();
                PropertyKind::Enum(
                    enums
                        .iter()
                        .map(|e| EnumEntry::new(e.value(), e.name().to_string_lossy()))
                        .collect(),
                )
            }
            property::ValueType::UnsignedRange(min, max) => PropertyKind::Range { min: *min, max: *max },
            property::ValueType::SignedRange(min, max) => PropertyKind::SignedRange { min: *min, max: *max },
            property::ValueType::Boolean => PropertyKind::Boolean,
            property::ValueType::Blob => PropertyKind::Blob,
            _ => PropertyKind::Other,
        }
    }
}

/// Snapshot of a connector property together with its current value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyEntry {
    /// Property id
    pub id: u32,
    /// Name as exposed by the driver
    pub name: String,
    /// Current raw value on the connector
    pub value: u64,
    /// Value type
    pub kind: PropertyKind,
}

impl PropertyEntry {
    /// Build a snapshot from the driver's property info and the connector's current value
    pub fn from_info(info: &property::Info, value: u64) -> Self {
        PropertyEntry {
            id: info.handle().into(),
            name: info.name().to_string_lossy().into_owned(),
            value,
            kind: PropertyKind::from(&info.value_type()),
        }
    }

    /// Whether this property is an enum
    pub fn is_enum(&self) -> bool {
        matches!(self.kind, PropertyKind::Enum(_))
    }

    /// Label of the current value, if this is an enum and the value is one of its entries
    pub fn enum_label(&self) -> Option<&str> {
        match &self.kind {
            PropertyKind::Enum(entries) => lookup_enum_label(entries, self.value),
            _ => None,
        }
    }
}

/// Find the label of `value` in `entries`.
///
/// If a value is listed more than once the last entry wins.
pub fn lookup_enum_label(entries: &[EnumEntry], value: u64) -> Option<&str> {
    entries
        .iter()
        .rev()
        .find(|entry| entry.value == value)
        .map(|entry| entry.name.as_str())
}

/// Result of reading a single connector property
#[derive(Debug)]
pub enum PropertyRead {
    /// The property info could be retrieved
    Read(PropertyEntry),
    /// The driver refused to describe the property
    Failed {
        /// Property id
        id: u32,
        /// Error returned by the driver
        source: io::Error,
    },
}

/// Read all properties of `conn`, in driver order.
///
/// Properties the driver fails to describe are returned as [`PropertyRead::Failed`]
/// instead of aborting the whole read.
pub fn load_properties(dev: &ProbeDevice, conn: connector::Handle) -> Result<Vec<PropertyRead>, Error> {
    let props = dev.get_properties(conn).map_err(|source| Error::Access {
        errmsg: "Failed to get properties for connector",
        dev: dev.dev_path(),
        source,
    })?;
    let (handles, values) = props.as_props_and_values();

    Ok(handles
        .iter()
        .zip(values.iter())
        .map(|(&handle, &value)| match dev.get_property(handle) {
            Ok(info) => {
                let entry = PropertyEntry::from_info(&info, value);
                trace!(connector = ?conn, property = %entry.name, value, "Read property");
                PropertyRead::Read(entry)
            }
            Err(source) => {
                warn!(connector = ?conn, property = ?handle, "Cannot retrieve drm property: {}", source);
                PropertyRead::Failed {
                    id: handle.into(),
                    source,
                }
            }
        })
        .collect())
}

/// Outcome of setting one property
#[derive(Debug)]
pub struct WriteOutcome {
    /// Property id that was written
    pub prop_id: u32,
    /// Result of the set-property call
    pub result: io::Result<()>,
}

/// Result of [`set_property_by_name`]
#[derive(Debug, Default)]
pub struct WriteReport {
    /// Properties that could not be read while searching, as `(id, error)`
    pub unreadable: Vec<(u32, io::Error)>,
    /// One outcome per property whose name matched
    pub outcomes: Vec<WriteOutcome>,
}

/// Properties selected by [`matching_props`]
#[derive(Debug)]
pub struct PropertyMatches<H> {
    /// Properties whose name equals the requested one, in driver order
    pub matched: Vec<H>,
    /// Properties that could not be read, in driver order
    pub unreadable: Vec<(H, io::Error)>,
}

/// Pick the properties called `name` out of `props`.
///
/// Every match is returned, not just the first. Names that are not valid
/// UTF-8 never match.
pub fn matching_props<H>(props: impl IntoIterator<Item = (H, io::Result<CString>)>, name: &str) -> PropertyMatches<H> {
    let mut matches = PropertyMatches {
        matched: Vec::new(),
        unreadable: Vec::new(),
    };
    for (handle, prop_name) in props {
        match prop_name {
            Ok(prop_name) if prop_name.to_str() == Ok(name) => matches.matched.push(handle),
            Ok(_) => {}
            Err(err) => matches.unreadable.push((handle, err)),
        }
    }
    matches
}

/// Set every property of `conn` called `name` to `value`.
///
/// The value is handed to the driver as is. Properties that cannot be read
/// are skipped, a name that does not match anything is not an error.
pub fn set_property_by_name(
    dev: &ProbeDevice,
    conn: connector::Handle,
    name: &str,
    value: u64,
) -> Result<WriteReport, Error> {
    let props = dev.get_properties(conn).map_err(|source| Error::Access {
        errmsg: "Failed to get properties for connector",
        dev: dev.dev_path(),
        source,
    })?;
    let (handles, _) = props.as_props_and_values();

    let names = handles.iter().map(|&handle| {
        let name = dev.get_property(handle).map(|info| info.name().to_owned());
        if let Err(err) = &name {
            warn!(connector = ?conn, property = ?handle, "Cannot retrieve drm property: {}", err);
        }
        (handle, name)
    });
    let matches = matching_props(names, name);

    if matches.matched.is_empty() {
        warn!(connector = ?conn, "Connector has no property named {:?}", name);
    }

    let outcomes = matches
        .matched
        .into_iter()
        .map(|handle| {
            debug!(connector = ?conn, property = ?handle, "Setting {} to {}", name, value);
            let result = dev.set_property(conn, handle, value);
            if let Err(err) = &result {
                warn!(connector = ?conn, property = ?handle, "Failed to set {}: {}", name, err);
            }
            WriteOutcome {
                prop_id: handle.into(),
                result,
            }
        })
        .collect();

    Ok(WriteReport {
        unreadable: matches
            .unreadable
            .into_iter()
            .map(|(handle, err)| (handle.into(), err))
            .collect(),
        outcomes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn broadcast_rgb(value: u64) -> PropertyEntry {
        PropertyEntry {
            id: 42,
            name: "Broadcast RGB".into(),
            value,
            kind: PropertyKind::Enum(vec![
                EnumEntry::new(0, "Automatic"),
                EnumEntry::new(1, "Full"),
                EnumEntry::new(2, "Limited 16:235"),
            ]),
        }
    }

    #[test]
    fn enum_label_for_current_value() {
        assert_eq!(broadcast_rgb(0).enum_label(), Some("Automatic"));
        assert_eq!(broadcast_rgb(2).enum_label(), Some("Limited 16:235"));
    }

    #[test]
    fn enum_label_not_found() {
        assert_eq!(broadcast_rgb(7).enum_label(), None);
    }

    #[test]
    fn non_enum_has_no_label() {
        let prop = PropertyEntry {
            id: 3,
            name: "max bpc".into(),
            value: 0,
            kind: PropertyKind::Range { min: 6, max: 16 },
        };
        assert!(!prop.is_enum());
        assert_eq!(prop.enum_label(), None);
    }

    #[test]
    fn lookup_last_duplicate_wins() {
        let entries = [EnumEntry::new(1, "first"), EnumEntry::new(1, "second")];
        assert_eq!(lookup_enum_label(&entries, 1), Some("second"));
    }

    #[test]
    fn lookup_empty_enum() {
        assert_eq!(lookup_enum_label(&[], 0), None);
    }

    fn named(id: u32, name: &str) -> (u32, io::Result<CString>) {
        (id, Ok(CString::new(name).unwrap()))
    }

    fn unreadable(id: u32) -> (u32, io::Result<CString>) {
        (id, Err(io::Error::from_raw_os_error(22)))
    }

    #[test]
    fn every_matching_property_is_selected() {
        let matches = matching_props(
            vec![
                named(1, "left margin"),
                named(2, "max bpc"),
                unreadable(3),
                named(4, "left margin"),
            ],
            "left margin",
        );
        assert_eq!(matches.matched, vec![1, 4]);
        assert_eq!(matches.unreadable.len(), 1);
        assert_eq!(matches.unreadable[0].0, 3);
        assert_eq!(matches.unreadable[0].1.raw_os_error(), Some(22));
    }

    #[test]
    fn unknown_name_matches_nothing() {
        let matches = matching_props(vec![named(1, "DPMS"), named(2, "EDID")], "max bpc");
        assert!(matches.matched.is_empty());
        assert!(matches.unreadable.is_empty());
    }

    #[test]
    fn name_match_is_exact() {
        let matches = matching_props(vec![named(1, "max bpc "), named(2, "Max bpc")], "max bpc");
        assert!(matches.matched.is_empty());
    }

    #[test]
    fn non_utf8_name_never_matches() {
        let raw = CString::new(vec![0xff, b'x']).unwrap();
        let matches = matching_props(vec![(1, Ok(raw))], "\u{fffd}x");
        assert!(matches.matched.is_empty());
        assert!(matches.unreadable.is_empty());
    }
}
