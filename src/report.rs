//! Text report of the probed connector

use std::{fmt, io};

use crate::{
    config::PropertyWrite,
    connector::ModeSummary,
    edid::MonitorInfo,
    property::{PropertyEntry, PropertyRead, WriteOutcome},
};

/// Everything printed about the selected connector
#[derive(Debug)]
pub struct ConnectorReport {
    /// Connector id
    pub id: u32,
    /// Connector name, e.g. `HDMI-A-1`
    pub name: String,
    /// Attached monitor, if its EDID could be decoded
    pub monitor: Option<MonitorInfo>,
    /// Supported modes in driver order
    pub modes: Vec<ModeSummary>,
    /// Connector properties in driver order
    pub properties: Vec<PropertyRead>,
}

impl ConnectorReport {
    /// The mode the probe picks for this connector, the first one listed
    pub fn selected_mode(&self) -> Option<&ModeSummary> {
        self.modes.first()
    }
}

impl fmt::Display for ConnectorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "connector {} ({}): connected", self.id, self.name)?;
        if let Some(monitor) = &self.monitor {
            writeln!(f, "    monitor: {} {}", monitor.manufacturer, monitor.model)?;
        }
        if let Some(mode) = self.selected_mode() {
            writeln!(f, "    selected mode: {} {}Hz", mode.name, mode.refresh)?;
        }

        if self.modes.is_empty() {
            writeln!(f, "    no valid mode for connector {}", self.id)?;
        }
        for (i, mode) in self.modes.iter().enumerate() {
            writeln!(f, "{}", mode_line(i, mode))?;
        }

        writeln!(f, "    properties count: {}", self.properties.len())?;
        for prop in &self.properties {
            match prop {
                PropertyRead::Read(entry) => {
                    for line in property_lines(entry) {
                        writeln!(f, "{}", line)?;
                    }
                }
                PropertyRead::Failed { id, source } => {
                    writeln!(f, "{}", property_failure_line(self.id, *id, source))?;
                }
            }
        }
        Ok(())
    }
}

/// One line per mode, numbered by position. Preferred modes get a trailing marker.
pub fn mode_line(index: usize, mode: &ModeSummary) -> String {
    let mut line = format!(
        "    mode {:2}: {:<15} {}Hz {}x{} clock:{}",
        index, mode.name, mode.refresh, mode.width, mode.height, mode.clock
    );
    if mode.preferred {
        line.push_str(" (preferred)");
    }
    line
}

/// Lines describing a property, including the enum miss notice if any
pub fn property_lines(prop: &PropertyEntry) -> Vec<String> {
    let mut lines = Vec::with_capacity(2);
    let label = prop.enum_label();

    if prop.is_enum() && label.is_none() {
        lines.push(format!("#\tproperty value ({}) not found in enum list!", prop.value));
    }

    let mut line = format!("    property (#{}):  {} = {}", prop.id, prop.name, prop.value);
    if let Some(label) = label {
        line.push_str(&format!(" ({})", label));
    }
    lines.push(line);

    lines
}

/// Line reported for a property the driver refused to describe
pub fn property_failure_line(connector_id: u32, prop_id: u32, err: &io::Error) -> String {
    format!(
        "    cannot retrieve DRM property (connector_id: {}, prop_id: {}): {}",
        connector_id, prop_id, err
    )
}

/// Line reported for every property write attempted
pub fn write_line(write: &PropertyWrite, connector_id: u32, outcome: &WriteOutcome) -> String {
    let result = match &outcome.result {
        Ok(()) => "ok".to_string(),
        Err(err) => format!("error ({})", err),
    };
    format!(
        "Setting '{}' -> {} - {} :: connector_id: {} prop_id: {}",
        write.name, write.value, result, connector_id, outcome.prop_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{EnumEntry, PropertyKind};

    fn mode(name: &str, refresh: u32, width: u16, height: u16, clock: u32) -> ModeSummary {
        ModeSummary {
            name: name.into(),
            refresh,
            width,
            height,
            clock,
            preferred: false,
        }
    }

    fn link_status(value: u64) -> PropertyEntry {
        PropertyEntry {
            id: 5,
            name: "link-status".into(),
            value,
            kind: PropertyKind::Enum(vec![EnumEntry::new(0, "Good"), EnumEntry::new(1, "Bad")]),
        }
    }

    #[test]
    fn mode_line_format() {
        assert_eq!(
            mode_line(0, &mode("1920x1080", 60, 1920, 1080, 148500)),
            "    mode  0: 1920x1080       60Hz 1920x1080 clock:148500"
        );
        assert_eq!(
            mode_line(12, &mode("720x400", 70, 720, 400, 28320)),
            "    mode 12: 720x400         70Hz 720x400 clock:28320"
        );
    }

    #[test]
    fn preferred_mode_is_marked() {
        let mut preferred = mode("2560x1440", 60, 2560, 1440, 241500);
        preferred.preferred = true;
        assert_eq!(
            mode_line(1, &preferred),
            "    mode  1: 2560x1440       60Hz 2560x1440 clock:241500 (preferred)"
        );
    }

    #[test]
    fn enum_property_with_label() {
        assert_eq!(
            property_lines(&link_status(0)),
            vec!["    property (#5):  link-status = 0 (Good)".to_string()]
        );
    }

    #[test]
    fn enum_property_value_missing() {
        assert_eq!(
            property_lines(&link_status(9)),
            vec![
                "#\tproperty value (9) not found in enum list!".to_string(),
                "    property (#5):  link-status = 9".to_string(),
            ]
        );
    }

    #[test]
    fn range_property_has_no_label() {
        let prop = PropertyEntry {
            id: 77,
            name: "max bpc".into(),
            value: 12,
            kind: PropertyKind::Range { min: 6, max: 16 },
        };
        assert_eq!(property_lines(&prop), vec!["    property (#77):  max bpc = 12".to_string()]);
    }

    #[test]
    fn write_line_format() {
        let write = PropertyWrite::new("max bpc", 12);
        let ok = WriteOutcome {
            prop_id: 77,
            result: Ok(()),
        };
        assert_eq!(
            write_line(&write, 95, &ok),
            "Setting 'max bpc' -> 12 - ok :: connector_id: 95 prop_id: 77"
        );

        let failed = WriteOutcome {
            prop_id: 77,
            result: Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied")),
        };
        assert_eq!(
            write_line(&write, 95, &failed),
            "Setting 'max bpc' -> 12 - error (denied) :: connector_id: 95 prop_id: 77"
        );
    }

    #[test]
    fn full_report() {
        let report = ConnectorReport {
            id: 95,
            name: "HDMI-A-1".into(),
            monitor: Some(MonitorInfo {
                manufacturer: "DEL".into(),
                model: "DELL U2415".into(),
            }),
            modes: vec![mode("1920x1200", 60, 1920, 1200, 154000)],
            properties: vec![
                PropertyRead::Read(link_status(0)),
                PropertyRead::Failed {
                    id: 6,
                    source: io::Error::new(io::ErrorKind::Other, "gone"),
                },
            ],
        };

        let expected = "connector 95 (HDMI-A-1): connected\n\
                        \x20   monitor: DEL DELL U2415\n\
                        \x20   selected mode: 1920x1200 60Hz\n\
                        \x20   mode  0: 1920x1200       60Hz 1920x1200 clock:154000\n\
                        \x20   properties count: 2\n\
                        \x20   property (#5):  link-status = 0 (Good)\n\
                        \x20   cannot retrieve DRM property (connector_id: 95, prop_id: 6): gone\n";
        assert_eq!(report.to_string(), expected);
    }

    #[test]
    fn report_without_modes() {
        let report = ConnectorReport {
            id: 3,
            name: "DP-1".into(),
            monitor: None,
            modes: Vec::new(),
            properties: Vec::new(),
        };
        assert_eq!(
            report.to_string(),
            "connector 3 (DP-1): connected\n    no valid mode for connector 3\n    properties count: 0\n"
        );
    }
}
