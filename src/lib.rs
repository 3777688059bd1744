#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

//! # kmsprobe
//!
//! Inspect, and optionally tweak, the first connected output of a drm device.
//!
//! The probe opens a kernel mode-setting device node, picks the first
//! connector with a display attached, sets a couple of connector properties
//! on it (`max bpc` and `left margin` unless configured otherwise) and prints
//! the connector's modes and properties.
//!
//! - [`config`] holds the compiled-in defaults and their overrides
//! - [`device`] owns the open device node
//! - [`connector`] selects the connector and summarizes its modes
//! - [`property`] reads and writes connector properties
//! - [`edid`] identifies the attached monitor
//! - [`report`] formats the output
//!
//! [`probe::run`] ties these together.
//!
//! ### Logging
//!
//! All diagnostics besides the report itself go through [`tracing`]. The
//! `kmsprobe` binary honours `RUST_LOG`.

pub mod config;
pub mod connector;
pub mod device;
pub mod edid;
mod error;
pub mod probe;
pub mod property;
pub mod report;

pub mod reexports;

pub use error::Error;
