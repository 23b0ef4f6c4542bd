//! Campus service integrations consumed by the dashboard.
//!
//! Both services are demo stand-ins: they expose the request surface of the
//! real partner APIs but answer from canned data, with no network involved.
//! They share nothing with the telemetry feed beyond student ids.

pub mod smartpark;
pub mod volutrack;

pub use smartpark::SmartParkClient;
pub use volutrack::VoluTrackClient;
