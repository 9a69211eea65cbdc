//! Drata-Client: Compliance Platform Integration
//!
//! This crate is the platform layer of the LMS evidence workflow. It
//! reads the personnel roster, uploads evidence documents and triggers
//! autopilot tests against the Drata public API.
//!
//! All requests carry `Authorization: Bearer <credential>` taken from an
//! explicit [`PlatformConfig`].

pub mod client;
pub mod config;
pub mod error;
pub mod fakes;
pub mod platform;
pub mod roster;

pub use client::DrataClient;
pub use config::{
    PlatformConfig, API_KEY_ENV, BASE_URL_ENV, DEFAULT_BASE_URL, TIMEOUT_ENV,
};
pub use error::{ConfigError, RosterError, TransportError};
pub use platform::{CompliancePlatform, PlatformResult};
pub use roster::{PersonnelRecord, Roster};
