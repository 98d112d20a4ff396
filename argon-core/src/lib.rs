//! Argon Core Library
//!
//! Declarative audio/video recording session orchestration.
//!
//! This library provides:
//! - A validated recording parameter store with a textual key/value surface
//! - Capability negotiation against device encoder profiles
//! - Capture source acquisition and encoder pipeline building
//! - Output strategy selection across container, elementary stream, RTP
//!   and transport-stream writers
//! - The session lifecycle state machine with guaranteed teardown
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐    ┌───────────────┐    ┌──────────────────┐
//! │ Capture      │───▶│ Codec Service │───▶│ Writer           │
//! │ (mic/camera) │    │ (encoders)    │    │ (container/strm) │
//! └──────────────┘    └───────────────┘    └──────────────────┘
//!         ▲                   ▲                     ▲
//!         └───────── RecorderSession ───────────────┘
//! ```

pub mod caps;
pub mod capture;
pub mod config;
pub mod encode;
pub mod error;
pub mod output;
pub mod session;
pub mod types;
pub mod usage;

pub use caps::{CapabilityProfiles, StaticProfiles};
pub use config::{OutputFormat, RecordingConfig};
pub use error::{ArgonError, Result};
pub use output::{OutputStrategy, Writer};
pub use session::{MediaServices, RecorderSession};
pub use types::{Handle, SessionState};
