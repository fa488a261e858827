//! TV-out Core
//!
//! This crate sequences power, clocks and the output PHY of the S5P TV-out
//! path and reconciles that sequencing with hot-plug events and system
//! suspend/resume.
//!
//! # Architecture
//!
//! The core is organized into several functional domains, leaves first:
//!
//! - **Power**: Voltage rail, gated clock chain and PHY controllers
//! - **Layer**: Exclusive open/close of the video and graphic layers
//! - **Pipeline**: Output interface enable/disable
//! - **Hotplug**: Cable state machine and connect/disconnect cascades
//! - **PM**: Suspend/resume coordinator
//! - **IRQ**: Bounded interrupt to worker hand-off
//! - **Driver**: The `TvOut` facade holding the transition lock
//!
//! # Usage
//!
//! ```rust
//! use tvout_core::config::{TvOutConfig, VariantKind};
//! use tvout_api::{DisplayMode, OutputMode};
//!
//! let config = TvOutConfig::default()
//!     .with_variant(VariantKind::S5pv210)
//!     .with_output_mode(OutputMode::Hdmi)
//!     .with_display_mode(DisplayMode::P1080_60);
//! assert!(config.variant.policy().capabilities().bits() != 0);
//!
//! // let tvout = TvOut::probe(config, platform)?;
//! // tvout.output_open()?;
//! // let token = tvout.layer_open(0)?;
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![allow(dead_code)]

extern crate alloc;

// Core modules
pub mod config;
pub mod status;
pub mod power;
pub mod layer;
pub mod hdcp;
pub mod irq;
pub mod driver;

// Orchestration implemented on the sequencer
mod pipeline;
mod hotplug;
mod pm;

// Re-export commonly used items
pub use config::{Capabilities, SocVariant, TvOutConfig, VariantKind};
pub use driver::TvOut;
pub use driver::sequencer::TvOutStats;
pub use hotplug::Transition;
pub use status::{StatusSnapshot, TvOutputStatus};
