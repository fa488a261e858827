//! TV-out API - Core interfaces and types for the TV-out power sequencer
//!
//! This crate provides the types, error model and collaborator interfaces
//! shared by the TV-out sequencing core and the subsystems it drives. The
//! register-level display blocks, the regulator/clock frameworks and the
//! platform power-management hooks all live outside the core; this crate
//! describes how the core talks to them.
//!
//! # Architecture
//!
//! The API is organized into several key modules:
//!
//! - **Types**: Cable state, output/display modes, layer identifiers
//! - **Error**: Common error type, hardware error codes and POSIX mapping
//! - **Interfaces**: Regulator, clock, power-domain, detect-line and
//!   display-hardware abstractions consumed by the core
//! - **Sync**: Lock primitives used by the core
//!
//! # Usage
//!
//! ```rust
//! use tvout_api::{Error, HpdState, LayerId};
//!
//! let state = HpdState::from_line(true);
//! assert!(state.is_connected());
//! assert_eq!(LayerId::from_index(1), Some(LayerId::Graphic0));
//! assert_eq!(Error::Busy.errno(), tvout_api::error::errno::EBUSY);
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![allow(dead_code)]

extern crate alloc;

pub mod error;
pub mod interfaces;
pub mod sync;
pub mod types;

// Re-export commonly used types
pub use crate::error::{Error, HwError, HwResult, Result};
pub use crate::interfaces::*;
pub use crate::types::*;
