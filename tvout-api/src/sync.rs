//! Synchronization primitives for the TV-out sequencer
//!
//! The core serializes every state transition on one [`Mutex`]; the
//! interrupt hand-off uses a second, short-held one.

pub use spin::Mutex;
pub use spin::MutexGuard;
pub use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};
