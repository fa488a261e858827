//! Layer lifecycle manager
//!
//! Exclusive open/close for the video layer and the two graphic overlays.
//! Opening records intent and binds a session token; the hardware is only
//! started while the output interface itself runs. `start_all_enabled` and
//! `stop_all_enabled` follow the physical state across cable and suspend
//! events without touching the intent flags.

use core::num::NonZeroU64;

use tvout_api::{Error, LayerId, Result, SessionToken, TvOutHardware};

use crate::status::TvOutputStatus;

/// Issues session tokens and drives per-layer hardware
pub struct LayerManager {
    next_token: u64,
}

impl Default for LayerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerManager {
    pub fn new() -> Self {
        Self { next_token: 1 }
    }

    fn issue_token(&mut self) -> SessionToken {
        let raw = NonZeroU64::new(self.next_token).unwrap_or(NonZeroU64::MIN);
        self.next_token = self.next_token.wrapping_add(1).max(1);
        SessionToken::new(raw)
    }

    /// Claim a layer for one session
    pub fn open(
        &mut self,
        id: LayerId,
        status: &mut TvOutputStatus,
        hw: &mut dyn TvOutHardware,
    ) -> Result<SessionToken> {
        if !status.output_enabled {
            log::debug!("[tvout] {:?} open refused: output not enabled", id);
            return Err(Error::NotReady);
        }
        if status.layer(id).enabled {
            log::debug!("[tvout] {:?} layer is busy", id);
            return Err(Error::Busy);
        }

        if status.output_running {
            hw.layer_start(id).map_err(Error::Hardware)?;
            status.layer_mut(id).running = true;
        }

        let token = self.issue_token();
        let layer = status.layer_mut(id);
        layer.enabled = true;
        layer.owner = Some(token);
        log::info!("[tvout] {:?} layer opened (session {})", id, token.get());
        Ok(token)
    }

    /// Release a layer. Idempotent; the hardware stop is always issued.
    pub fn close(&mut self, id: LayerId, status: &mut TvOutputStatus, hw: &mut dyn TvOutHardware) {
        let layer = status.layer_mut(id);
        layer.enabled = false;
        layer.owner = None;
        hw.layer_stop(id);
        layer.running = false;
        log::info!("[tvout] {:?} layer closed", id);
    }

    /// Release every layer
    pub fn close_all(&mut self, status: &mut TvOutputStatus, hw: &mut dyn TvOutHardware) {
        for id in LayerId::ALL {
            if status.layer(id).enabled || status.layer(id).running {
                self.close(id, status, hw);
            }
        }
    }

    /// Start the hardware of every enabled layer that is not running yet.
    ///
    /// A layer that fails to start is logged and skipped; the others still
    /// start.
    pub fn start_all_enabled(&mut self, status: &mut TvOutputStatus, hw: &mut dyn TvOutHardware) {
        for id in LayerId::ALL {
            let layer = status.layer(id);
            if !layer.enabled || layer.running {
                continue;
            }
            match hw.layer_start(id) {
                Ok(()) => status.layer_mut(id).running = true,
                Err(err) => log::warn!("[tvout] {:?} layer start failed: {}", id, err),
            }
        }
    }

    /// Stop the hardware of every enabled layer, keeping the enabled flags
    pub fn stop_all_enabled(&mut self, status: &mut TvOutputStatus, hw: &mut dyn TvOutHardware) {
        for id in LayerId::ALL {
            if status.layer(id).enabled {
                hw.layer_stop(id);
                status.layer_mut(id).running = false;
            }
        }
    }
}
