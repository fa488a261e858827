//! Output pipeline controller
//!
//! Gates the whole TV-out signal path. `enable`/`disable` are the user
//! open/close of the output node and own the `output_enabled` flag;
//! `start_hw`/`stop_hw` follow the physical state for the cascades and
//! leave the flag alone.

use tvout_api::{Error, LayerId, Result, SessionToken};

use crate::driver::sequencer::Sequencer;

impl Sequencer {
    /// Open the output path.
    ///
    /// Rail, clocks and (for digital modes) the PHY come up, default
    /// display parameters are programmed, and the interface is started
    /// right away when a cable is present.
    pub(crate) fn output_enable(&mut self) -> Result<()> {
        if self.status.output_enabled {
            log::debug!("[tvout] output already used");
            return Err(Error::AlreadyEnabled);
        }

        self.rail_enable()?;
        self.gate_clocks(true)?;
        self.phy_up_if_digital()?;

        self.hw
            .init_params(self.status.output_mode, self.status.display_mode);
        self.status.output_enabled = true;
        log::info!(
            "[tvout] output enabled ({:?}, {:?}, hpd {})",
            self.status.output_mode,
            self.status.display_mode,
            self.status.hpd
        );

        if self.status.output_live() {
            if let Err(err) = self.output_start_hw() {
                log::warn!("[tvout] output start deferred: {}", err);
            }
        }
        Ok(())
    }

    /// Close the output path.
    ///
    /// Layers are released first (a layer may only be enabled while the
    /// pipeline is), then the interface hardware stops, the flag clears,
    /// and only then do the PHY, clocks and rail go down.
    pub(crate) fn output_disable(&mut self) -> Result<()> {
        self.layers.close_all(&mut self.status, self.hw.as_mut());

        self.hw.output_stop();
        self.status.output_running = false;
        self.status.output_enabled = false;

        self.status.hdcp_requested = false;
        self.hdcp.release();

        self.power_down()?;
        log::info!("[tvout] output disabled");
        Ok(())
    }

    /// Start the interface hardware if the user enabled the output
    pub(crate) fn output_start_hw(&mut self) -> Result<()> {
        if !self.status.output_enabled || self.status.output_running {
            return Ok(());
        }
        self.hw.output_start().map_err(Error::Hardware)?;
        self.status.output_running = true;
        log::debug!("[tvout] output interface started");
        Ok(())
    }

    /// Stop the interface hardware, keeping the enabled flag
    pub(crate) fn output_stop_hw(&mut self) {
        if self.status.output_enabled || self.status.output_running {
            self.hw.output_stop();
            self.status.output_running = false;
            log::debug!("[tvout] output interface stopped");
        }
    }

    pub(crate) fn layer_open(&mut self, id: LayerId) -> Result<SessionToken> {
        self.layers.open(id, &mut self.status, self.hw.as_mut())
    }

    pub(crate) fn layer_close(&mut self, id: LayerId) {
        self.layers.close(id, &mut self.status, self.hw.as_mut());
    }

    pub(crate) fn start_layers(&mut self) {
        self.layers
            .start_all_enabled(&mut self.status, self.hw.as_mut());
    }

    pub(crate) fn stop_layers(&mut self) {
        self.layers
            .stop_all_enabled(&mut self.status, self.hw.as_mut());
    }

    /// Explicit PHY/clock control outside the hot-plug cascade
    pub(crate) fn set_power_state(&mut self, on: bool) -> Result<()> {
        if on {
            self.gate_clocks(true)?;
            self.phy_up_if_digital()
        } else {
            self.phy_down()?;
            self.gate_clocks(false)
        }
    }
}
