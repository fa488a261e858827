//! Hot-plug state machine
//!
//! `Unknown -> {Connected, Disconnected}`, then `Connected <-> Disconnected`
//! for the driver lifetime. A sample equal to the recorded state is a
//! no-op, however many interrupts fired. Nothing runs while a suspend is
//! in progress: the suspend/resume coordinator owns the hardware until
//! resume has finished.

use tvout_api::{HpdState, Result};

use crate::driver::sequencer::Sequencer;

/// Outcome of evaluating one detect-line sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// A cascade ran
    Cascade { from: HpdState, to: HpdState },
    /// Same state as recorded, nothing done
    Debounced,
    /// Suspend in progress, sample ignored
    Skipped,
}

impl Sequencer {
    /// Evaluate one detect-line sample.
    ///
    /// On a fatal cascade error the recorded state is reset to `Unknown`
    /// so that the next sample, whatever its value, is treated as a real
    /// transition and retries the cascade.
    pub(crate) fn handle_cable(&mut self, connected: bool) -> Result<Transition> {
        if self.status.suspending {
            // ignore HPD event in suspend
            self.stats.skipped_suspended += 1;
            log::info!("[tvout] hpd event ignored while suspending");
            return Ok(Transition::Skipped);
        }

        let from = self.status.hpd;
        let to = HpdState::from_line(connected);
        if from == to {
            self.stats.debounced += 1;
            log::debug!("[tvout] same hpd state: {}", to);
            return Ok(Transition::Debounced);
        }

        log::info!("[tvout] hpd {} -> {}", from, to);
        self.status.hpd = to;
        let result = match to {
            HpdState::Connected => self.connect_cascade(),
            _ => self.disconnect_cascade(),
        };

        match result {
            Ok(()) => {
                self.stats.cascades += 1;
                Ok(Transition::Cascade { from, to })
            }
            Err(err) => {
                log::error!("[tvout] {} cascade aborted: {}", to, err);
                self.stats.failed_cascades += 1;
                self.status.hpd = HpdState::Unknown;
                Err(err)
            }
        }
    }

    /// Cable inserted: notify, restrict cpufreq, bring up rail, clocks and
    /// PHY, then restart whatever the user had enabled.
    fn connect_cascade(&mut self) -> Result<()> {
        log::debug!("[tvout] hdmi cable is connected (start)");
        self.notify(HpdState::Connected);
        self.restrict_freq();

        self.rail_enable()?;
        self.gate_clocks(true)?;
        self.phy_up_if_digital()?;

        let hdcp = self.status.hdcp_requested;
        self.hdcp.on_connect(hdcp);

        if let Err(err) = self.output_start_hw() {
            log::warn!("[tvout] output start failed: {}", err);
        }
        self.start_layers();

        log::debug!("[tvout] hdmi cable is connected (end)");
        Ok(())
    }

    /// Cable removed: notify, stop the hardware while keeping the user's
    /// enabled flags, then take PHY, clocks and rail down.
    fn disconnect_cascade(&mut self) -> Result<()> {
        log::debug!("[tvout] hdmi cable is disconnected (start)");
        self.notify(HpdState::Disconnected);

        let hdcp = self.status.hdcp_requested;
        self.hdcp.on_disconnect(hdcp);

        self.stop_layers();
        self.output_stop_hw();
        self.power_down()?;

        self.normal_freq();
        log::debug!("[tvout] hdmi cable is disconnected (end)");
        Ok(())
    }
}
