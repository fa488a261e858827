//! Suspend/resume coordinator
//!
//! Suspend tears the hardware down but leaves the pipeline
//! and layer `enabled` flags set so that resume knows what to restore.
//! The suspend flag is raised before the cable is sampled and cleared as
//! the very last step of resume; in between, the hot-plug state machine
//! ignores every sample.

use tvout_api::{HpdState, Result};

use crate::driver::sequencer::Sequencer;

impl Sequencer {
    /// Mark a suspend in progress. Must precede the cable sample.
    pub(crate) fn begin_suspend(&mut self) {
        self.status.suspending = true;
        self.stats.suspends += 1;
    }

    /// Suspend teardown for a freshly sampled cable state
    pub(crate) fn suspend_teardown(&mut self, connected: bool) -> Result<()> {
        if !connected {
            if !self.hardware_running() {
                log::debug!("[tvout] suspend: cable removed, nothing to tear down");
                return Ok(());
            }
            // an unplug was queued but never evaluated
            log::debug!("[tvout] suspend: cable removed with output still running");
        }

        log::debug!("[tvout] suspend: tearing down (hpd {})", self.status.hpd);
        self.stop_layers();
        self.output_stop_hw();
        self.power_down()?;
        self.normal_freq();
        log::info!("[tvout] suspended");
        Ok(())
    }

    /// First half of resume: rail and clocks back on so the cable can be
    /// probed
    pub(crate) fn resume_power_up(&mut self) -> Result<()> {
        self.stats.resumes += 1;
        let result = self.rail_enable().and_then(|_| self.gate_clocks(true));
        if let Err(err) = result {
            self.abort_resume();
            return Err(err);
        }
        Ok(())
    }

    /// Second half of resume for a freshly sampled cable state
    pub(crate) fn resume_restore(&mut self, connected: bool) -> Result<()> {
        let sampled = HpdState::from_line(connected);
        if sampled != self.status.hpd {
            log::info!("[tvout] resume: hpd {} -> {}", self.status.hpd, sampled);
            self.status.hpd = sampled;
            self.notify(sampled);
        }

        let result = if connected {
            self.resume_connected()
        } else {
            log::debug!("[tvout] resume: cable removed, powering back down");
            self.resume_disconnected()
        };

        match result {
            Ok(()) => {
                self.status.suspending = false;
                log::info!("[tvout] resumed (hpd {})", self.status.hpd);
                Ok(())
            }
            Err(err) => {
                self.abort_resume();
                Err(err)
            }
        }
    }

    fn resume_connected(&mut self) -> Result<()> {
        self.restrict_freq();
        self.phy_up_if_digital()?;

        let hdcp = self.status.hdcp_requested;
        self.hdcp.on_connect(hdcp);

        if let Err(err) = self.output_start_hw() {
            log::warn!("[tvout] resume: output start failed: {}", err);
        }
        self.start_layers();
        Ok(())
    }

    fn resume_disconnected(&mut self) -> Result<()> {
        let hdcp = self.status.hdcp_requested;
        self.hdcp.on_disconnect(hdcp);

        // running flags must drop with the clocks or the next connect
        // skips the restart
        if self.hardware_running() {
            self.stop_layers();
            self.output_stop_hw();
        }
        self.power_down()
    }

    fn hardware_running(&self) -> bool {
        self.status.output_running || !self.status.running_layers().is_empty()
    }

    /// A fatal error ended the resume early: release the suspend hold and
    /// forget the cable state so the next hot-plug sample retries.
    fn abort_resume(&mut self) {
        log::error!("[tvout] resume aborted");
        self.status.hpd = HpdState::Unknown;
        self.status.suspending = false;
    }
}
