//! TV-out driver facade
//!
//! `TvOut` is the entry point used by the device-node layer, the interrupt
//! glue and the platform power-management framework. It owns:
//!
//! - the transition lock around [`sequencer::Sequencer`], which serializes
//!   every cascade, suspend and resume end to end
//! - the interrupt hand-off, which never takes the transition lock
//!
//! Lock order is always transition lock first, then the short interrupt
//! locks. The interrupt side only ever takes the latter.

pub mod sequencer;

use static_assertions::assert_impl_all;

use tvout_api::error::{invalid_argument, not_found};
use tvout_api::sync::Mutex;
use tvout_api::{DisplayMode, Error, HpdState, LayerId, OutputMode, Platform, Result, SessionToken};

use crate::config::{Capabilities, TvOutConfig};
use crate::hdcp::HdcpHook;
use crate::hotplug::Transition;
use crate::irq::IrqHandoff;
use crate::layer::LayerManager;
use crate::power::{ClockGate, ClockSet, PhyPower, PowerRail};
use crate::status::{StatusSnapshot, TvOutputStatus};

use self::sequencer::{Sequencer, TvOutStats};

/// One TV-out controller instance
pub struct TvOut {
    config: TvOutConfig,
    seq: Mutex<Sequencer>,
    irq: IrqHandoff,
}

assert_impl_all!(TvOut: Send, Sync);

impl TvOut {
    /// Bring the controller up.
    ///
    /// The rail is switched on, every named clock is acquired, the VPLL is
    /// programmed, and the PHY is cut off with the clock gate briefly on.
    /// The cable is sampled once and that sample is queued so the first
    /// [`TvOut::run_deferred_work`] resolves the initial `Unknown` state.
    /// Everything is powered back down before returning.
    pub fn probe(config: TvOutConfig, platform: Platform) -> Result<Self> {
        let variant = config.variant.policy();
        let caps = variant.capabilities();
        let table = variant.clocks();

        let mut rail = PowerRail::new(platform.regulator, platform.delay, config.rail_settle_ms);
        if caps.contains(Capabilities::SECONDARY_RAIL) {
            match platform.secondary_regulator {
                Some(secondary) => rail = rail.with_secondary(secondary),
                None => {
                    log::error!("[tvout] {} needs the hdmi rail", variant.name());
                    return Err(not_found("hdmi regulator"));
                }
            }
        }

        let mut seq = Sequencer {
            status: TvOutputStatus::new(&config),
            variant,
            rail,
            clocks: ClockSet::new(platform.clocks),
            gate: ClockGate::new(platform.domains, table, caps),
            phy: PhyPower::new(table, caps),
            layers: LayerManager::new(),
            hdcp: HdcpHook::new(platform.hdcp),
            hw: platform.hardware,
            freq: platform.freq,
            uevent: platform.uevent,
            stats: TvOutStats::default(),
        };
        let irq = IrqHandoff::new(platform.detect);

        if let Err(err) = seq.boot() {
            log::error!("[tvout] probe failed: {}", err);
            seq.abandon_boot();
            return Err(err);
        }

        let connected = irq.sample();
        log::info!(
            "[tvout] probe on {}: cable {}",
            variant.name(),
            HpdState::from_line(connected)
        );

        if let Err(err) = seq.rail_disable() {
            seq.abandon_boot();
            return Err(err);
        }
        irq.push(connected);

        Ok(Self {
            config,
            seq: Mutex::new(seq),
            irq,
        })
    }

    /// Tear the controller down and release every clock handle
    pub fn remove(self) {
        let mut seq = self.seq.lock();
        seq.shutdown();
        log::info!("[tvout] removed");
    }

    pub fn config(&self) -> &TvOutConfig {
        &self.config
    }

    // ========================================================================
    // Device-node operations
    // ========================================================================

    /// Open the output pipeline
    pub fn output_open(&self) -> Result<()> {
        self.seq.lock().output_enable()
    }

    /// Close the output pipeline, releasing every layer
    pub fn output_close(&self) -> Result<()> {
        self.seq.lock().output_disable()
    }

    /// Claim layer `index` (0 video, 1 and 2 graphic overlays)
    pub fn layer_open(&self, index: usize) -> Result<SessionToken> {
        let id = LayerId::from_index(index).ok_or(not_found("layer"))?;
        self.seq.lock().layer_open(id)
    }

    /// Release layer `index`. Closing a released layer is not an error.
    pub fn layer_close(&self, index: usize) -> Result<()> {
        let id = LayerId::from_index(index).ok_or(not_found("layer"))?;
        self.seq.lock().layer_close(id);
        Ok(())
    }

    /// Explicit PHY and clock control outside the hot-plug cascade
    pub fn set_power_state(&self, on: bool) -> Result<()> {
        self.seq.lock().set_power_state(on)
    }

    /// Request or drop HDCP. Takes effect on the next connect when no cable
    /// is present.
    pub fn set_hdcp(&self, enabled: bool) {
        let mut seq = self.seq.lock();
        seq.status.hdcp_requested = enabled;
        if seq.status.output_live() {
            if enabled {
                seq.hdcp.on_connect(true);
            } else {
                seq.hdcp.on_disconnect(false);
            }
        }
        log::debug!("[tvout] hdcp {}", if enabled { "requested" } else { "dropped" });
    }

    /// Select the output standard and display timing.
    ///
    /// Only allowed while the output interface is stopped.
    pub fn set_output_mode(&self, output: OutputMode, display: DisplayMode) -> Result<()> {
        let mut seq = self.seq.lock();
        if seq.status.output_running {
            return Err(Error::Busy);
        }
        if !output.supports(display) {
            return Err(invalid_argument("display mode not carried by output"));
        }
        seq.change_mode(output, display)
    }

    // ========================================================================
    // Hot-plug
    // ========================================================================

    /// Interrupt entry: sample the detect line and queue the reading.
    ///
    /// Never blocks on the transition lock. Returns `false` if the queue
    /// overflowed and an older sample was dropped.
    pub fn notify_cable_change(&self) -> bool {
        self.irq.on_interrupt()
    }

    /// Worker entry: evaluate every queued sample in arrival order.
    ///
    /// Returns the number of cascades that ran. Every sample is evaluated
    /// even after a failure; the first error is reported.
    pub fn run_deferred_work(&self) -> Result<usize> {
        let mut cascades = 0;
        let mut first_err = None;
        while let Some(connected) = self.irq.pop() {
            let mut seq = self.seq.lock();
            match seq.handle_cable(connected) {
                Ok(Transition::Cascade { .. }) => cascades += 1,
                Ok(_) => {}
                Err(err) => {
                    first_err.get_or_insert(err);
                }
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(cascades),
        }
    }

    // ========================================================================
    // Power management
    // ========================================================================

    /// Platform suspend.
    ///
    /// The suspend flag goes up before the cable is sampled; samples queued
    /// before that point are discarded. When the cable is gone nothing is
    /// torn down.
    pub fn suspend(&self) -> Result<()> {
        let mut seq = self.seq.lock();
        seq.begin_suspend();

        let stale = self.irq.discard_pending() as u64;
        seq.stats.skipped_suspended += stale;

        let connected = self.irq.sample();
        seq.suspend_teardown(connected)
    }

    /// Platform resume
    pub fn resume(&self) -> Result<()> {
        let mut seq = self.seq.lock();
        if !seq.status.suspending {
            log::warn!("[tvout] resume without a matching suspend");
        }
        seq.resume_power_up()?;

        let connected = self.irq.sample();
        seq.resume_restore(connected)
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    pub fn snapshot(&self) -> StatusSnapshot {
        self.seq.lock().status.snapshot()
    }

    pub fn hpd_state(&self) -> HpdState {
        self.seq.lock().status.hpd
    }

    pub fn stats(&self) -> TvOutStats {
        let mut stats = self.seq.lock().stats;
        stats.dropped_samples = self.irq.dropped();
        stats
    }
}

impl Sequencer {
    /// Probe-time bring-up, leaving the rail on and the clock gate off
    fn boot(&mut self) -> Result<()> {
        let table = self.variant.clocks();

        self.rail_enable()?;
        let acquired = self
            .clocks
            .acquire_all(table)
            .and_then(|_| self.clocks.configure_vpll(table));
        if let Err(err) = acquired {
            self.clocks.release_all();
            if let Err(undo) = self.rail_disable() {
                log::warn!("[tvout] {}", undo);
            }
            return Err(err);
        }

        // boot-time PHY cut-off
        self.gate_clocks(true)?;
        self.phy
            .cut_off(&mut self.status, &mut self.clocks, self.hw.as_mut())?;
        self.gate_clocks(false)
    }

    /// Undo a [`Sequencer::boot`] that got past clock acquisition
    fn abandon_boot(&mut self) {
        if let Err(err) = self.gate_clocks(false) {
            log::warn!("[tvout] {}", err);
        }
        if !self.clocks.is_empty() {
            let table = self.variant.clocks();
            self.clocks.stop_special(table);
            self.clocks.release_all();
        }
        if let Err(err) = self.rail_disable() {
            log::warn!("[tvout] {}", err);
        }
    }

    fn shutdown(&mut self) {
        let was_live = self.status.output_live();

        self.layers.close_all(&mut self.status, self.hw.as_mut());
        self.output_stop_hw();
        self.status.output_enabled = false;
        self.hdcp.release();

        if let Err(err) = self.power_down() {
            log::warn!("[tvout] remove: {}", err);
        }
        if was_live {
            self.normal_freq();
        }

        let table = self.variant.clocks();
        self.clocks.stop_special(table);
        self.clocks.release_all();
    }

    fn change_mode(&mut self, output: OutputMode, display: DisplayMode) -> Result<()> {
        let phy_was_needed = self.status.needs_phy();
        if phy_was_needed && !output.is_digital() {
            self.phy_down()?;
        }

        self.status.output_mode = output;
        self.status.display_mode = display;

        if self.status.output_enabled {
            if !phy_was_needed && self.status.clocks_on {
                self.phy_up_if_digital()?;
            }
            self.hw.init_params(output, display);
        }
        log::info!("[tvout] mode {:?} {:?}", output, display);
        Ok(())
    }
}
