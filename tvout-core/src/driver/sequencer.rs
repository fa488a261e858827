// Transition state guarded by the driver's single transition lock
//
// `Sequencer` owns `TvOutputStatus` together with every controller. The
// output pipeline, hot-plug and suspend/resume orchestration are
// implemented on it in their own modules; this file only holds the shared
// plumbing they all lean on.

extern crate alloc;

use alloc::boxed::Box;

use tvout_api::{FreqPolicy, HpdState, Result, TvOutHardware, UeventSink};

use crate::config::SocVariant;
use crate::hdcp::HdcpHook;
use crate::layer::LayerManager;
use crate::power::{ClockGate, ClockSet, PhyPower, PowerRail};
use crate::status::TvOutputStatus;

/// Counters kept alongside the status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TvOutStats {
    /// Connect or disconnect cascades run to completion
    pub cascades: u64,
    /// Cascades aborted by a fatal error
    pub failed_cascades: u64,
    /// Samples equal to the recorded state
    pub debounced: u64,
    /// Samples ignored because a suspend was in progress
    pub skipped_suspended: u64,
    /// Interrupt samples discarded on queue overflow
    pub dropped_samples: u64,
    pub suspends: u64,
    pub resumes: u64,
}

pub(crate) struct Sequencer {
    pub(crate) status: TvOutputStatus,
    pub(crate) variant: &'static dyn SocVariant,
    pub(crate) rail: PowerRail,
    pub(crate) clocks: ClockSet,
    pub(crate) gate: ClockGate,
    pub(crate) phy: PhyPower,
    pub(crate) layers: LayerManager,
    pub(crate) hdcp: HdcpHook,
    pub(crate) hw: Box<dyn TvOutHardware>,
    pub(crate) freq: Box<dyn FreqPolicy>,
    pub(crate) uevent: Box<dyn UeventSink>,
    pub(crate) stats: TvOutStats,
}

impl Sequencer {
    pub(crate) fn rail_enable(&mut self) -> Result<()> {
        self.rail.enable(&mut self.status)
    }

    pub(crate) fn rail_disable(&mut self) -> Result<()> {
        self.rail.disable(&mut self.status)
    }

    pub(crate) fn gate_clocks(&mut self, on: bool) -> Result<()> {
        self.gate.gate(on, &mut self.clocks, &mut self.status)
    }

    pub(crate) fn phy_power(&mut self, on: bool) -> Result<()> {
        self.phy
            .set_power(on, &mut self.status, &mut self.clocks, self.hw.as_mut())
    }

    /// PHY on, if the active output mode is digital
    pub(crate) fn phy_up_if_digital(&mut self) -> Result<()> {
        if self.status.needs_phy() {
            self.phy_power(true)?;
        }
        Ok(())
    }

    /// PHY off ahead of gating the clocks; a powered PHY must never
    /// outlive its control-bus clock
    pub(crate) fn phy_down(&mut self) -> Result<()> {
        if self.status.needs_phy() || self.status.phy_on {
            self.phy_power(false)?;
        }
        Ok(())
    }

    /// PHY off, clocks off, rail off
    pub(crate) fn power_down(&mut self) -> Result<()> {
        self.phy_down()?;
        self.gate_clocks(false)?;
        self.rail_disable()
    }

    pub(crate) fn restrict_freq(&mut self) {
        if let Err(err) = self.freq.restrict() {
            log::warn!("[tvout] cpufreq restrict failed: {}", err);
        }
    }

    pub(crate) fn normal_freq(&mut self) {
        if let Err(err) = self.freq.normal() {
            log::warn!("[tvout] cpufreq release failed: {}", err);
        }
    }

    /// Emit the external cable notification for `state`
    pub(crate) fn notify(&mut self, state: HpdState) {
        if let Some(env) = state.uevent() {
            self.uevent.emit(env);
            log::debug!("[tvout] uevent {}", env);
        }
    }
}
