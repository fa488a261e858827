//! Collaborator interfaces consumed by the TV-out sequencer
//!
//! Each trait stands for one external subsystem. All calls may block; none
//! of them is invoked from interrupt context except [`DetectLine::is_connected`].

use alloc::boxed::Box;

use crate::error::HwResult;
use crate::types::{ClockHandle, DisplayMode, LayerId, OutputMode};

/// Voltage regulator consumer handle
pub trait Regulator: Send {
    /// Enable the regulator output
    fn enable(&mut self) -> HwResult;

    /// Disable the regulator output
    fn disable(&mut self) -> HwResult;
}

/// Clock framework consumer
pub trait ClockFramework: Send {
    /// Look up a clock by name
    fn get(&mut self, name: &'static str) -> Option<ClockHandle>;

    /// Release a handle obtained from [`ClockFramework::get`]
    fn put(&mut self, clk: ClockHandle);

    /// Ungate a clock
    fn enable(&mut self, clk: ClockHandle) -> HwResult;

    /// Gate a clock
    fn disable(&mut self, clk: ClockHandle);

    /// Switch the input of a clock mux
    fn set_parent(&mut self, clk: ClockHandle, parent: ClockHandle) -> HwResult;

    /// Program a clock rate in Hz
    fn set_rate(&mut self, clk: ClockHandle, hz: u64) -> HwResult;
}

/// Power-domain framework, addressed by domain name
pub trait PowerDomains: Send {
    fn acquire(&mut self, name: &'static str) -> HwResult;

    fn release(&mut self, name: &'static str) -> HwResult;
}

/// Physical hot-plug detect line
pub trait DetectLine: Send {
    /// Sample the line; `true` when a cable is present
    fn is_connected(&mut self) -> bool;
}

/// CPU frequency policy setter
pub trait FreqPolicy: Send {
    /// Restrict frequency scaling while the TV path is active
    fn restrict(&mut self) -> HwResult;

    /// Return to the normal frequency table
    fn normal(&mut self) -> HwResult;
}

/// External notification sink for cable events
pub trait UeventSink: Send {
    /// Emit one change event carrying a single `KEY=value` field
    fn emit(&mut self, env: &str);
}

/// Blocking delay provider
pub trait Delay: Send {
    fn delay_ms(&mut self, ms: u32);
}

/// Register-level mixer / video processor / HDMI / SDO blocks
pub trait TvOutHardware: Send {
    /// Power the TV block up or down
    fn tv_power(&mut self, on: bool);

    /// Power the HDMI PHY up or down
    fn phy_power(&mut self, on: bool);

    /// Program default interface parameters and the display timing
    fn init_params(&mut self, output: OutputMode, display: DisplayMode);

    /// Start the output interface
    fn output_start(&mut self) -> HwResult;

    /// Stop the output interface; safe on a stopped interface
    fn output_stop(&mut self);

    /// Start compositing a layer
    fn layer_start(&mut self, layer: LayerId) -> HwResult;

    /// Stop compositing a layer; safe on a stopped layer
    fn layer_stop(&mut self, layer: LayerId);
}

/// DDC port used by HDCP authentication
pub trait HdcpPort: Send {
    /// Register the DDC client
    fn attach(&mut self) -> HwResult;

    /// Unregister the DDC client
    fn detach(&mut self);

    /// Arm or disarm HPD detection in the HDCP block
    fn set_hpd_detection(&mut self, on: bool, hdcp_enabled: bool);
}

/// Bundle of collaborator handles handed to the driver at probe time
pub struct Platform {
    /// Main "tvout" rail
    pub regulator: Box<dyn Regulator>,
    /// Secondary "hdmi" rail, only used by variants that carry one
    pub secondary_regulator: Option<Box<dyn Regulator>>,
    pub clocks: Box<dyn ClockFramework>,
    pub domains: Box<dyn PowerDomains>,
    pub detect: Box<dyn DetectLine>,
    pub freq: Box<dyn FreqPolicy>,
    pub uevent: Box<dyn UeventSink>,
    pub delay: Box<dyn Delay>,
    pub hardware: Box<dyn TvOutHardware>,
    pub hdcp: Box<dyn HdcpPort>,
}
