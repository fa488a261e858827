// Power rail, clock gate and PHY controllers
//
// The three leaves of the sequencing chain. Each keeps its latch in
// `TvOutputStatus` so the orchestrators above can call them without
// tracking edges themselves.

pub mod clock;
pub mod phy;

extern crate alloc;

use alloc::boxed::Box;

use tvout_api::{Delay, Error, Regulator, Result};

use crate::status::TvOutputStatus;

pub use clock::{ClockGate, ClockSet};
pub use phy::PhyPower;

/// Shared TV-out voltage rail
///
/// The underlying regulator is touched only on off→on and on→off edges,
/// and the latch flips only after the regulator call succeeded.
pub struct PowerRail {
    primary: Box<dyn Regulator>,
    secondary: Option<Box<dyn Regulator>>,
    delay: Box<dyn Delay>,
    settle_ms: u32,
}

impl PowerRail {
    pub fn new(primary: Box<dyn Regulator>, delay: Box<dyn Delay>, settle_ms: u32) -> Self {
        Self {
            primary,
            secondary: None,
            delay,
            settle_ms,
        }
    }

    /// Switch an additional regulator together with the main one
    pub fn with_secondary(mut self, secondary: Box<dyn Regulator>) -> Self {
        self.secondary = Some(secondary);
        self
    }

    pub fn enable(&mut self, status: &mut TvOutputStatus) -> Result<()> {
        if status.rail_on {
            log::debug!("[tvout] rail already on");
            return Ok(());
        }

        if let Some(secondary) = self.secondary.as_mut() {
            secondary.enable().map_err(Error::Power)?;
        }

        if let Err(err) = self.primary.enable() {
            log::error!("[tvout] rail enable failed: {}", err);
            if let Some(secondary) = self.secondary.as_mut() {
                if let Err(undo) = secondary.disable() {
                    log::warn!("[tvout] secondary rail left on: {}", undo);
                }
            }
            return Err(Error::Power(err));
        }

        status.rail_on = true;
        log::debug!("[tvout] rail enabled");
        Ok(())
    }

    pub fn disable(&mut self, status: &mut TvOutputStatus) -> Result<()> {
        if !status.rail_on {
            log::debug!("[tvout] rail already off");
            return Ok(());
        }

        if status.suspending {
            // wait for wakeup
            self.delay.delay_ms(self.settle_ms);
        }

        if let Err(err) = self.primary.disable() {
            log::error!("[tvout] rail disable failed: {}", err);
            return Err(Error::Power(err));
        }
        status.rail_on = false;

        if let Some(secondary) = self.secondary.as_mut() {
            secondary.disable().map_err(Error::Power)?;
        }

        log::debug!("[tvout] rail disabled");
        Ok(())
    }
}
