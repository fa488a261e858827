// HDMI PHY power controller

use tvout_api::error::precedence_violation;
use tvout_api::{Result, TvOutHardware};

use crate::config::{Capabilities, ClockTable};
use crate::power::ClockSet;
use crate::status::TvOutputStatus;

/// Powers the output PHY.
///
/// The PHY control bus is clocked from the gated chain, so the clock gate
/// must be on before the PHY may be enabled.
pub struct PhyPower {
    table: &'static ClockTable,
    caps: Capabilities,
}

impl PhyPower {
    pub fn new(table: &'static ClockTable, caps: Capabilities) -> Self {
        Self { table, caps }
    }

    pub fn set_power(
        &mut self,
        on: bool,
        status: &mut TvOutputStatus,
        clocks: &mut ClockSet,
        hw: &mut dyn TvOutHardware,
    ) -> Result<()> {
        if on {
            self.power_on(status, clocks, hw)
        } else {
            self.power_off(status, clocks, hw)
        }
    }

    fn power_on(
        &mut self,
        status: &mut TvOutputStatus,
        clocks: &mut ClockSet,
        hw: &mut dyn TvOutHardware,
    ) -> Result<()> {
        if !status.clocks_on {
            log::error!("[tvout] phy enable requested with clocks gated off");
            return Err(precedence_violation("phy enabled before clock gate"));
        }
        if status.phy_on {
            log::debug!("[tvout] phy already on");
            return Ok(());
        }

        hw.tv_power(true);
        if self.caps.contains(Capabilities::PHY_BUS_CLOCK) {
            clocks.enable(self.table.phy_bus)?;
        }
        hw.phy_power(true);

        status.phy_on = true;
        log::debug!("[tvout] phy on");
        Ok(())
    }

    fn power_off(
        &mut self,
        status: &mut TvOutputStatus,
        clocks: &mut ClockSet,
        hw: &mut dyn TvOutHardware,
    ) -> Result<()> {
        // Reparent mixer and HDMI clocks onto internal sources on every
        // disable; orphaned muxes hang the HDMI block on restart.
        if self.caps.contains(Capabilities::EXTERNAL_PHY_MUX) {
            clocks.set_parent(self.table.sclk_mixer, self.table.sclk_dac)?;
            clocks.set_parent(self.table.sclk_hdmi, self.table.sclk_pixel)?;
        }

        if !status.phy_on {
            log::debug!("[tvout] phy already off");
            return Ok(());
        }

        hw.phy_power(false);
        if self.caps.contains(Capabilities::PHY_BUS_CLOCK) {
            clocks.disable(self.table.phy_bus)?;
        }
        hw.tv_power(false);

        status.phy_on = false;
        log::debug!("[tvout] phy off");
        Ok(())
    }

    /// Boot-time cut-off: leave the PHY powered down whatever state the
    /// bootloader left it in. Requires the clock gate to be on.
    pub fn cut_off(
        &mut self,
        status: &mut TvOutputStatus,
        clocks: &mut ClockSet,
        hw: &mut dyn TvOutHardware,
    ) -> Result<()> {
        if !status.clocks_on {
            return Err(precedence_violation("phy cut-off before clock gate"));
        }
        let bus_clock = self.caps.contains(Capabilities::PHY_BUS_CLOCK);
        if bus_clock {
            clocks.enable(self.table.phy_bus)?;
        }
        hw.phy_power(false);
        if bus_clock {
            clocks.disable(self.table.phy_bus)?;
        }
        status.phy_on = false;
        Ok(())
    }
}
