// Clock handles and the gated clock chain

extern crate alloc;

use alloc::boxed::Box;
use alloc::vec::Vec;
use hashbrown::HashMap;

use tvout_api::error::not_found;
use tvout_api::{ClockFramework, ClockHandle, Error, PowerDomains, Result};

use crate::config::{Capabilities, ClockTable, VPLL_RATE_HZ};
use crate::status::TvOutputStatus;

/// Named clock handles acquired from the clock framework
///
/// Handles are acquired once at probe and released at remove.
pub struct ClockSet {
    framework: Box<dyn ClockFramework>,
    handles: HashMap<&'static str, ClockHandle>,
}

impl ClockSet {
    pub fn new(framework: Box<dyn ClockFramework>) -> Self {
        Self {
            framework,
            handles: HashMap::new(),
        }
    }

    /// Acquire and remember a clock
    pub fn acquire(&mut self, name: &'static str) -> Result<ClockHandle> {
        if let Some(clk) = self.handles.get(name) {
            return Ok(*clk);
        }
        match self.framework.get(name) {
            Some(clk) => {
                self.handles.insert(name, clk);
                Ok(clk)
            }
            None => {
                log::error!("[tvout] failed to find clock \"{}\"", name);
                Err(not_found(name))
            }
        }
    }

    /// Acquire every persistent clock in the table
    pub fn acquire_all(&mut self, table: &ClockTable) -> Result<()> {
        for name in table.persistent() {
            self.acquire(name)?;
        }
        Ok(())
    }

    pub fn handle(&self, name: &'static str) -> Result<ClockHandle> {
        self.handles.get(name).copied().ok_or(not_found(name))
    }

    pub fn enable(&mut self, name: &'static str) -> Result<()> {
        let clk = self.handle(name)?;
        self.framework.enable(clk).map_err(Error::Hardware)
    }

    pub fn disable(&mut self, name: &'static str) -> Result<()> {
        let clk = self.handle(name)?;
        self.framework.disable(clk);
        Ok(())
    }

    pub fn set_parent(&mut self, name: &'static str, parent: &'static str) -> Result<()> {
        let clk = self.handle(name)?;
        let parent = self.handle(parent)?;
        self.framework.set_parent(clk, parent).map_err(Error::Hardware)
    }

    /// Route the VPLL to the DAC and program the 54 MHz pixel rate, then
    /// start the special clocks.
    ///
    /// The VPLL chain handles are only needed while programming and are
    /// released before returning.
    pub fn configure_vpll(&mut self, table: &ClockTable) -> Result<()> {
        let [xtal_name, src_name, fout_name, mout_name] = table.vpll;
        let mut transient: Vec<ClockHandle> = Vec::with_capacity(table.vpll.len());
        for name in table.vpll {
            match self.framework.get(name) {
                Some(clk) => transient.push(clk),
                None => {
                    log::error!("[tvout] failed to find clock \"{}\"", name);
                    for clk in transient {
                        self.framework.put(clk);
                    }
                    return Err(not_found(name));
                }
            }
        }
        let (xtal, src, fout, mout) = (transient[0], transient[1], transient[2], transient[3]);
        log::debug!(
            "[tvout] vpll chain {} -> {} -> {} -> {}",
            xtal_name,
            src_name,
            fout_name,
            mout_name
        );

        let result = self.program_vpll(table, xtal, src, fout, mout);

        for clk in transient {
            self.framework.put(clk);
        }
        result
    }

    fn program_vpll(
        &mut self,
        table: &ClockTable,
        xtal: ClockHandle,
        src: ClockHandle,
        fout: ClockHandle,
        mout: ClockHandle,
    ) -> Result<()> {
        let fw = &mut self.framework;
        fw.set_parent(src, xtal).map_err(Error::Hardware)?;
        fw.set_parent(mout, fout).map_err(Error::Hardware)?;

        // sclk_dac's parent is fixed as mout_vpll
        let dac = self.handles.get(table.sclk_dac).copied().ok_or(not_found(table.sclk_dac))?;
        fw.set_parent(dac, mout).map_err(Error::Hardware)?;

        let pixel = self
            .handles
            .get(table.sclk_pixel)
            .copied()
            .ok_or(not_found(table.sclk_pixel))?;
        fw.set_rate(fout, VPLL_RATE_HZ).map_err(Error::Hardware)?;
        fw.set_rate(pixel, VPLL_RATE_HZ).map_err(Error::Hardware)?;

        for name in table.special() {
            let clk = self.handles.get(name).copied().ok_or(not_found(name))?;
            fw.enable(clk).map_err(Error::Hardware)?;
        }
        for clk in [src, fout, mout] {
            fw.enable(clk).map_err(Error::Hardware)?;
        }
        Ok(())
    }

    /// Stop the special clocks started by [`ClockSet::configure_vpll`]
    pub fn stop_special(&mut self, table: &ClockTable) {
        for name in table.special() {
            if let Err(err) = self.disable(name) {
                log::warn!("[tvout] {}", err);
            }
        }
    }

    /// Release every acquired handle
    pub fn release_all(&mut self) {
        for (_, clk) in self.handles.drain() {
            self.framework.put(clk);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// Gates the VP, mixer, TV-encoder and HDMI clock domains as one unit
pub struct ClockGate {
    domains: Box<dyn PowerDomains>,
    table: &'static ClockTable,
    caps: Capabilities,
}

impl ClockGate {
    pub fn new(domains: Box<dyn PowerDomains>, table: &'static ClockTable, caps: Capabilities) -> Self {
        Self { domains, table, caps }
    }

    /// Gate the chain on or off.
    ///
    /// Enabling walks VP, mixer, TV encoder, HDMI; for each the power domain
    /// is acquired before its clock is ungated. Disabling walks the same
    /// chain in reverse, gating each clock before releasing its domain.
    ///
    /// A power-domain failure aborts immediately with
    /// [`Error::ClockDomain`]. Nothing already gated is rolled back and the
    /// latch is left untouched; callers must treat this as fatal.
    pub fn gate(&mut self, on: bool, clocks: &mut ClockSet, status: &mut TvOutputStatus) -> Result<()> {
        if status.clocks_on == on {
            log::debug!("[tvout] clocks already {}", if on { "on" } else { "off" });
            return Ok(());
        }

        let use_domains = self.caps.contains(Capabilities::POWER_DOMAINS);
        if on {
            for entry in self.table.gate.iter() {
                if let (true, Some(domain)) = (use_domains, entry.domain) {
                    if self.domains.acquire(domain).is_err() {
                        log::error!("[tvout] the power is not on for {}", domain);
                        return Err(Error::ClockDomain { domain });
                    }
                }
                clocks.enable(entry.clock)?;
            }
        } else {
            for entry in self.table.gate.iter().rev() {
                clocks.disable(entry.clock)?;
                if let (true, Some(domain)) = (use_domains, entry.domain) {
                    if self.domains.release(domain).is_err() {
                        log::error!("[tvout] the power is not off for {}", domain);
                        return Err(Error::ClockDomain { domain });
                    }
                }
            }
        }

        status.clocks_on = on;
        log::debug!("[tvout] clocks gated {}", if on { "on" } else { "off" });
        Ok(())
    }
}
