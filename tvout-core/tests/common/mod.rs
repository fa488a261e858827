//! Common test utilities for tvout-core integration tests
//!
//! `Rig` hands out a fake `Platform` whose collaborators all append to one
//! shared trace, so tests can assert on the exact ordering of regulator,
//! clock, power-domain and display-hardware calls.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tvout_api::{
    ClockFramework, ClockHandle, Delay, DetectLine, DisplayMode, FreqPolicy, HdcpPort, HwError,
    HwResult, LayerId, OutputMode, Platform, PowerDomains, Regulator, TvOutHardware, UeventSink,
};
use tvout_core::{TvOut, TvOutConfig};

/// One recorded collaborator call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ev {
    RailOn,
    RailOff,
    SecondaryOn,
    SecondaryOff,
    ClockOn(&'static str),
    ClockOff(&'static str),
    Parent(&'static str, &'static str),
    Rate(&'static str, u64),
    DomainUp(&'static str),
    DomainDown(&'static str),
    TvPower(bool),
    PhyPower(bool),
    InitParams(OutputMode, DisplayMode),
    OutputStart,
    OutputStop,
    LayerStart(LayerId),
    LayerStop(LayerId),
    Restrict,
    Normal,
    Uevent(String),
    Delay(u32),
    HdcpAttach,
    HdcpDetach,
    HdcpHpd(bool),
}

pub type Trace = Arc<Mutex<Vec<Ev>>>;

/// Failure injection knobs shared with the fakes
#[derive(Default)]
pub struct Knobs {
    pub fail_domain: Mutex<Option<&'static str>>,
    pub missing_clock: Mutex<Option<&'static str>>,
    pub fail_rail: AtomicBool,
    pub fail_restrict: AtomicBool,
    pub fail_layer_start: AtomicBool,
    /// Clock handles obtained and not yet put back
    pub live_handles: AtomicUsize,
}

fn record(trace: &Trace, ev: Ev) {
    trace.lock().unwrap().push(ev);
}

struct FakeRegulator {
    trace: Trace,
    knobs: Arc<Knobs>,
    secondary: bool,
}

impl Regulator for FakeRegulator {
    fn enable(&mut self) -> HwResult {
        if !self.secondary && self.knobs.fail_rail.load(Ordering::SeqCst) {
            return Err(HwError::IO);
        }
        record(&self.trace, if self.secondary { Ev::SecondaryOn } else { Ev::RailOn });
        Ok(())
    }

    fn disable(&mut self) -> HwResult {
        record(&self.trace, if self.secondary { Ev::SecondaryOff } else { Ev::RailOff });
        Ok(())
    }
}

struct FakeClocks {
    trace: Trace,
    knobs: Arc<Knobs>,
    names: Vec<&'static str>,
}

impl FakeClocks {
    fn name(&self, clk: ClockHandle) -> &'static str {
        self.names[clk.0 as usize]
    }
}

impl ClockFramework for FakeClocks {
    fn get(&mut self, name: &'static str) -> Option<ClockHandle> {
        if *self.knobs.missing_clock.lock().unwrap() == Some(name) {
            return None;
        }
        self.names.push(name);
        self.knobs.live_handles.fetch_add(1, Ordering::SeqCst);
        Some(ClockHandle(self.names.len() as u32 - 1))
    }

    fn put(&mut self, _clk: ClockHandle) {
        self.knobs.live_handles.fetch_sub(1, Ordering::SeqCst);
    }

    fn enable(&mut self, clk: ClockHandle) -> HwResult {
        record(&self.trace, Ev::ClockOn(self.name(clk)));
        Ok(())
    }

    fn disable(&mut self, clk: ClockHandle) {
        record(&self.trace, Ev::ClockOff(self.name(clk)));
    }

    fn set_parent(&mut self, clk: ClockHandle, parent: ClockHandle) -> HwResult {
        record(&self.trace, Ev::Parent(self.name(clk), self.name(parent)));
        Ok(())
    }

    fn set_rate(&mut self, clk: ClockHandle, hz: u64) -> HwResult {
        record(&self.trace, Ev::Rate(self.name(clk), hz));
        Ok(())
    }
}

struct FakeDomains {
    trace: Trace,
    knobs: Arc<Knobs>,
}

impl PowerDomains for FakeDomains {
    fn acquire(&mut self, name: &'static str) -> HwResult {
        if *self.knobs.fail_domain.lock().unwrap() == Some(name) {
            return Err(HwError::IO);
        }
        record(&self.trace, Ev::DomainUp(name));
        Ok(())
    }

    fn release(&mut self, name: &'static str) -> HwResult {
        record(&self.trace, Ev::DomainDown(name));
        Ok(())
    }
}

struct FakeDetect(Arc<AtomicBool>);

impl DetectLine for FakeDetect {
    fn is_connected(&mut self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

struct FakeFreq {
    trace: Trace,
    knobs: Arc<Knobs>,
}

impl FreqPolicy for FakeFreq {
    fn restrict(&mut self) -> HwResult {
        if self.knobs.fail_restrict.load(Ordering::SeqCst) {
            return Err(HwError::INVALID);
        }
        record(&self.trace, Ev::Restrict);
        Ok(())
    }

    fn normal(&mut self) -> HwResult {
        record(&self.trace, Ev::Normal);
        Ok(())
    }
}

struct FakeUevent(Trace);

impl UeventSink for FakeUevent {
    fn emit(&mut self, env: &str) {
        record(&self.0, Ev::Uevent(env.to_string()));
    }
}

struct FakeDelay(Trace);

impl Delay for FakeDelay {
    fn delay_ms(&mut self, ms: u32) {
        record(&self.0, Ev::Delay(ms));
    }
}

struct FakeHardware {
    trace: Trace,
    knobs: Arc<Knobs>,
}

impl TvOutHardware for FakeHardware {
    fn tv_power(&mut self, on: bool) {
        record(&self.trace, Ev::TvPower(on));
    }

    fn phy_power(&mut self, on: bool) {
        record(&self.trace, Ev::PhyPower(on));
    }

    fn init_params(&mut self, output: OutputMode, display: DisplayMode) {
        record(&self.trace, Ev::InitParams(output, display));
    }

    fn output_start(&mut self) -> HwResult {
        record(&self.trace, Ev::OutputStart);
        Ok(())
    }

    fn output_stop(&mut self) {
        record(&self.trace, Ev::OutputStop);
    }

    fn layer_start(&mut self, layer: LayerId) -> HwResult {
        if self.knobs.fail_layer_start.load(Ordering::SeqCst) {
            return Err(HwError::IO);
        }
        record(&self.trace, Ev::LayerStart(layer));
        Ok(())
    }

    fn layer_stop(&mut self, layer: LayerId) {
        record(&self.trace, Ev::LayerStop(layer));
    }
}

struct FakeHdcp(Trace);

impl HdcpPort for FakeHdcp {
    fn attach(&mut self) -> HwResult {
        record(&self.0, Ev::HdcpAttach);
        Ok(())
    }

    fn detach(&mut self) {
        record(&self.0, Ev::HdcpDetach);
    }

    fn set_hpd_detection(&mut self, on: bool, _hdcp_enabled: bool) {
        record(&self.0, Ev::HdcpHpd(on));
    }
}

/// Shared handles onto one fake platform
#[derive(Clone)]
pub struct Rig {
    pub trace: Trace,
    pub cable: Arc<AtomicBool>,
    pub knobs: Arc<Knobs>,
}

impl Rig {
    pub fn new(connected: bool) -> Self {
        Self {
            trace: Arc::new(Mutex::new(Vec::new())),
            cable: Arc::new(AtomicBool::new(connected)),
            knobs: Arc::new(Knobs::default()),
        }
    }

    pub fn platform(&self) -> Platform {
        Platform {
            regulator: Box::new(FakeRegulator {
                trace: self.trace.clone(),
                knobs: self.knobs.clone(),
                secondary: false,
            }),
            secondary_regulator: Some(Box::new(FakeRegulator {
                trace: self.trace.clone(),
                knobs: self.knobs.clone(),
                secondary: true,
            })),
            clocks: Box::new(FakeClocks {
                trace: self.trace.clone(),
                knobs: self.knobs.clone(),
                names: Vec::new(),
            }),
            domains: Box::new(FakeDomains {
                trace: self.trace.clone(),
                knobs: self.knobs.clone(),
            }),
            detect: Box::new(FakeDetect(self.cable.clone())),
            freq: Box::new(FakeFreq {
                trace: self.trace.clone(),
                knobs: self.knobs.clone(),
            }),
            uevent: Box::new(FakeUevent(self.trace.clone())),
            delay: Box::new(FakeDelay(self.trace.clone())),
            hardware: Box::new(FakeHardware {
                trace: self.trace.clone(),
                knobs: self.knobs.clone(),
            }),
            hdcp: Box::new(FakeHdcp(self.trace.clone())),
        }
    }

    pub fn plug(&self, connected: bool) {
        self.cable.store(connected, Ordering::SeqCst);
    }

    pub fn fail_domain(&self, domain: Option<&'static str>) {
        *self.knobs.fail_domain.lock().unwrap() = domain;
    }

    pub fn events(&self) -> Vec<Ev> {
        self.trace.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.trace.lock().unwrap().clear();
    }

    pub fn count(&self, ev: &Ev) -> usize {
        self.events().iter().filter(|e| *e == ev).count()
    }

    pub fn position(&self, ev: &Ev) -> Option<usize> {
        self.events().iter().position(|e| e == ev)
    }

    pub fn last_position(&self, ev: &Ev) -> Option<usize> {
        self.events().iter().rposition(|e| e == ev)
    }

    /// Assert `events` appear in the trace in this relative order
    pub fn assert_order(&self, events: &[Ev]) {
        let trace = self.events();
        let mut from = 0;
        for ev in events {
            match trace[from..].iter().position(|e| e == ev) {
                Some(offset) => from += offset + 1,
                None => panic!("{:?} missing or out of order in {:?}", ev, trace),
            }
        }
    }

    /// Probe the driver, resolve the boot sample and clear the trace
    pub fn probe(&self, config: TvOutConfig) -> TvOut {
        let tvout = TvOut::probe(config, self.platform()).expect("probe");
        tvout.run_deferred_work().expect("boot sample");
        self.clear();
        tvout
    }
}

/// Every PHY power-up in the trace follows an ungated HDMI clock that has
/// not been gated again since
pub fn phy_never_precedes_gate(trace: &[Ev]) -> bool {
    let mut gated_on = false;
    for ev in trace {
        match ev {
            Ev::ClockOn("hdmi") => gated_on = true,
            Ev::ClockOff("hdmi") => gated_on = false,
            Ev::PhyPower(true) if !gated_on => return false,
            _ => {}
        }
    }
    true
}

/// Re-plug the cable and run the worker
pub fn replug(rig: &Rig, tvout: &TvOut, connected: bool) -> tvout_api::Result<usize> {
    rig.plug(connected);
    tvout.notify_cable_change();
    tvout.run_deferred_work()
}
