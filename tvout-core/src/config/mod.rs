//! Driver configuration and SoC variant policies
//!
//! A variant is resolved once at startup into a `&'static dyn SocVariant`;
//! nothing below this module branches on the SoC name again, only on the
//! capability set and clock table the policy hands out.

use bitflags::bitflags;
use static_assertions::const_assert;

use tvout_api::{DisplayMode, OutputMode};

/// Depth of the interrupt to worker hand-off queue. The queue keeps one
/// slot free, so it buffers `HPD_QUEUE_DEPTH - 1` samples.
pub const HPD_QUEUE_DEPTH: usize = 8;

const_assert!(HPD_QUEUE_DEPTH >= 2);

/// Settle delay imposed before pulling the rail down during suspend
pub const DEFAULT_RAIL_SETTLE_MS: u32 = 520;

/// VPLL and pixel clock rate programmed at probe
pub const VPLL_RATE_HZ: u64 = 54_000_000;

bitflags! {
    /// Hardware features a SoC variant provides
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Capabilities: u32 {
        /// Clock domains sit behind power domains that must be acquired
        const POWER_DOMAINS = 1 << 0;
        /// Mixer/HDMI special clocks are muxed onto the PHY output and
        /// must be reparented before the PHY goes down
        const EXTERNAL_PHY_MUX = 1 << 1;
        /// An additional "hdmi" rail is switched with the main rail
        const SECONDARY_RAIL = 1 << 2;
        /// The PHY control bus has its own gate clock
        const PHY_BUS_CLOCK = 1 << 3;
    }
}

/// One entry of the gated clock chain
#[derive(Debug, Clone, Copy)]
pub struct GateClock {
    pub clock: &'static str,
    pub domain: Option<&'static str>,
}

/// Clock names used by the driver, in the order the hardware wants them
#[derive(Debug)]
pub struct ClockTable {
    /// Gated chain, in enable order
    pub gate: [GateClock; 4],
    /// PHY control-bus clock
    pub phy_bus: &'static str,
    pub sclk_dac: &'static str,
    pub sclk_mixer: &'static str,
    pub sclk_hdmi: &'static str,
    pub sclk_pixel: &'static str,
    pub sclk_hdmiphy: &'static str,
    /// VPLL chain: ext_xtal, mout_vpll_src, fout_vpll, mout_vpll
    pub vpll: [&'static str; 4],
}

impl ClockTable {
    /// Every long-lived clock the driver acquires at probe
    pub fn persistent(&self) -> [&'static str; 10] {
        [
            self.gate[0].clock,
            self.gate[1].clock,
            self.gate[2].clock,
            self.gate[3].clock,
            self.phy_bus,
            self.sclk_dac,
            self.sclk_mixer,
            self.sclk_hdmi,
            self.sclk_pixel,
            self.sclk_hdmiphy,
        ]
    }

    /// Special clocks left running for the driver lifetime
    pub fn special(&self) -> [&'static str; 3] {
        [self.sclk_dac, self.sclk_mixer, self.sclk_hdmi]
    }
}

static S5P_CLOCKS: ClockTable = ClockTable {
    gate: [
        GateClock { clock: "vp", domain: Some("vp_pd") },
        GateClock { clock: "mixer", domain: Some("mixer_pd") },
        GateClock { clock: "tvenc", domain: Some("tv_enc_pd") },
        GateClock { clock: "hdmi", domain: Some("hdmi_pd") },
    ],
    phy_bus: "i2c-hdmiphy",
    sclk_dac: "sclk_dac",
    sclk_mixer: "sclk_mixer",
    sclk_hdmi: "sclk_hdmi",
    sclk_pixel: "sclk_pixel",
    sclk_hdmiphy: "sclk_hdmiphy",
    vpll: ["ext_xtal", "mout_vpll_src", "fout_vpll", "mout_vpll"],
};

/// Policy describing one SoC generation
pub trait SocVariant: Sync {
    fn name(&self) -> &'static str;

    fn capabilities(&self) -> Capabilities;

    fn clocks(&self) -> &'static ClockTable {
        &S5P_CLOCKS
    }

    fn has(&self, caps: Capabilities) -> bool {
        self.capabilities().contains(caps)
    }
}

/// S5PV210 with the power-domain framework
pub struct S5pv210;

impl SocVariant for S5pv210 {
    fn name(&self) -> &'static str {
        "s5pv210"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::POWER_DOMAINS | Capabilities::EXTERNAL_PHY_MUX | Capabilities::PHY_BUS_CLOCK
    }
}

/// S5PV210 board revision with a separate HDMI rail
pub struct S5pv210Venturi;

impl SocVariant for S5pv210Venturi {
    fn name(&self) -> &'static str {
        "s5pv210-venturi"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::POWER_DOMAINS
            | Capabilities::EXTERNAL_PHY_MUX
            | Capabilities::PHY_BUS_CLOCK
            | Capabilities::SECONDARY_RAIL
    }
}

/// S5PC100, no power-domain framework
pub struct S5pc100;

impl SocVariant for S5pc100 {
    fn name(&self) -> &'static str {
        "s5pc100"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::empty()
    }
}

/// Selectable SoC variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantKind {
    S5pv210,
    S5pv210Venturi,
    S5pc100,
}

impl VariantKind {
    /// Resolve the variant into its policy object
    pub fn policy(self) -> &'static dyn SocVariant {
        match self {
            VariantKind::S5pv210 => &S5pv210,
            VariantKind::S5pv210Venturi => &S5pv210Venturi,
            VariantKind::S5pc100 => &S5pc100,
        }
    }
}

/// Driver configuration
#[derive(Debug, Clone)]
pub struct TvOutConfig {
    /// SoC variant
    pub variant: VariantKind,
    /// Initial output mode
    pub output_mode: OutputMode,
    /// Initial display mode
    pub display_mode: DisplayMode,
    /// Delay before the rail is pulled down while suspending (ms)
    pub rail_settle_ms: u32,
    /// Request HDCP from the start
    pub hdcp: bool,
}

impl Default for TvOutConfig {
    fn default() -> Self {
        Self {
            variant: VariantKind::S5pv210,
            output_mode: OutputMode::Hdmi,
            display_mode: DisplayMode::P720_60,
            rail_settle_ms: DEFAULT_RAIL_SETTLE_MS,
            hdcp: false,
        }
    }
}

impl TvOutConfig {
    pub fn with_variant(mut self, variant: VariantKind) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_output_mode(mut self, mode: OutputMode) -> Self {
        self.output_mode = mode;
        self
    }

    pub fn with_display_mode(mut self, mode: DisplayMode) -> Self {
        self.display_mode = mode;
        self
    }

    pub fn with_rail_settle_ms(mut self, ms: u32) -> Self {
        self.rail_settle_ms = ms;
        self
    }

    pub fn with_hdcp(mut self, enabled: bool) -> Self {
        self.hdcp = enabled;
        self
    }
}
