//! Single source of truth for cable, suspend, pipeline and layer state
//!
//! `TvOutputStatus` is owned by the driver and only mutated by the thread
//! holding the transition lock. Layer and pipeline `enabled` flags record
//! user intent; the `running` flags record what the hardware is doing. The
//! two diverge across a cable pull or a suspend.

use tvout_api::{DisplayMode, HpdState, LayerId, LayerMask, OutputMode, SessionToken};

use crate::config::TvOutConfig;

/// Per-layer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layer {
    pub id: LayerId,
    /// User intent: the layer should be composited whenever the output runs
    pub enabled: bool,
    /// The layer hardware is currently started
    pub running: bool,
    /// Session owning the layer while enabled
    pub owner: Option<SessionToken>,
}

impl Layer {
    const fn new(id: LayerId) -> Self {
        Self {
            id,
            enabled: false,
            running: false,
            owner: None,
        }
    }
}

/// Driver-wide TV-out state
#[derive(Debug)]
pub struct TvOutputStatus {
    /// Last evaluated cable state
    pub hpd: HpdState,
    /// A suspend has started and the matching resume has not finished
    pub suspending: bool,
    /// Output pipeline opened by the user
    pub output_enabled: bool,
    /// Output interface hardware started
    pub output_running: bool,
    /// Video, graphic 0, graphic 1
    pub layers: [Layer; 3],
    /// HDCP requested by the user
    pub hdcp_requested: bool,
    pub output_mode: OutputMode,
    pub display_mode: DisplayMode,
    /// Rail latch
    pub rail_on: bool,
    /// Clock gate latch
    pub clocks_on: bool,
    /// PHY latch
    pub phy_on: bool,
}

impl TvOutputStatus {
    pub fn new(config: &TvOutConfig) -> Self {
        Self {
            hpd: HpdState::Unknown,
            suspending: false,
            output_enabled: false,
            output_running: false,
            layers: [
                Layer::new(LayerId::Video),
                Layer::new(LayerId::Graphic0),
                Layer::new(LayerId::Graphic1),
            ],
            hdcp_requested: config.hdcp,
            output_mode: config.output_mode,
            display_mode: config.display_mode,
            rail_on: false,
            clocks_on: false,
            phy_on: false,
        }
    }

    pub fn layer(&self, id: LayerId) -> &Layer {
        &self.layers[id.index()]
    }

    pub fn layer_mut(&mut self, id: LayerId) -> &mut Layer {
        &mut self.layers[id.index()]
    }

    /// Layers the user wants composited
    pub fn enabled_layers(&self) -> LayerMask {
        self.layers
            .iter()
            .filter(|layer| layer.enabled)
            .fold(LayerMask::empty(), |mask, layer| mask | layer.id.mask())
    }

    /// Layers whose hardware is started
    pub fn running_layers(&self) -> LayerMask {
        self.layers
            .iter()
            .filter(|layer| layer.running)
            .fold(LayerMask::empty(), |mask, layer| mask | layer.id.mask())
    }

    /// Whether the active output mode needs the digital PHY
    pub fn needs_phy(&self) -> bool {
        self.output_mode.is_digital()
    }

    /// Whether the output may be driven right now
    pub fn output_live(&self) -> bool {
        self.hpd.is_connected() && !self.suspending
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            hpd: self.hpd,
            suspending: self.suspending,
            output_enabled: self.output_enabled,
            output_running: self.output_running,
            enabled_layers: self.enabled_layers(),
            running_layers: self.running_layers(),
            hdcp_requested: self.hdcp_requested,
            rail_on: self.rail_on,
            clocks_on: self.clocks_on,
            phy_on: self.phy_on,
        }
    }
}

/// Copy of the observable state, taken under the transition lock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub hpd: HpdState,
    pub suspending: bool,
    pub output_enabled: bool,
    pub output_running: bool,
    pub enabled_layers: LayerMask,
    pub running_layers: LayerMask,
    pub hdcp_requested: bool,
    pub rail_on: bool,
    pub clocks_on: bool,
    pub phy_on: bool,
}

impl StatusSnapshot {
    /// User-intent flags only: pipeline enabled plus the enabled layer set
    pub fn intent(&self) -> (bool, LayerMask) {
        (self.output_enabled, self.enabled_layers)
    }
}
