//! Core types used throughout the TV-out sequencer

use core::fmt;
use core::num::NonZeroU64;

use bitflags::bitflags;

/// Recorded hot-plug detect state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HpdState {
    /// No sample has been evaluated yet
    #[default]
    Unknown,
    /// Cable absent
    Disconnected,
    /// Cable present
    Connected,
}

impl HpdState {
    /// Maps a raw detect-line reading to a state
    pub fn from_line(connected: bool) -> Self {
        if connected {
            HpdState::Connected
        } else {
            HpdState::Disconnected
        }
    }

    pub fn is_connected(self) -> bool {
        self == HpdState::Connected
    }

    /// Payload of the external cable notification for this state
    pub fn uevent(self) -> Option<&'static str> {
        match self {
            HpdState::Connected => Some("HDMI_STATE=online"),
            HpdState::Disconnected => Some("HDMI_STATE=offline"),
            HpdState::Unknown => None,
        }
    }
}

impl fmt::Display for HpdState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HpdState::Unknown => "unknown",
            HpdState::Disconnected => "disconnected",
            HpdState::Connected => "connected",
        };
        f.write_str(s)
    }
}

/// Output signal standard
///
/// Ordered so that every digital mode compares greater than or equal to
/// `Hdmi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OutputMode {
    /// Analog composite
    Composite,
    /// Analog S-Video
    SVideo,
    /// HDMI, YCbCr
    Hdmi,
    /// HDMI, RGB
    HdmiRgb,
    /// DVI
    Dvi,
}

impl OutputMode {
    /// Whether this mode drives the digital PHY
    pub fn is_digital(self) -> bool {
        self >= OutputMode::Hdmi
    }

    /// Analog outputs carry only the SD broadcast standards, digital
    /// outputs only the HD/ED timings
    pub fn supports(self, display: DisplayMode) -> bool {
        self.is_digital() != display.is_broadcast()
    }
}

/// Display resolution and timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Ntsc,
    Pal,
    P480_60,
    P576_50,
    P720_60,
    P720_50,
    I1080_60,
    P1080_60,
}

impl DisplayMode {
    /// NTSC or PAL
    pub fn is_broadcast(self) -> bool {
        matches!(self, DisplayMode::Ntsc | DisplayMode::Pal)
    }
}

/// Overlay layer composited into the output signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerId {
    /// Video processor layer
    Video,
    /// First graphic overlay
    Graphic0,
    /// Second graphic overlay
    Graphic1,
}

impl LayerId {
    /// All layers in start order
    pub const ALL: [LayerId; 3] = [LayerId::Video, LayerId::Graphic0, LayerId::Graphic1];

    /// Resolves a device-node layer index (0 = video, 1/2 = graphic overlays)
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        match self {
            LayerId::Video => 0,
            LayerId::Graphic0 => 1,
            LayerId::Graphic1 => 2,
        }
    }

    pub fn mask(self) -> LayerMask {
        match self {
            LayerId::Video => LayerMask::VIDEO,
            LayerId::Graphic0 => LayerMask::GRAPHIC0,
            LayerId::Graphic1 => LayerMask::GRAPHIC1,
        }
    }
}

bitflags! {
    /// Set of layers
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LayerMask: u8 {
        const VIDEO = 1 << 0;
        const GRAPHIC0 = 1 << 1;
        const GRAPHIC1 = 1 << 2;
    }
}

/// Opaque handle to a clock acquired from the clock framework
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClockHandle(pub u32);

/// Opaque token bound to the session that opened a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionToken(NonZeroU64);

impl SessionToken {
    pub fn new(raw: NonZeroU64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }
}
