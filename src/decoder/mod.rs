//! Device decoding collaborator interface
//!
//! The reconstruction engine never touches raw dive computer bytes. A
//! [`DeviceContext`] resolves device descriptors and builds a [`DiveParser`]
//! over an in-memory buffer; the parser answers whole-dive field queries and
//! replays the decoded value stream through a callback, strictly in order.

pub mod replay;

pub use replay::*;

use serde::Deserialize;
use std::fmt;

use crate::Result;

/// Status codes reported by a decoding backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderStatus {
    Unsupported,
    InvalidArgs,
    NoMemory,
    NoDevice,
    NoAccess,
    Io,
    Timeout,
    Protocol,
    DataFormat,
    Cancelled,
}

impl DecoderStatus {
    /// Numeric status as reported by libdivecomputer-style backends
    pub fn code(self) -> i32 {
        match self {
            DecoderStatus::Unsupported => -1,
            DecoderStatus::InvalidArgs => -2,
            DecoderStatus::NoMemory => -3,
            DecoderStatus::NoDevice => -4,
            DecoderStatus::NoAccess => -5,
            DecoderStatus::Io => -6,
            DecoderStatus::Timeout => -7,
            DecoderStatus::Protocol => -8,
            DecoderStatus::DataFormat => -9,
            DecoderStatus::Cancelled => -10,
        }
    }

    fn label(self) -> &'static str {
        match self {
            DecoderStatus::Unsupported => "unsupported",
            DecoderStatus::InvalidArgs => "invalid arguments",
            DecoderStatus::NoMemory => "out of memory",
            DecoderStatus::NoDevice => "no device",
            DecoderStatus::NoAccess => "access denied",
            DecoderStatus::Io => "input/output error",
            DecoderStatus::Timeout => "timeout",
            DecoderStatus::Protocol => "protocol error",
            DecoderStatus::DataFormat => "data format error",
            DecoderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for DecoderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.label())
    }
}

/// Identity of a supported dive computer model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub vendor: String,
    pub product: String,
    pub model: u32,
}

impl Descriptor {
    pub fn new(vendor: &str, product: &str, model: u32) -> Self {
        Self {
            vendor: vendor.to_string(),
            product: product.to_string(),
            model,
        }
    }

    /// Vendor and product comparison, as the device list is matched by name
    pub fn matches(&self, vendor: &str, product: &str) -> bool {
        self.vendor == vendor && self.product == product
    }
}

/// Vendor decoded when none is requested
pub const DEFAULT_VENDOR: &str = "Divesoft";
/// Product decoded when none is requested
pub const DEFAULT_PRODUCT: &str = "Freedom";

/// Which device descriptor to decode the input with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSelection {
    pub vendor: String,
    pub product: String,
}

impl Default for DeviceSelection {
    fn default() -> Self {
        Self {
            vendor: DEFAULT_VENDOR.to_string(),
            product: DEFAULT_PRODUCT.to_string(),
        }
    }
}

/// Dive start as recorded by the dive computer (local time, no zone)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DiveDateTime {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

/// Tank description; volume in litres, working pressure in bar
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Tank {
    pub volume: f64,
    pub workpressure: f64,
}

/// Event classification, numbered like libdivecomputer's `SAMPLE_EVENT_*`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    None,
    Decostop,
    Rbt,
    Ascent,
    Ceiling,
    Workload,
    Transmitter,
    Violation,
    Bookmark,
    Surface,
    Safetystop,
    Gaschange,
    SafetystopVoluntary,
    SafetystopMandatory,
    Deepstop,
    CeilingSafetystop,
    Floor,
    Divetime,
    Maxdepth,
    Olf,
    Po2,
    Airtime,
    Rgbm,
    Heading,
    Tissuelevel,
    Gaschange2,
    Unknown(u32),
}

const EVENT_KINDS: [EventKind; 26] = [
    EventKind::None,
    EventKind::Decostop,
    EventKind::Rbt,
    EventKind::Ascent,
    EventKind::Ceiling,
    EventKind::Workload,
    EventKind::Transmitter,
    EventKind::Violation,
    EventKind::Bookmark,
    EventKind::Surface,
    EventKind::Safetystop,
    EventKind::Gaschange,
    EventKind::SafetystopVoluntary,
    EventKind::SafetystopMandatory,
    EventKind::Deepstop,
    EventKind::CeilingSafetystop,
    EventKind::Floor,
    EventKind::Divetime,
    EventKind::Maxdepth,
    EventKind::Olf,
    EventKind::Po2,
    EventKind::Airtime,
    EventKind::Rgbm,
    EventKind::Heading,
    EventKind::Tissuelevel,
    EventKind::Gaschange2,
];

impl EventKind {
    pub fn from_code(code: u32) -> Self {
        EVENT_KINDS
            .get(code as usize)
            .copied()
            .unwrap_or(EventKind::Unknown(code))
    }

    /// Look up a kind by its tag, e.g. `"bookmark"`
    pub fn from_tag(tag: &str) -> Option<Self> {
        EVENT_KINDS.iter().copied().find(|kind| kind.tag() == tag)
    }

    /// Type tag used in the rendered document
    ///
    /// Kinds the backend could not classify render as a generic `"marker"`.
    pub fn tag(self) -> &'static str {
        match self {
            EventKind::None => "none",
            EventKind::Decostop => "decostop",
            EventKind::Rbt => "rbt",
            EventKind::Ascent => "ascent",
            EventKind::Ceiling => "ceiling",
            EventKind::Workload => "workload",
            EventKind::Transmitter => "transmitter",
            EventKind::Violation => "violation",
            EventKind::Bookmark => "bookmark",
            EventKind::Surface => "surface",
            EventKind::Safetystop => "safetystop",
            EventKind::Gaschange => "gaschange",
            EventKind::SafetystopVoluntary => "safetystop_voluntary",
            EventKind::SafetystopMandatory => "safetystop_mandatory",
            EventKind::Deepstop => "deepstop",
            EventKind::CeilingSafetystop => "ceiling_safetystop",
            EventKind::Floor => "floor",
            EventKind::Divetime => "divetime",
            EventKind::Maxdepth => "maxdepth",
            EventKind::Olf => "olf",
            EventKind::Po2 => "po2",
            EventKind::Airtime => "airtime",
            EventKind::Rgbm => "rgbm",
            EventKind::Heading => "heading",
            EventKind::Tissuelevel => "tissuelevel",
            EventKind::Gaschange2 => "gaschange2",
            EventKind::Unknown(_) => "marker",
        }
    }
}

/// Event payload delivered with a `SampleValue::Event`
#[derive(Debug, Clone, PartialEq)]
pub struct EventMarker {
    pub kind: EventKind,
    /// Offset in seconds from the sample the event is attached to
    pub time: u32,
    pub flags: u32,
    pub value: u32,
    /// Human readable name, when the backend provides one
    pub name: Option<String>,
}

/// One decoded value from the sample stream
#[derive(Debug, Clone, PartialEq)]
pub enum SampleValue {
    /// Dive time in milliseconds; starts a new sample
    Time(u32),
    /// Depth in metres
    Depth(f64),
    /// Water temperature in degrees Celsius
    Temperature(f64),
    /// Partial pressure of oxygen in bar
    Ppo2(f64),
    Event(EventMarker),
    Pressure { tank: u32, bar: f64 },
    Heading(u32),
    Cns(f64),
    Setpoint(f64),
    /// A value kind the backend reported but this crate does not model
    Unrecognized(String),
}

/// Backend that knows about devices and can build parsers
pub trait DeviceContext {
    /// All descriptors this backend supports, in registry order
    fn descriptors(&self) -> &[Descriptor];

    /// Find the descriptor for a vendor and product
    fn find_descriptor(&self, vendor: &str, product: &str) -> Option<&Descriptor> {
        self.descriptors()
            .iter()
            .find(|descriptor| descriptor.matches(vendor, product))
    }

    /// Build a parser over `data` for the given device
    ///
    /// # Errors
    ///
    /// Returns [`crate::DiveError::ParserInit`] when the buffer cannot be
    /// decoded as a dive from this device.
    fn open_parser<'a>(
        &self,
        descriptor: &Descriptor,
        data: &'a [u8],
    ) -> Result<Box<dyn DiveParser + 'a>>;
}

/// Parser over a single dive
pub trait DiveParser {
    fn datetime(&self) -> Option<DiveDateTime>;

    /// Total dive time in seconds
    fn dive_time(&self) -> Option<u32>;

    fn tank(&self, index: usize) -> Option<Tank>;

    fn serial(&self) -> Option<String>;

    /// Feed every decoded value to `callback`, in stream order
    ///
    /// Iteration stops at the first error returned by the callback, and that
    /// error is returned.
    fn samples_foreach(&mut self, callback: &mut dyn FnMut(SampleValue) -> Result<()>)
        -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_codes() {
        assert_eq!(EventKind::from_code(0), EventKind::None);
        assert_eq!(EventKind::from_code(8), EventKind::Bookmark);
        assert_eq!(EventKind::from_code(25), EventKind::Gaschange2);
        assert_eq!(EventKind::from_code(99), EventKind::Unknown(99));
    }

    #[test]
    fn test_event_kind_tags() {
        assert_eq!(EventKind::Bookmark.tag(), "bookmark");
        assert_eq!(EventKind::Unknown(42).tag(), "marker");
        assert_eq!(EventKind::from_tag("gaschange"), Some(EventKind::Gaschange));
        assert_eq!(EventKind::from_tag("marker"), None);
    }

    #[test]
    fn test_decoder_status_display() {
        assert_eq!(DecoderStatus::DataFormat.to_string(), "-9 (data format error)");
        assert_eq!(DecoderStatus::Unsupported.code(), -1);
    }

    #[test]
    fn test_default_selection_is_freedom() {
        let selection = DeviceSelection::default();
        let descriptor = Descriptor::new("Divesoft", "Freedom", 19);
        assert!(descriptor.matches(&selection.vendor, &selection.product));
        assert!(!descriptor.matches("Divesoft", "Liberty"));
    }
}
