//! Replay backend for decoded dive captures
//!
//! A capture is a JSON document holding what a device decoder produced for one
//! dive: the device identity, the whole-dive header fields and the ordered list
//! of typed sample values. Replaying it drives the reconstruction engine exactly
//! like a live decoder would.
//!
//! ```json
//! {
//!   "vendor": "Divesoft",
//!   "product": "Freedom",
//!   "serial": "1234",
//!   "datetime": { "year": 2024, "month": 5, "day": 1, "hour": 9, "minute": 30, "second": 0 },
//!   "divetime": 2712,
//!   "tanks": [{ "volume": 11.1, "workpressure": 232.0 }],
//!   "samples": [
//!     { "type": "time", "value": 0 },
//!     { "type": "depth", "value": 1.5 },
//!     { "type": "event", "value": { "kind": "bookmark", "time": 0 } }
//!   ]
//! }
//! ```

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{
    DecoderStatus, Descriptor, DeviceContext, DiveDateTime, DiveParser, EventKind, EventMarker,
    SampleValue, Tank,
};
use crate::error::DiveError;
use crate::Result;

/// Devices registered by [`ReplayContext::with_builtin_devices`]
const BUILTIN_DEVICES: &[(&str, &str, u32)] = &[
    ("Divesoft", "Freedom", 19),
    ("Divesoft", "Liberty", 10),
    ("Heinrichs Weikamp", "OSTC 3", 0x0A),
    ("Shearwater", "Petrel", 3),
    ("Shearwater", "Perdix", 5),
    ("Suunto", "EON Steel", 0),
];

/// Device context that replays JSON captures
pub struct ReplayContext {
    descriptors: Vec<Descriptor>,
}

impl ReplayContext {
    /// Create a context over an explicit descriptor registry
    ///
    /// # Errors
    ///
    /// Returns [`DiveError::DecoderInit`] when the registry is empty, since no
    /// parser could ever be built from it.
    pub fn new(descriptors: Vec<Descriptor>) -> Result<Self> {
        if descriptors.is_empty() {
            return Err(DiveError::DecoderInit(DecoderStatus::NoDevice));
        }
        debug!("replay context ready with {} descriptors", descriptors.len());
        Ok(Self { descriptors })
    }

    pub fn with_builtin_devices() -> Result<Self> {
        Self::new(
            BUILTIN_DEVICES
                .iter()
                .map(|&(vendor, product, model)| Descriptor::new(vendor, product, model))
                .collect(),
        )
    }
}

impl DeviceContext for ReplayContext {
    fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    fn open_parser<'a>(
        &self,
        descriptor: &Descriptor,
        data: &'a [u8],
    ) -> Result<Box<dyn DiveParser + 'a>> {
        let capture: Capture = serde_json::from_slice(data).map_err(|e| DiveError::ParserInit {
            status: DecoderStatus::DataFormat,
            message: format!("not a dive capture: {e}"),
        })?;

        if !descriptor.matches(&capture.vendor, &capture.product) {
            return Err(DiveError::ParserInit {
                status: DecoderStatus::Unsupported,
                message: format!(
                    "capture was recorded from {} {}, not {} {}",
                    capture.vendor, capture.product, descriptor.vendor, descriptor.product
                ),
            });
        }

        let values = capture
            .samples
            .into_iter()
            .enumerate()
            .map(|(position, raw)| {
                raw.into_sample_value().map_err(|message| DiveError::ParserInit {
                    status: DecoderStatus::DataFormat,
                    message: format!("sample value {position}: {message}"),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Box::new(ReplayParser {
            datetime: capture.datetime,
            divetime: capture.divetime,
            tanks: capture.tanks,
            serial: capture.serial,
            values,
        }))
    }
}

#[derive(Deserialize)]
struct Capture {
    vendor: String,
    product: String,
    #[serde(default)]
    serial: Option<String>,
    #[serde(default)]
    datetime: Option<DiveDateTime>,
    #[serde(default)]
    divetime: Option<u32>,
    #[serde(default)]
    tanks: Vec<Tank>,
    #[serde(default)]
    samples: Vec<RawValue>,
}

#[derive(Deserialize)]
struct RawValue {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    value: Value,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEventKind {
    Code(u32),
    Tag(String),
}

#[derive(Deserialize)]
struct RawEvent {
    kind: RawEventKind,
    #[serde(default)]
    time: u32,
    #[serde(default)]
    flags: u32,
    #[serde(default)]
    value: u32,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Deserialize)]
struct RawPressure {
    tank: u32,
    value: f64,
}

impl RawValue {
    fn into_sample_value(self) -> std::result::Result<SampleValue, String> {
        let value = self.value;
        let sample = match self.kind.as_str() {
            "time" => SampleValue::Time(as_u32(&value)?),
            "depth" => SampleValue::Depth(as_f64(&value)?),
            "temperature" => SampleValue::Temperature(as_f64(&value)?),
            "ppo2" => SampleValue::Ppo2(as_f64(&value)?),
            "cns" => SampleValue::Cns(as_f64(&value)?),
            "setpoint" => SampleValue::Setpoint(as_f64(&value)?),
            "heading" => SampleValue::Heading(as_u32(&value)?),
            "pressure" => {
                let raw: RawPressure = serde_json::from_value(value).map_err(|e| e.to_string())?;
                SampleValue::Pressure {
                    tank: raw.tank,
                    bar: raw.value,
                }
            }
            "event" => {
                let raw: RawEvent = serde_json::from_value(value).map_err(|e| e.to_string())?;
                let kind = match raw.kind {
                    RawEventKind::Code(code) => EventKind::from_code(code),
                    RawEventKind::Tag(tag) => EventKind::from_tag(&tag)
                        .ok_or_else(|| format!("unknown event kind '{tag}'"))?,
                };
                SampleValue::Event(EventMarker {
                    kind,
                    time: raw.time,
                    flags: raw.flags,
                    value: raw.value,
                    name: raw.name,
                })
            }
            _ => SampleValue::Unrecognized(self.kind),
        };
        Ok(sample)
    }
}

fn as_f64(value: &Value) -> std::result::Result<f64, String> {
    value
        .as_f64()
        .ok_or_else(|| format!("expected a number, found {value}"))
}

fn as_u32(value: &Value) -> std::result::Result<u32, String> {
    value
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| format!("expected an unsigned 32-bit integer, found {value}"))
}

struct ReplayParser {
    datetime: Option<DiveDateTime>,
    divetime: Option<u32>,
    tanks: Vec<Tank>,
    serial: Option<String>,
    values: Vec<SampleValue>,
}

impl DiveParser for ReplayParser {
    fn datetime(&self) -> Option<DiveDateTime> {
        self.datetime
    }

    fn dive_time(&self) -> Option<u32> {
        self.divetime
    }

    fn tank(&self, index: usize) -> Option<Tank> {
        self.tanks.get(index).copied()
    }

    fn serial(&self) -> Option<String> {
        self.serial.clone()
    }

    fn samples_foreach(
        &mut self,
        callback: &mut dyn FnMut(SampleValue) -> Result<()>,
    ) -> Result<()> {
        for value in &self.values {
            callback(value.clone())?;
        }
        Ok(())
    }
}
