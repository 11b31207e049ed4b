use crate::decoder::{DiveDateTime, Tank};

/// Whole-dive fields queried from the parser, independent of the sample stream
#[derive(Debug, Clone, PartialEq)]
pub struct DiveMetadata {
    pub source_file: String,
    pub datetime: Option<DiveDateTime>,
    /// Total dive time in seconds
    pub duration: Option<u32>,
    pub model: String,
    pub serial: Option<String>,
    pub cylinder: Option<Tank>,
}

impl DiveMetadata {
    pub fn new(source_file: &str, model: &str) -> Self {
        Self {
            source_file: source_file.to_string(),
            datetime: None,
            duration: None,
            model: model.to_string(),
            serial: None,
            cylinder: None,
        }
    }
}
