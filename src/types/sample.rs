/// One reconstructed time-indexed reading
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Seconds since the start of the dive
    pub time: u32,
    /// Depth in metres, carried forward from the previous sample until updated
    pub depth: f64,
    pub temperature: Option<f64>,
    pub ppo2: Option<f64>,
}

impl Sample {
    pub fn new(time: u32, depth: f64) -> Self {
        Self {
            time,
            depth,
            temperature: None,
            ppo2: None,
        }
    }
}

/// Discrete marker captured during the dive
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Seconds since the start of the dive
    pub time: u32,
    pub event_type: String,
    /// Name from the event payload; `None` when the decoder supplied none
    pub name: Option<String>,
}
