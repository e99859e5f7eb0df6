use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Window settings.
    pub window: WindowConfig,
    /// Plot layout and series.
    pub plot: PlotConfig,
    /// Smoothing applied to earth-frame acceleration.
    pub filter: FilterConfig,
    /// Frame transform options.
    pub pipeline: PipelineConfig,
    /// Where sensor events come from.
    pub source: SourceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Initial inner width in logical pixels.
    pub width: u32,
    /// Initial inner height in logical pixels.
    pub height: u32,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "Motion Scope".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// Samples kept per series. Also fixes the horizontal scale.
    pub capacity: usize,
    /// Series registered at startup, in legend order.
    pub series: Vec<SeriesConfig>,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            capacity: 200,
            series: vec![
                SeriesConfig::new("x", "red"),
                SeriesConfig::new("y", "green"),
                SeriesConfig::new("z", "blue"),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesConfig {
    pub name: String,
    /// CSS color name or `#rrggbb`.
    pub color: String,
}

impl SeriesConfig {
    pub fn new(name: &str, color: &str) -> Self {
        Self {
            name: name.to_string(),
            color: color.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    /// Fixed-weight exponential moving average.
    LowPass,
    /// Time-adaptive exponential filter driven by wall-clock deltas.
    HighPass,
    /// Pass earth-frame acceleration through untouched.
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub kind: FilterKind,
    /// Low-pass bias. Weight of the previous output, 0.0..1.0.
    pub low_pass_bias: f64,
    /// High-pass time constant in seconds.
    pub high_pass_cutoff: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            kind: FilterKind::LowPass,
            low_pass_bias: 0.8,
            high_pass_cutoff: 0.8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Drop the compass heading when rotating linear acceleration, so the
    /// plotted axes follow the device's yaw.
    pub ignore_heading: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ignore_heading: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// `host:port` of a newline-delimited JSON event stream.
    /// `None` means use the synthetic source.
    pub address: Option<String>,
    /// Event rate of the synthetic source.
    pub mock_rate_hz: f64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            address: None,
            mock_rate_hz: 60.0,
        }
    }
}
