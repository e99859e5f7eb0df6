pub mod color;
pub mod graph;
pub mod pipeline;
pub mod presenter;
pub mod raster;
pub mod scheduler;
pub mod series;
pub mod surface;

pub use color::Color;
pub use graph::{RollingSeriesPlot, UnknownSeriesError};
pub use scheduler::{FrameHandle, FrameScheduler};
pub use surface::DrawSurface;
