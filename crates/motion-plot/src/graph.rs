//! Scrolling multi-series plot.
//!
//! Data coordinates map to the surface with a fixed scale: sample `i` sits at
//! `x = i * width / capacity`, value `v` at `v * height / 10` above the
//! vertical midpoint. Logical coordinates are multiplied by the device pixel
//! ratio before they reach the surface.

use crate::color::Color;
use crate::scheduler::{FrameHandle, FrameScheduler};
use crate::series::Series;
use crate::surface::DrawSurface;
use glam::Vec2;
use motion_config::PlotConfig;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, trace, warn};

pub const DEFAULT_CAPACITY: usize = 200;
pub const DEFAULT_SIZE: Vec2 = Vec2::new(500.0, 500.0);

/// Value range shown between the top and bottom edges.
const VERTICAL_DIVISIONS: f32 = 10.0;
const TRACE_WIDTH: f32 = 1.0;

const LEGEND_X: f32 = 10.0;
const LEGEND_ROW: f32 = 20.0;
const LEGEND_SWATCH: f32 = 20.0;
const LEGEND_GAP: f32 = 5.0;
const LEGEND_LINE_WIDTH: f32 = 2.0;
const LEGEND_FONT_PX: f32 = 16.0;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown series {name}")]
pub struct UnknownSeriesError {
    pub name: String,
}

/// Rolling time-series plot over a set of named, bounded series.
pub struct RollingSeriesPlot<S: DrawSurface> {
    surface: Option<S>,
    /// Logical size.
    size: Vec2,
    capacity: usize,
    device_pixel_ratio: f32,
    /// Registration order is legend order.
    series: Vec<Series>,
    visible: HashSet<String>,
    /// Tick the loop is waiting for. `None` when stopped.
    pending: Option<FrameHandle>,
    frame_count: u64,
}

impl<S: DrawSurface> RollingSeriesPlot<S> {
    pub fn new(surface: S, size: Vec2, device_pixel_ratio: f32) -> Self {
        let mut plot = Self {
            surface: Some(surface),
            size,
            capacity: DEFAULT_CAPACITY,
            device_pixel_ratio,
            series: Vec::new(),
            visible: HashSet::new(),
            pending: None,
            frame_count: 0,
        };
        plot.resize_surface();
        plot
    }

    /// Build a plot and register the configured series.
    ///
    /// A color that does not parse falls back to black.
    pub fn from_config(surface: S, config: &PlotConfig, size: Vec2, device_pixel_ratio: f32) -> Self {
        let mut plot = Self::new(surface, size, device_pixel_ratio);
        plot.configure(size, config.capacity);

        for series in &config.series {
            let color = Color::parse(&series.color).unwrap_or_else(|e| {
                warn!(name = %series.name, error = %e, "Invalid series color, using black");
                Color::BLACK
            });
            plot.register_series(&series.name, color);
        }

        plot
    }

    /// Set logical size and per-series capacity. Series longer than the new
    /// capacity lose their oldest samples.
    pub fn configure(&mut self, size: Vec2, capacity: usize) {
        self.size = size;
        if capacity != self.capacity {
            self.capacity = capacity;
            for series in &mut self.series {
                series.set_capacity(capacity);
            }
        }
        self.resize_surface();
        debug!(width = size.x, height = size.y, capacity, "Plot configured");
    }

    /// Change the logical size, keeping the capacity.
    pub fn resize(&mut self, size: Vec2) {
        self.configure(size, self.capacity);
    }

    pub fn set_device_pixel_ratio(&mut self, device_pixel_ratio: f32) {
        self.device_pixel_ratio = device_pixel_ratio;
        self.resize_surface();
    }

    fn resize_surface(&mut self) {
        let physical = (self.size * self.device_pixel_ratio).round().max(Vec2::ZERO);
        if let Some(surface) = &mut self.surface {
            surface.resize(physical.x as u32, physical.y as u32);
        }
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio
    }

    /// Register a series, or refresh the color of an existing one. Either way
    /// the series becomes visible.
    pub fn register_series(&mut self, name: &str, color: Color) {
        match self.series.iter_mut().find(|s| s.name() == name) {
            Some(existing) => existing.set_color(color),
            None => self.series.push(Series::new(name, color, self.capacity)),
        }
        self.visible.insert(name.to_string());
    }

    /// Append a sample to a registered series.
    pub fn add_data(&mut self, name: &str, value: f64) -> Result<(), UnknownSeriesError> {
        let series = self
            .series
            .iter_mut()
            .find(|s| s.name() == name)
            .ok_or_else(|| UnknownSeriesError {
                name: name.to_string(),
            })?;
        series.push(value);
        Ok(())
    }

    /// Replace the visibility set with exactly `names`.
    pub fn set_visible<I, T>(&mut self, names: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.visible = names.into_iter().map(Into::into).collect();
        debug!(visible = ?self.visible, "Visibility changed");
    }

    pub fn is_visible(&self, name: &str) -> bool {
        self.visible.contains(name)
    }

    pub fn series(&self, name: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.name() == name)
    }

    /// Registered names in registration order.
    pub fn series_names(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(Series::name)
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    /// Frames rendered so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Render one frame now, then keep rendering on every display tick until
    /// `stop`. Does nothing if already running or destroyed.
    pub fn start(&mut self, scheduler: &mut impl FrameScheduler) {
        if self.pending.is_some() {
            return;
        }
        if self.surface.is_none() {
            warn!("Cannot start a destroyed plot");
            return;
        }

        self.render();
        self.pending = Some(scheduler.request_frame());
        debug!("Redraw loop started");
    }

    /// Deliver a display tick. Renders and schedules the next tick if
    /// `handle` is the one the loop is waiting for; stale handles are ignored.
    pub fn on_frame(&mut self, handle: FrameHandle, scheduler: &mut impl FrameScheduler) -> bool {
        if self.pending != Some(handle) {
            trace!(?handle, "Ignoring stale frame");
            return false;
        }

        self.pending = None;
        self.render();
        self.pending = Some(scheduler.request_frame());
        true
    }

    /// Cancel the pending tick. Safe to call when already stopped.
    pub fn stop(&mut self, scheduler: &mut impl FrameScheduler) {
        if let Some(handle) = self.pending.take() {
            scheduler.cancel_frame(handle);
            debug!(frames = self.frame_count, "Redraw loop stopped");
        }
    }

    /// Stop the loop and release the surface. Rendering afterwards is a no-op.
    pub fn destroy(&mut self, scheduler: &mut impl FrameScheduler) {
        self.stop(scheduler);
        if let Some(mut surface) = self.surface.take() {
            surface.release();
        }
    }

    /// Draw one frame from the current buffers.
    pub fn render(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };

        let dpr = self.device_pixel_ratio;
        let mid = self.size.y / 2.0;

        surface.clear();

        // Zero line.
        surface.fill_rect(
            Vec2::new(0.0, mid - 1.0) * dpr,
            Vec2::new(self.size.x, 1.0) * dpr,
            Color::GUIDE,
        );

        let unit_x = self.size.x / self.capacity as f32;
        let unit_y = self.size.y / VERTICAL_DIVISIONS;
        let mut points = Vec::with_capacity(self.capacity + 1);

        for (idx, series) in self.series.iter().enumerate() {
            if !self.visible.contains(series.name()) {
                continue;
            }
            let color = series.color();

            points.clear();
            points.push(Vec2::new(0.0, mid) * dpr);
            points.extend(
                series
                    .samples()
                    .enumerate()
                    .map(|(i, v)| Vec2::new(i as f32 * unit_x, mid - v as f32 * unit_y) * dpr),
            );
            surface.stroke_polyline(&points, color, TRACE_WIDTH * dpr);

            // Legend rows follow registration order, hidden series keep their slot.
            let row = LEGEND_ROW * (idx + 1) as f32;
            surface.stroke_polyline(
                &[
                    Vec2::new(LEGEND_X, row) * dpr,
                    Vec2::new(LEGEND_X + LEGEND_SWATCH, row) * dpr,
                ],
                color,
                LEGEND_LINE_WIDTH * dpr,
            );
            surface.fill_text(
                series.name(),
                Vec2::new(LEGEND_X + LEGEND_SWATCH + LEGEND_GAP, row) * dpr,
                color,
                LEGEND_FONT_PX * dpr,
            );
        }

        self.frame_count += 1;
    }
}
