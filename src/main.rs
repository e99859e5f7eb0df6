use anyhow::{Context, Result};
use glam::{DVec3, Vec2};
use motion_config::{AppConfig, FilterConfig, FilterKind};
use motion_imu::filter::{HighPassFilter, LowPassFilter, Smoothing};
use motion_imu::pipeline::MotionPipeline;
use motion_imu::MotionClient;
use motion_input::SeriesCycler;
use motion_plot::presenter::FramePresenter;
use motion_plot::raster::PixelSurface;
use motion_plot::scheduler::WindowScheduler;
use motion_plot::{DrawSurface, RollingSeriesPlot};
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Motion events between debug-level readout dumps.
const READOUT_INTERVAL: u64 = 100;

/// Application state.
struct App {
    config: AppConfig,
    client: MotionClient,
    pipeline: MotionPipeline,
    cycler: SeriesCycler,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    plot: Option<RollingSeriesPlot<PixelSurface>>,
    scheduler: Option<WindowScheduler>,
    motion_events: u64,
}

struct GpuState {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    presenter: FramePresenter,
    frame_count: u64,
}

impl App {
    fn new(config: AppConfig, client: MotionClient) -> Self {
        let pipeline = MotionPipeline::new(smoothing(&config.filter), config.pipeline.ignore_heading);
        let cycler = SeriesCycler::new(config.plot.series.iter().map(|s| s.name.clone()));

        Self {
            config,
            client,
            pipeline,
            cycler,
            window: None,
            gpu: None,
            plot: None,
            scheduler: None,
            motion_events: 0,
        }
    }

    /// Run every queued sensor event through the pipeline into the plot.
    fn pump_events(&mut self) {
        for event in self.client.drain() {
            let Some(readout) = self.pipeline.handle(&event) else {
                continue;
            };

            self.motion_events += 1;
            trace!(%readout, "Motion readout");
            if self.motion_events % READOUT_INTERVAL == 0 {
                debug!(events = self.motion_events, "Motion readout\n{readout}");
            }

            if let Some(plot) = &mut self.plot {
                for (name, value) in readout.axes() {
                    if let Err(e) = plot.add_data(name, value) {
                        warn!(%e, "Dropping sample");
                    }
                }
            }
        }
    }

    /// Upload the plot raster and present it.
    fn present(&mut self) {
        let (Some(gpu), Some(plot)) = (&mut self.gpu, &self.plot) else {
            return;
        };
        let Some(raster) = plot.surface() else {
            return;
        };

        let (width, height) = raster.size();
        gpu.presenter.ensure_size(&gpu.device, width, height);
        gpu.presenter.upload_frame(&gpu.queue, raster.pixels(), width, height);

        let output = match gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(e) => {
                warn!(?e, "Failed to get surface texture");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("plot_present"),
            });
        gpu.presenter.draw(&mut encoder, &view);
        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        gpu.frame_count += 1;
        if gpu.frame_count % 300 == 0 {
            debug!(frames = gpu.frame_count, "Render heartbeat");
        }
    }

    fn toggle_running(&mut self) {
        let (Some(plot), Some(scheduler)) = (&mut self.plot, &mut self.scheduler) else {
            return;
        };
        if plot.is_running() {
            plot.stop(scheduler);
            info!("Plot paused");
        } else {
            plot.start(scheduler);
            info!("Plot resumed");
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let (Some(plot), Some(scheduler)) = (&mut self.plot, &mut self.scheduler) {
            plot.destroy(scheduler);
        }

        // Save config on exit.
        if let Err(e) = motion_config::save_config(&self.config) {
            error!(?e, "Failed to save config");
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));

        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!(?e, "Failed to create window");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        let gpu = match init_gpu(window.clone()) {
            Ok(gpu) => gpu,
            Err(e) => {
                error!(?e, "Failed to initialize GPU");
                event_loop.exit();
                return;
            }
        };

        let scale_factor = window.scale_factor();
        let logical = logical_size(window.inner_size(), scale_factor);
        let mut plot = RollingSeriesPlot::from_config(
            PixelSurface::new(0, 0),
            &self.config.plot,
            logical,
            scale_factor as f32,
        );
        let mut scheduler = WindowScheduler::new(window);
        plot.start(&mut scheduler);

        info!(
            width = logical.x,
            height = logical.y,
            scale_factor,
            series = self.config.plot.series.len(),
            "Application initialized"
        );

        self.gpu = Some(gpu);
        self.plot = Some(plot);
        self.scheduler = Some(scheduler);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),

            WindowEvent::Resized(size) => {
                if size.width > 0 && size.height > 0 {
                    if let Some(gpu) = &mut self.gpu {
                        gpu.surface_config.width = size.width;
                        gpu.surface_config.height = size.height;
                        gpu.surface.configure(&gpu.device, &gpu.surface_config);
                    }
                    if let (Some(plot), Some(window)) = (&mut self.plot, &self.window) {
                        plot.resize(logical_size(size, window.scale_factor()));
                    }
                }
            }

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(plot) = &mut self.plot {
                    plot.set_device_pixel_ratio(scale_factor as f32);
                }
                info!(scale_factor, "Scale factor changed");
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed && !event.repeat {
                    match event.physical_key {
                        PhysicalKey::Code(KeyCode::Space) => self.toggle_running(),
                        PhysicalKey::Code(KeyCode::Escape) => self.shutdown(event_loop),
                        _ => {}
                    }
                }
            }

            WindowEvent::MouseInput { button, state, .. } => {
                if let Some(visible) = self.cycler.on_mouse_button(button, state) {
                    if let Some(plot) = &mut self.plot {
                        plot.set_visible(visible);
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                // Samples that arrived before this tick must show up in it.
                self.pump_events();

                if let (Some(plot), Some(scheduler)) = (&mut self.plot, &mut self.scheduler) {
                    if let Some(handle) = scheduler.take_due() {
                        plot.on_frame(handle, scheduler);
                    }
                }

                self.present();
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        self.pump_events();
    }
}

fn init_gpu(window: Arc<Window>) -> Result<GpuState> {
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        ..Default::default()
    });

    let surface = instance
        .create_surface(window.clone())
        .context("Failed to create surface")?;

    let (device, queue, adapter) = pollster::block_on(async {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No suitable GPU adapter found")?;

        info!(name = adapter.get_info().name, "Using GPU");

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("motion_scope_device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .context("Failed to create device")?;

        anyhow::Ok((device, queue, adapter))
    })?;

    let win_size = window.inner_size();
    let surface_caps = surface.get_capabilities(&adapter);

    // The raster is sRGB-encoded; prefer a matching swapchain.
    let format = surface_caps
        .formats
        .iter()
        .find(|f| f.is_srgb())
        .or_else(|| surface_caps.formats.first())
        .copied()
        .context("Surface reports no formats")?;

    let surface_config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width: win_size.width.max(1),
        height: win_size.height.max(1),
        present_mode: wgpu::PresentMode::AutoVsync,
        alpha_mode: wgpu::CompositeAlphaMode::Auto,
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    };
    surface.configure(&device, &surface_config);

    let presenter = FramePresenter::new(&device, format, win_size.width, win_size.height);

    Ok(GpuState {
        device,
        queue,
        surface,
        surface_config,
        presenter,
        frame_count: 0,
    })
}

fn logical_size(size: PhysicalSize<u32>, scale_factor: f64) -> Vec2 {
    let logical: LogicalSize<f32> = size.to_logical(scale_factor);
    Vec2::new(logical.width, logical.height)
}

fn smoothing(config: &FilterConfig) -> Smoothing {
    match config.kind {
        FilterKind::LowPass => Smoothing::LowPass(LowPassFilter::new(DVec3::ZERO, config.low_pass_bias)),
        FilterKind::HighPass => {
            Smoothing::HighPass(HighPassFilter::new(DVec3::ZERO, config.high_pass_cutoff))
        }
        FilterKind::None => Smoothing::Passthrough(DVec3::ZERO),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "motion_scope=info,motion_imu=info,motion_plot=info".into()),
        )
        .init();

    info!("Motion Scope starting");

    // Load config.
    let config = motion_config::load_config().unwrap_or_else(|e| {
        warn!(?e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    info!(filter = ?config.filter.kind, series = config.plot.series.len(), "Config loaded");

    // Connect to the event stream (fall back to synthetic motion).
    let rate = config.source.mock_rate_hz;
    let client = match &config.source.address {
        Some(addr) => match MotionClient::connect(addr).await {
            Ok(client) => client,
            Err(e) => {
                warn!(?e, "Event stream not available, using synthetic motion");
                MotionClient::mock(rate)
            }
        },
        None => {
            info!(rate, "No event stream configured, using synthetic motion");
            MotionClient::mock(rate)
        }
    };
    info!(source = ?client.kind(), "Motion source ready");

    // Run the application.
    let event_loop = EventLoop::new()?;
    let mut app = App::new(config, client);
    event_loop.run_app(&mut app)?;

    Ok(())
}
