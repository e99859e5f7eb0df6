use crate::pipeline::{BlitPipeline, FULLSCREEN_QUAD};
use tracing::debug;
use wgpu::util::DeviceExt;

/// Format of the uploaded raster. Matches `PixelSurface` byte order.
pub const RASTER_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Uploads the CPU plot raster and draws it over the whole swapchain image.
pub struct FramePresenter {
    pipeline: BlitPipeline,
    vertex_buffer: wgpu::Buffer,
    target: RasterTexture,
}

struct RasterTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    size: (u32, u32),
}

impl RasterTexture {
    fn new(device: &wgpu::Device, pipeline: &BlitPipeline, width: u32, height: u32) -> Self {
        // Zero-sized textures are invalid.
        let (width, height) = (width.max(1), height.max(1));
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("plot_texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: RASTER_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&Default::default());
        let bind_group = pipeline.create_texture_bind_group(device, &view);

        Self {
            texture,
            bind_group,
            size: (width, height),
        }
    }
}

impl FramePresenter {
    pub fn new(device: &wgpu::Device, color_format: wgpu::TextureFormat, width: u32, height: u32) -> Self {
        let pipeline = BlitPipeline::new(device, color_format);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_vertex_buffer"),
            contents: bytemuck::cast_slice(&FULLSCREEN_QUAD),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let target = RasterTexture::new(device, &pipeline, width, height);

        Self {
            pipeline,
            vertex_buffer,
            target,
        }
    }

    /// Texture size in pixels.
    pub fn size(&self) -> (u32, u32) {
        self.target.size
    }

    /// Recreate the texture if the raster changed size.
    pub fn ensure_size(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if self.target.size == (width.max(1), height.max(1)) {
            return;
        }
        debug!(width, height, "Recreating plot texture");
        self.target = RasterTexture::new(device, &self.pipeline, width, height);
    }

    /// Upload an RGBA8 raster of `width` x `height` pixels.
    ///
    /// Resize first with `ensure_size`; a mismatched or short buffer is skipped.
    pub fn upload_frame(&self, queue: &wgpu::Queue, data: &[u8], width: u32, height: u32) {
        if (width, height) != self.target.size || data.len() < (4 * width * height) as usize {
            return;
        }

        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.target.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Draw the uploaded raster into `view`.
    pub fn draw(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("plot_blit_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipeline.pipeline);
        pass.set_bind_group(0, &self.target.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.draw(0..FULLSCREEN_QUAD.len() as u32, 0..1);
    }
}
