use anyhow::{Context, Result};
use tessel_pack::{IndexBuffer, VertexBuffer};

use crate::coords::Rect;
use crate::render::{RenderCtx, RenderTarget};

use super::batch::pack_figures;
use super::camera::Camera;
use super::figure::RectFigure;
use super::gpu_buffer::{BufferKind, GpuBuffer};
use super::shader::{BASE_SHADER, ShaderDesc, ShaderRegistry};

const PROJECTION: &str = "projection";

/// Solid rectangle renderer.
///
/// Every call packs all figures into one vertex/index buffer pair through
/// the base shader's layout and issues a single indexed draw. Geometry is in
/// logical pixels; the camera maps the viewport onto clip space.
pub struct RectRenderer {
    registry: ShaderRegistry,
    pipeline: Option<wgpu::RenderPipeline>,

    vertices: VertexBuffer,
    indices: IndexBuffer,

    vbo: GpuBuffer,
    ibo: GpuBuffer,
    camera_ubo: GpuBuffer,
    bind_group: Option<wgpu::BindGroup>,

    camera: Camera,
}

impl RectRenderer {
    pub fn new() -> Result<Self> {
        let base = ShaderDesc::base();
        Ok(Self {
            vertices: base.new_vertex_buffer()?,
            indices: base.new_index_buffer()?,
            registry: ShaderRegistry::with_defaults()?,
            pipeline: None,
            vbo: GpuBuffer::new(BufferKind::Vertex, "tessel rect vbo"),
            ibo: GpuBuffer::new(BufferKind::Index, "tessel rect ibo"),
            camera_ubo: GpuBuffer::new(BufferKind::Uniform, "tessel camera ubo"),
            bind_group: None,
            camera: Camera::new(Rect::new(0.0, 0.0, 1.0, 1.0)),
        })
    }

    /// Draws `figures` over the current contents of `target`.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        figures: &[RectFigure],
    ) -> Result<()> {
        if figures.is_empty() || !ctx.viewport.is_valid() {
            return Ok(());
        }

        self.ensure_pipeline(ctx)?;

        let index_count = pack_figures(figures, &mut self.vertices, &mut self.indices)?;
        if index_count == 0 {
            return Ok(());
        }

        if self.camera.set_bounds(ctx.viewport.bounds()) {
            log::debug!("camera bounds now {:?}", self.camera.bounds());
        }

        // Mutating uploads first; the pass below only borrows.
        self.vbo.upload(ctx.device, ctx.queue, self.vertices.bytes());
        self.ibo.upload(ctx.device, ctx.queue, self.indices.bytes());
        let uniform = self.camera.uniform();
        if self.camera_ubo.upload(ctx.device, ctx.queue, bytemuck::bytes_of(&uniform)) {
            self.bind_group = None;
        }
        self.ensure_bind_group(ctx)?;

        let shader = self.registry.get(BASE_SHADER)?;
        let Some(pipeline) = self.pipeline.as_ref() else { return Ok(()) };
        let Some(bind_group) = self.bind_group.as_ref() else { return Ok(()) };
        let Some(vertex_slice) = self.vbo.slice() else { return Ok(()) };
        let Some(index_slice) = self.ibo.slice() else { return Ok(()) };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("tessel rect pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, vertex_slice);
        rpass.set_index_buffer(index_slice, shader.index_format());
        rpass.draw_indexed(0..index_count, 0, 0..1);

        Ok(())
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) -> Result<()> {
        if self.registry.target_format() != Some(ctx.surface_format) {
            self.registry
                .load(ctx.device, ctx.surface_format)
                .context("loading shaders")?;
            self.pipeline = None;
            self.bind_group = None;
        }
        if self.pipeline.is_none() {
            let shader = self.registry.get(BASE_SHADER)?;
            self.pipeline = Some(shader.create_pipeline(ctx.device));
        }
        Ok(())
    }

    fn ensure_bind_group(&mut self, ctx: &RenderCtx<'_>) -> Result<()> {
        if self.bind_group.is_some() {
            return Ok(());
        }
        let shader = self.registry.get(BASE_SHADER)?;
        let bgl = shader
            .bind_group_layout(PROJECTION)
            .with_context(|| format!("shader `{}` has no `{PROJECTION}` uniform", shader.name()))?;
        let ubo = self.camera_ubo.buffer().context("camera uniform not uploaded")?;

        self.bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tessel camera bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.as_entire_binding(),
            }],
        }));
        Ok(())
    }
}
