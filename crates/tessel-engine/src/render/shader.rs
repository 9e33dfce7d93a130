//! Shader descriptions and the registry that turns them into GPU objects.

use std::borrow::Cow;
use std::collections::HashMap;

use anyhow::{Context, Result, anyhow, bail};
use tessel_pack::{FragmentLayout, IndexBuffer, VertexBuffer, parse_format};

use super::camera::CameraUniform;
use super::formats::{index_format, vertex_attributes};

/// Name of the flat-color shader every registry built with
/// [`ShaderRegistry::with_defaults`] carries.
pub const BASE_SHADER: &str = "base";

/// One uniform buffer, bound alone in its own bind group at binding 0.
///
/// Groups are numbered in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformBinding {
    pub label: &'static str,
    pub visibility: wgpu::ShaderStages,
    pub size: u64,
}

/// Everything needed to build a shader and the buffers that feed it.
#[derive(Debug, Clone)]
pub struct ShaderDesc {
    pub name: String,
    pub source: Cow<'static, str>,
    pub vertex_entry: &'static str,
    pub fragment_entry: &'static str,
    /// One format token per vertex attribute, in shader location order.
    pub vertex_formats: Vec<String>,
    pub index_format: String,
    pub uniforms: Vec<UniformBinding>,
}

impl ShaderDesc {
    /// Flat-colored triangles: `float32x2` position + `unorm8x4` color,
    /// `uint16` indices, projection matrix at group 0.
    pub fn base() -> Self {
        Self {
            name: BASE_SHADER.to_string(),
            source: Cow::Borrowed(include_str!("shaders/base.wgsl")),
            vertex_entry: "vs",
            fragment_entry: "fs",
            vertex_formats: vec!["float32x2".into(), "unorm8x4".into()],
            index_format: "uint16".into(),
            uniforms: vec![UniformBinding {
                label: "projection",
                visibility: wgpu::ShaderStages::VERTEX,
                size: std::mem::size_of::<CameraUniform>() as u64,
            }],
        }
    }

    /// Plans the vertex layout declared by `vertex_formats`.
    pub fn vertex_layout(&self) -> Result<FragmentLayout> {
        FragmentLayout::plan(&self.vertex_formats[..])
            .with_context(|| format!("shader `{}`: bad vertex formats", self.name))
    }

    /// The wgpu index format for `index_format`.
    pub fn wgpu_index_format(&self) -> Result<wgpu::IndexFormat> {
        let field = parse_format(&self.index_format)
            .with_context(|| format!("shader `{}`: bad index format", self.name))?;
        index_format(&field).ok_or_else(|| {
            anyhow!("shader `{}`: `{}` is not an index format", self.name, self.index_format)
        })
    }

    /// CPU vertex buffer in this shader's vertex layout.
    pub fn new_vertex_buffer(&self) -> Result<VertexBuffer> {
        Ok(VertexBuffer::new(&self.vertex_formats[..])?)
    }

    /// CPU index buffer in this shader's index format.
    pub fn new_index_buffer(&self) -> Result<IndexBuffer> {
        Ok(IndexBuffer::new(&self.index_format)?)
    }

    /// Checks every token and that each attribute maps to a wgpu format.
    pub fn validate(&self) -> Result<()> {
        let layout = self.vertex_layout()?;
        vertex_attributes(&layout, 0).with_context(|| format!("shader `{}`", self.name))?;
        self.wgpu_index_format()?;
        if self.uniforms.iter().any(|u| u.size == 0) {
            bail!("shader `{}`: zero-sized uniform", self.name);
        }
        Ok(())
    }
}

/// A loaded shader: module, bind group layouts and vertex/index description.
pub struct Shader {
    desc: ShaderDesc,
    target_format: wgpu::TextureFormat,
    module: wgpu::ShaderModule,
    bind_group_layouts: Vec<(&'static str, wgpu::BindGroupLayout)>,
    stride: u64,
    attributes: Vec<wgpu::VertexAttribute>,
    index_format: wgpu::IndexFormat,
}

impl Shader {
    fn load(
        device: &wgpu::Device,
        desc: ShaderDesc,
        target_format: wgpu::TextureFormat,
    ) -> Result<Self> {
        let layout = desc.vertex_layout()?;
        let attributes = vertex_attributes(&layout, 0)?;
        let index_format = desc.wgpu_index_format()?;

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&desc.name),
            source: wgpu::ShaderSource::Wgsl(desc.source.clone()),
        });

        let bind_group_layouts = desc
            .uniforms
            .iter()
            .map(|u| {
                let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some(u.label),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: u.visibility,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: wgpu::BufferSize::new(u.size),
                        },
                        count: None,
                    }],
                });
                (u.label, bgl)
            })
            .collect();

        log::debug!("loaded shader `{}` for {target_format:?}", desc.name);

        Ok(Self {
            stride: layout.fragment_byte_size() as u64,
            desc,
            target_format,
            module,
            bind_group_layouts,
            attributes,
            index_format,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.desc.name
    }

    #[inline]
    pub fn index_format(&self) -> wgpu::IndexFormat {
        self.index_format
    }

    /// Bind group layout for the uniform labelled `label`.
    pub fn bind_group_layout(&self, label: &str) -> Option<&wgpu::BindGroupLayout> {
        self.bind_group_layouts
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, bgl)| bgl)
    }

    /// Triangle-list pipeline with premultiplied-alpha blending into the
    /// format the shader was loaded for.
    pub fn create_pipeline(&self, device: &wgpu::Device) -> wgpu::RenderPipeline {
        let label = format!("{} pipeline", self.desc.name);
        let bgls: Vec<&wgpu::BindGroupLayout> =
            self.bind_group_layouts.iter().map(|(_, bgl)| bgl).collect();

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&label),
            bind_group_layouts: &bgls,
            immediate_size: 0,
        });

        let buffers = [wgpu::VertexBufferLayout {
            array_stride: self.stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &self.attributes,
        }];

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&label),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &self.module,
                entry_point: Some(self.desc.vertex_entry),
                compilation_options: Default::default(),
                buffers: &buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: &self.module,
                entry_point: Some(self.desc.fragment_entry),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.target_format,
                    blend: Some(premul_alpha_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }
}

/// Named shaders, registered up front and loaded once a device and surface
/// format are known.
#[derive(Default)]
pub struct ShaderRegistry {
    descs: Vec<ShaderDesc>,
    loaded: HashMap<String, Shader>,
    target_format: Option<wgpu::TextureFormat>,
}

impl ShaderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the [`BASE_SHADER`] already registered.
    pub fn with_defaults() -> Result<Self> {
        let mut registry = Self::new();
        registry.register(ShaderDesc::base())?;
        Ok(registry)
    }

    /// Adds a description. Fails on a duplicate name or an invalid
    /// description; nothing is added then.
    pub fn register(&mut self, desc: ShaderDesc) -> Result<()> {
        if self.descs.iter().any(|d| d.name == desc.name) {
            bail!("shader `{}` is already registered", desc.name);
        }
        desc.validate()?;
        self.descs.push(desc);
        Ok(())
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descs.iter().map(|d| d.name.as_str())
    }

    /// Surface format of the last `load`, if any.
    #[inline]
    pub fn target_format(&self) -> Option<wgpu::TextureFormat> {
        self.target_format
    }

    /// (Re)creates every registered shader for `target_format`.
    pub fn load(
        &mut self,
        device: &wgpu::Device,
        target_format: wgpu::TextureFormat,
    ) -> Result<()> {
        self.clear();
        for desc in &self.descs {
            let shader = Shader::load(device, desc.clone(), target_format)?;
            self.loaded.insert(desc.name.clone(), shader);
        }
        self.target_format = Some(target_format);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Shader> {
        if let Some(shader) = self.loaded.get(name) {
            return Ok(shader);
        }
        if self.descs.iter().any(|d| d.name == name) {
            bail!("shader `{name}` is registered but not loaded");
        }
        bail!("no shader named `{name}`")
    }

    /// Drops every loaded GPU object. Registrations survive, so `load` can
    /// run again (e.g. for a new surface format).
    pub fn clear(&mut self) {
        self.loaded.clear();
        self.target_format = None;
    }
}

pub(crate) fn premul_alpha_blend() -> wgpu::BlendState {
    let component = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState {
        color: component,
        alpha: component,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(name: &str, formats: &[&str], index: &str) -> ShaderDesc {
        ShaderDesc {
            name: name.to_string(),
            vertex_formats: formats.iter().map(|s| s.to_string()).collect(),
            index_format: index.to_string(),
            ..ShaderDesc::base()
        }
    }

    #[test]
    fn base_description_is_valid() {
        let base = ShaderDesc::base();
        base.validate().unwrap();
        assert_eq!(base.vertex_layout().unwrap().fragment_byte_size(), 12);
        assert_eq!(base.wgpu_index_format().unwrap(), wgpu::IndexFormat::Uint16);
        assert_eq!(base.uniforms[0].size, 64);
        assert_eq!(base.new_vertex_buffer().unwrap().stride(), 12);
        assert_eq!(base.new_index_buffer().unwrap().format().byte_width, 2);
    }

    #[test]
    fn registry_starts_with_base() {
        let registry = ShaderRegistry::with_defaults().unwrap();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec![BASE_SHADER]);
        assert_eq!(registry.target_format(), None);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = ShaderRegistry::with_defaults().unwrap();
        assert!(registry.register(ShaderDesc::base()).is_err());
        assert_eq!(registry.names().count(), 1);
    }

    #[test]
    fn invalid_descriptions_are_rejected() {
        let mut registry = ShaderRegistry::new();
        assert!(registry.register(desc("a", &["float32x2", "vec4"], "uint16")).is_err());
        assert!(registry.register(desc("b", &["unorm8x3"], "uint16")).is_err());
        assert!(registry.register(desc("c", &["float32x2"], "float32")).is_err());
        assert!(registry.register(desc("d", &[], "uint16")).is_err());
        assert_eq!(registry.names().count(), 0);

        registry.register(desc("e", &["float32x3"], "uint32")).unwrap();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["e"]);
    }

    #[test]
    fn get_reports_missing_and_unloaded() {
        let registry = ShaderRegistry::with_defaults().unwrap();
        let unloaded = registry.get(BASE_SHADER).err().unwrap().to_string();
        assert!(unloaded.contains("not loaded"), "{unloaded}");
        let missing = registry.get("glow").err().unwrap().to_string();
        assert!(missing.contains("no shader"), "{missing}");
    }

    #[test]
    fn blend_is_premultiplied_over() {
        let blend = premul_alpha_blend();
        assert_eq!(blend.color.src_factor, wgpu::BlendFactor::One);
        assert_eq!(blend.alpha.dst_factor, wgpu::BlendFactor::OneMinusSrcAlpha);
    }
}
