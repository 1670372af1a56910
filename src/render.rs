use crate::constants::{
    AMBIENT_INTENSITY, FILL_LIGHT_INTENSITY, FILL_LIGHT_POSITION, KEY_LIGHT_INTENSITY,
    KEY_LIGHT_POSITION, SHADOW_BIAS, SHADOW_FAR, SHADOW_HALF_EXTENT, SHADOW_MAP_SIZE,
    SHADOW_NEAR, SHADOW_NORMAL_BIAS, SHADOW_PLANE_OPACITY, SHADOW_PLANE_SIZE,
    TONE_MAPPING_EXPOSURE,
};
use exhibit_core::camera::Camera;
use exhibit_core::model::ModelMesh;
use glam::{Mat3, Mat4, Vec3};
use web_sys as web;
use wgpu::util::DeviceExt;

mod helpers;
use helpers::{MeshBuffers, MeshPipelineDesc};

pub static VIEWER_WGSL: &str = include_str!("../shaders/viewer.wgsl");

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Globals {
    view_proj: [[f32; 4]; 4],
    light_view_proj: [[f32; 4]; 4],
    key_light: [f32; 4],
    fill_light: [f32; 4],
    params: [f32; 4],
    shadow: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct ObjectUniforms {
    model: [[f32; 4]; 4],
    normal: [[f32; 4]; 4],
}

impl ObjectUniforms {
    fn new(model: Mat4) -> Self {
        let normal = Mat4::from_mat3(Mat3::from_mat4(model).inverse().transpose());
        Self {
            model: model.to_cols_array_2d(),
            normal: normal.to_cols_array_2d(),
        }
    }
}

/// Everything the renderer needs for one frame.
pub struct SceneFrame {
    pub camera: Camera,
    /// Pivot transform combined with the model's fit.
    pub model: Mat4,
    /// Pivot transform combined with the shadow plane offset.
    pub plane: Mat4,
}

/// Orthographic projection of the key light's shadow camera, aimed at the origin.
pub fn key_light_view_proj() -> Mat4 {
    let e = SHADOW_HALF_EXTENT;
    let proj = Mat4::orthographic_rh(-e, e, -e, e, SHADOW_NEAR, SHADOW_FAR);
    let view = Mat4::look_at_rh(Vec3::from(KEY_LIGHT_POSITION), Vec3::ZERO, Vec3::Y);
    proj * view
}

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    depth_view: wgpu::TextureView,
    shadow_view: wgpu::TextureView,

    globals_buffer: wgpu::Buffer,
    model_buffer: wgpu::Buffer,
    plane_buffer: wgpu::Buffer,
    globals_bg: wgpu::BindGroup,
    shadow_globals_bg: wgpu::BindGroup,
    model_bg: wgpu::BindGroup,
    plane_bg: wgpu::BindGroup,

    shadow_pipeline: wgpu::RenderPipeline,
    model_pipeline: wgpu::RenderPipeline,
    plane_pipeline: wgpu::RenderPipeline,

    plane_mesh: MeshBuffers,
    model_mesh: Option<MeshBuffers>,

    width: u32,
    height: u32,
}

impl GpuState {
    pub async fn new(canvas: &web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        // transparent canvas over the page background
        let alpha_mode = if caps
            .alpha_modes
            .contains(&wgpu::CompositeAlphaMode::PreMultiplied)
        {
            wgpu::CompositeAlphaMode::PreMultiplied
        } else {
            caps.alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto)
        };
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let (_, depth_view) = helpers::create_depth_texture(
            &device,
            "depth_tex",
            width,
            height,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        );
        let (_, shadow_view) = helpers::create_depth_texture(
            &device,
            "shadow_map",
            SHADOW_MAP_SIZE,
            SHADOW_MAP_SIZE,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        );
        let shadow_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("shadow_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let object_buffer = |label: &str| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::bytes_of(&ObjectUniforms::new(Mat4::IDENTITY)),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            })
        };
        let model_buffer = object_buffer("model_uniforms");
        let plane_buffer = object_buffer("plane_uniforms");

        let globals_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_bgl"),
            entries: &[
                helpers::uniform_layout_entry(
                    0,
                    wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        });
        // The shadow pass writes the shadow map, so it must not also bind it.
        let shadow_globals_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("shadow_globals_bgl"),
            entries: &[helpers::uniform_layout_entry(0, wgpu::ShaderStages::VERTEX)],
        });
        let object_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object_bgl"),
            entries: &[helpers::uniform_layout_entry(0, wgpu::ShaderStages::VERTEX)],
        });

        let globals_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bg"),
            layout: &globals_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&shadow_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&shadow_sampler),
                },
            ],
        });
        let shadow_globals_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shadow_globals_bg"),
            layout: &shadow_globals_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });
        let object_bg = |label: &str, buffer: &wgpu::Buffer| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &object_bgl,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            })
        };
        let model_bg = object_bg("model_bg", &model_buffer);
        let plane_bg = object_bg("plane_bg", &plane_buffer);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("viewer_shader"),
            source: wgpu::ShaderSource::Wgsl(VIEWER_WGSL.into()),
        });
        let main_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("main_layout"),
            bind_group_layouts: &[&globals_bgl, &object_bgl],
            push_constant_ranges: &[],
        });
        let shadow_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("shadow_layout"),
            bind_group_layouts: &[&shadow_globals_bgl, &object_bgl],
            push_constant_ranges: &[],
        });

        let shadow_pipeline = helpers::make_mesh_pipeline(
            &device,
            &shadow_layout,
            &shader,
            &MeshPipelineDesc {
                label: "shadow_pipeline",
                vs_entry: "vs_shadow",
                fs_entry: None,
                color_format: format,
                blend: None,
                depth_write: true,
                cull_mode: None,
                depth_bias: wgpu::DepthBiasState::default(),
            },
        );
        let model_pipeline = helpers::make_mesh_pipeline(
            &device,
            &main_layout,
            &shader,
            &MeshPipelineDesc {
                label: "model_pipeline",
                vs_entry: "vs_main",
                fs_entry: Some("fs_model"),
                color_format: format,
                blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                depth_write: true,
                cull_mode: None,
                depth_bias: wgpu::DepthBiasState::default(),
            },
        );
        let plane_pipeline = helpers::make_mesh_pipeline(
            &device,
            &main_layout,
            &shader,
            &MeshPipelineDesc {
                label: "plane_pipeline",
                vs_entry: "vs_main",
                fs_entry: Some("fs_plane"),
                color_format: format,
                blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                depth_write: false,
                cull_mode: None,
                depth_bias: wgpu::DepthBiasState::default(),
            },
        );

        let (plane_vertices, plane_indices) = helpers::ground_plane(SHADOW_PLANE_SIZE);
        let plane_mesh = MeshBuffers::upload(&device, "plane_mesh", &plane_vertices, &plane_indices);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_view,
            shadow_view,
            globals_buffer,
            model_buffer,
            plane_buffer,
            globals_bg,
            shadow_globals_bg,
            model_bg,
            plane_bg,
            shadow_pipeline,
            model_pipeline,
            plane_pipeline,
            plane_mesh,
            model_mesh: None,
            width,
            height,
        })
    }

    pub fn upload_model(&mut self, mesh: &ModelMesh) {
        self.model_mesh = Some(MeshBuffers::upload(
            &self.device,
            "model_mesh",
            &mesh.vertices,
            &mesh.indices,
        ));
    }

    pub fn resize_if_needed(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || (width == self.width && height == self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        let (_, depth_view) = helpers::create_depth_texture(
            &self.device,
            "depth_tex",
            width,
            height,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        );
        self.depth_view = depth_view;
    }

    /// Reconfigure after the surface was lost or went out of date.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    fn write_uniforms(&self, frame: &SceneFrame) {
        let key = Vec3::from(KEY_LIGHT_POSITION).normalize();
        let fill = Vec3::from(FILL_LIGHT_POSITION).normalize();
        let globals = Globals {
            view_proj: frame.camera.view_projection().to_cols_array_2d(),
            light_view_proj: key_light_view_proj().to_cols_array_2d(),
            key_light: [key.x, key.y, key.z, KEY_LIGHT_INTENSITY],
            fill_light: [fill.x, fill.y, fill.z, FILL_LIGHT_INTENSITY],
            params: [
                AMBIENT_INTENSITY,
                TONE_MAPPING_EXPOSURE,
                SHADOW_BIAS,
                SHADOW_NORMAL_BIAS,
            ],
            shadow: [SHADOW_PLANE_OPACITY, 1.0 / SHADOW_MAP_SIZE as f32, 0.0, 0.0],
        };
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));
        self.queue.write_buffer(
            &self.model_buffer,
            0,
            bytemuck::bytes_of(&ObjectUniforms::new(frame.model)),
        );
        self.queue.write_buffer(
            &self.plane_buffer,
            0,
            bytemuck::bytes_of(&ObjectUniforms::new(frame.plane)),
        );
    }

    pub fn render(&mut self, frame: &SceneFrame) -> Result<(), wgpu::SurfaceError> {
        self.write_uniforms(frame);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("viewer_encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("shadow_pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            if let Some(mesh) = &self.model_mesh {
                pass.set_pipeline(&self.shadow_pipeline);
                pass.set_bind_group(0, &self.shadow_globals_bg, &[]);
                pass.set_bind_group(1, &self.model_bg, &[]);
                mesh.draw(&mut pass);
            }
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_bind_group(0, &self.globals_bg, &[]);
            if let Some(mesh) = &self.model_mesh {
                pass.set_pipeline(&self.model_pipeline);
                pass.set_bind_group(1, &self.model_bg, &[]);
                mesh.draw(&mut pass);
            }
            pass.set_pipeline(&self.plane_pipeline);
            pass.set_bind_group(1, &self.plane_bg, &[]);
            self.plane_mesh.draw(&mut pass);
        }

        self.queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }
}
