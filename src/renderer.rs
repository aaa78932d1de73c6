use crate::{BufferWrapper, CameraBuffer, CameraPod, IndirectArgsBuffer, SplatBufferSet, SplatPod};

/// A renderer for the sorted splats.
///
/// Draws one screen-aligned quad per visible splat with an indirect draw, back to front in the
/// order of the front side of [`SortPingPongBuffers`](crate::SortPingPongBuffers).
#[derive(Debug)]
pub struct Renderer {
    /// The bind group layouts.
    #[allow(dead_code)]
    bind_group_layouts: [wgpu::BindGroupLayout; 2],
    /// The bind groups.
    bind_groups: [wgpu::BindGroup; 2],
    /// The render pipeline.
    pipeline: wgpu::RenderPipeline,
}

impl Renderer {
    /// The camera bind group layout descriptor.
    pub const CAMERA_BIND_GROUP_LAYOUT_DESCRIPTOR: wgpu::BindGroupLayoutDescriptor<'static> =
        wgpu::BindGroupLayoutDescriptor {
            label: Some("Renderer Camera Bind Group Layout"),
            entries: &[
                // Camera uniform buffer
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<CameraPod>() as u64,
                        ),
                    },
                    count: None,
                },
            ],
        };

    /// The splats bind group layout descriptor.
    pub const SPLATS_BIND_GROUP_LAYOUT_DESCRIPTOR: wgpu::BindGroupLayoutDescriptor<'static> =
        wgpu::BindGroupLayoutDescriptor {
            label: Some("Renderer Splats Bind Group Layout"),
            entries: &[
                // Splats storage buffer
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<SplatPod>() as u64,
                        ),
                    },
                    count: None,
                },
                // Sorted indices storage buffer
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<u32>() as u64),
                    },
                    count: None,
                },
                // Splat slots storage buffer
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<u32>() as u64),
                    },
                    count: None,
                },
            ],
        };

    /// Create a new renderer.
    pub fn new(
        device: &wgpu::Device,
        texture_format: wgpu::TextureFormat,
        camera: &CameraBuffer,
        buffers: &SplatBufferSet,
    ) -> Self {
        log::debug!("Creating renderer bind group layouts");
        let bind_group_layouts = [
            &Self::CAMERA_BIND_GROUP_LAYOUT_DESCRIPTOR,
            &Self::SPLATS_BIND_GROUP_LAYOUT_DESCRIPTOR,
        ]
        .map(|descriptor| device.create_bind_group_layout(descriptor));

        log::debug!("Creating renderer camera bind group");
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Renderer Camera Bind Group"),
            layout: &bind_group_layouts[0],
            entries: &[
                // Camera uniform buffer
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera.buffer().as_entire_binding(),
                },
            ],
        });

        log::debug!("Creating renderer splats bind group");
        let splats_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Renderer Splats Bind Group"),
            layout: &bind_group_layouts[1],
            entries: &[
                // Splats storage buffer
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffers.splats.buffer().as_entire_binding(),
                },
                // Sorted indices storage buffer
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: buffers.sort.front().indices.buffer().as_entire_binding(),
                },
                // Splat slots storage buffer
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: buffers.splat_slots.buffer().as_entire_binding(),
                },
            ],
        });

        log::debug!("Creating renderer pipeline layout");
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Renderer Pipeline Layout"),
            bind_group_layouts: &bind_group_layouts.each_ref(),
            push_constant_ranges: &[],
        });

        log::debug!("Creating renderer shader");
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Renderer Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader/render.wgsl").into()),
        });

        // Premultiplied alpha, back to front
        let blend_component = wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        };

        log::debug!("Creating renderer pipeline");
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Renderer Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vert_main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("frag_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: texture_format,
                    blend: Some(wgpu::BlendState {
                        color: blend_component,
                        alpha: blend_component,
                    }),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        log::info!("Renderer created");

        Self {
            bind_group_layouts,
            bind_groups: [camera_bind_group, splats_bind_group],
            pipeline,
        }
    }

    /// Render the splats.
    ///
    /// Clears `view` to transparent, then draws `instance_count` of `indirect_args` quads.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        indirect_args: &IndirectArgsBuffer,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Renderer Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        render_pass.set_pipeline(&self.pipeline);
        for (i, bind_group) in self.bind_groups.iter().enumerate() {
            render_pass.set_bind_group(i as u32, bind_group, &[]);
        }
        render_pass.draw_indirect(indirect_args.buffer(), 0);
    }
}
