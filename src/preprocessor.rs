use crate::{
    BufferWrapper, CameraBuffer, GaussianRendererCreateError, GaussianPod, PointCloud,
    RenderSettingsBuffer, ShPod, SplatBufferSet, SplatPod,
};

/// Preprocessor to preprocess the Gaussians.
///
/// It culls the Gaussians, projects the survivors into compacted [`SplatPod`]s and emits the
/// `(key, index)` pairs for [`RadixSorter`](crate::RadixSorter).
#[derive(Debug)]
pub struct Preprocessor {
    /// The bind group layouts.
    bind_group_layouts: [wgpu::BindGroupLayout; 3],
    /// The bind groups.
    bind_groups: [wgpu::BindGroup; 3],
    /// The compute pipeline.
    pipeline: wgpu::ComputePipeline,
}

impl Preprocessor {
    /// The number of invocations in one workgroup, equal to the radix sort block size.
    pub const WORKGROUP_SIZE: u32 = crate::RadixSorter::BLOCK_SIZE;

    /// The uniforms bind group layout descriptor.
    pub const UNIFORMS_BIND_GROUP_LAYOUT_DESCRIPTOR: wgpu::BindGroupLayoutDescriptor<'static> =
        wgpu::BindGroupLayoutDescriptor {
            label: Some("Preprocessor Uniforms Bind Group Layout"),
            entries: &[
                // Camera uniform buffer
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<crate::CameraPod>() as u64,
                        ),
                    },
                    count: None,
                },
                // Render settings uniform buffer
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<crate::RenderSettingsPod>() as u64,
                        ),
                    },
                    count: None,
                },
            ],
        };

    /// The Gaussians bind group layout descriptor.
    pub const GAUSSIANS_BIND_GROUP_LAYOUT_DESCRIPTOR: wgpu::BindGroupLayoutDescriptor<'static> =
        wgpu::BindGroupLayoutDescriptor {
            label: Some("Preprocessor Gaussians Bind Group Layout"),
            entries: &[
                // Gaussians storage buffer
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<GaussianPod>() as u64,
                        ),
                    },
                    count: None,
                },
                // Splats storage buffer
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<SplatPod>() as u64,
                        ),
                    },
                    count: None,
                },
                // SH storage buffer
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<ShPod>() as u64,
                        ),
                    },
                    count: None,
                },
                // Splat slots storage buffer
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<u32>() as u64),
                    },
                    count: None,
                },
            ],
        };

    /// The compaction bind group layout descriptor.
    pub const COMPACTION_BIND_GROUP_LAYOUT_DESCRIPTOR: wgpu::BindGroupLayoutDescriptor<'static> =
        wgpu::BindGroupLayoutDescriptor {
            label: Some("Preprocessor Compaction Bind Group Layout"),
            entries: &[
                // Visible counter storage buffer
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<u32>() as u64),
                    },
                    count: None,
                },
                // Sort keys storage buffer
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<u32>() as u64),
                    },
                    count: None,
                },
                // Sort indices storage buffer
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<u32>() as u64),
                    },
                    count: None,
                },
                // Radix sort indirect args storage buffer
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<[u32; 3]>() as u64,
                        ),
                    },
                    count: None,
                },
            ],
        };

    /// Create a new preprocessor.
    pub fn new(
        device: &wgpu::Device,
        camera: &CameraBuffer,
        settings: &RenderSettingsBuffer,
        point_cloud: &PointCloud,
        buffers: &SplatBufferSet,
    ) -> Result<Self, GaussianRendererCreateError> {
        let device_limit = device.limits().max_storage_buffer_binding_size;
        [
            ("Gaussians buffer", point_cloud.gaussians().buffer()),
            ("SH buffer", point_cloud.sh().buffer()),
            ("Splat buffer", buffers.splats.buffer()),
        ]
        .into_iter()
        .find(|(_, buffer)| buffer.size() > device_limit as wgpu::BufferAddress)
        .map_or(Ok(()), |(label, buffer)| {
            Err(GaussianRendererCreateError::StorageBufferExceedsDeviceLimit {
                label,
                buffer_size: buffer.size(),
                device_limit,
            })
        })?;

        let workgroups = Self::workgroup_count(point_cloud.point_count());
        let workgroup_limit = device.limits().max_compute_workgroups_per_dimension;
        if workgroups > workgroup_limit {
            return Err(GaussianRendererCreateError::TooManyPoints {
                point_count: point_cloud.point_count(),
                workgroups,
                device_limit: workgroup_limit,
            });
        }

        log::debug!("Creating preprocessor bind group layouts");
        let bind_group_layouts = [
            &Self::UNIFORMS_BIND_GROUP_LAYOUT_DESCRIPTOR,
            &Self::GAUSSIANS_BIND_GROUP_LAYOUT_DESCRIPTOR,
            &Self::COMPACTION_BIND_GROUP_LAYOUT_DESCRIPTOR,
        ]
        .map(|descriptor| device.create_bind_group_layout(descriptor));

        log::debug!("Creating preprocessor uniforms bind group");
        let uniforms_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Preprocessor Uniforms Bind Group"),
            layout: &bind_group_layouts[0],
            entries: &[
                // Camera uniform buffer
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera.buffer().as_entire_binding(),
                },
                // Render settings uniform buffer
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: settings.buffer().as_entire_binding(),
                },
            ],
        });

        log::debug!("Creating preprocessor Gaussians bind group");
        let gaussians_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Preprocessor Gaussians Bind Group"),
            layout: &bind_group_layouts[1],
            entries: &[
                // Gaussians storage buffer
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: point_cloud.gaussians().buffer().as_entire_binding(),
                },
                // Splats storage buffer
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: buffers.splats.buffer().as_entire_binding(),
                },
                // SH storage buffer
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: point_cloud.sh().buffer().as_entire_binding(),
                },
                // Splat slots storage buffer
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: buffers.splat_slots.buffer().as_entire_binding(),
                },
            ],
        });

        log::debug!("Creating preprocessor compaction bind group");
        let compaction_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Preprocessor Compaction Bind Group"),
            layout: &bind_group_layouts[2],
            entries: &[
                // Visible counter storage buffer
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffers.visible_counter.buffer().as_entire_binding(),
                },
                // Sort keys storage buffer
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: buffers.sort.front().keys.buffer().as_entire_binding(),
                },
                // Sort indices storage buffer
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: buffers.sort.front().indices.buffer().as_entire_binding(),
                },
                // Radix sort indirect args storage buffer
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: buffers.radix_sort_indirect_args.buffer().as_entire_binding(),
                },
            ],
        });

        log::debug!("Creating preprocessor pipeline layout");
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Preprocessor Pipeline Layout"),
            bind_group_layouts: &bind_group_layouts.each_ref(),
            push_constant_ranges: &[],
        });

        log::debug!("Creating preprocessor shader");
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Preprocessor Shader"),
            source: wgpu::ShaderSource::Wgsl(
                include_str!("shader/preprocess.wgsl")
                    .replace("{{workgroup_size}}", Self::WORKGROUP_SIZE.to_string().as_str())
                    .into(),
            ),
        });

        log::debug!("Creating preprocessor pipeline");
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Preprocessor Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("preprocess"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        log::info!("Preprocessor created");

        Ok(Self {
            bind_group_layouts,
            bind_groups: [
                uniforms_bind_group,
                gaussians_bind_group,
                compaction_bind_group,
            ],
            pipeline,
        })
    }

    /// Preprocess the Gaussians.
    ///
    /// The visible counter and the radix sort dispatch `x` must be zeroed earlier in the same
    /// encoder, see [`SplatBufferSet::reset`].
    pub fn preprocess(&self, encoder: &mut wgpu::CommandEncoder, point_count: u32) {
        let workgroups = Self::workgroup_count(point_count);
        if workgroups == 0 {
            return;
        }

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Preprocessor Compute Pass"),
            timestamp_writes: None,
        });

        pass.set_pipeline(&self.pipeline);
        for (i, bind_group) in self.bind_groups.iter().enumerate() {
            pass.set_bind_group(i as u32, bind_group, &[]);
        }
        pass.dispatch_workgroups(workgroups, 1, 1);
    }

    /// Get the number of workgroups for `point_count` Gaussians.
    pub fn workgroup_count(point_count: u32) -> u32 {
        point_count.div_ceil(Self::WORKGROUP_SIZE)
    }

    /// Get the bind group layouts.
    pub fn bind_group_layouts(&self) -> &[wgpu::BindGroupLayout; 3] {
        &self.bind_group_layouts
    }
}
