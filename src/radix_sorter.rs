use wgpu::util::DeviceExt;

use crate::{
    BufferWrapper, RadixSortHistogramBuffer, RadixSortIndirectArgsBuffer, SortBuffers,
    SortPingPongBuffers, VisibleCounterBuffer,
};

/// A GPU radix sorter for the depth sort of splats.
///
/// Sorts the `(key, index)` pairs of the front side of [`SortPingPongBuffers`] in ascending
/// `(key, index)` order, which is farthest first with ties broken by the original index. The
/// number of pairs is never known to the host:
/// - The block dispatches are indirect, sized by [`RadixSortIndirectArgsBuffer`].
/// - The scan reads the count from [`VisibleCounterBuffer`].
///
/// The result only depends on the set of pairs, not on the order the
/// [`Preprocessor`](crate::Preprocessor) happened to compact them in.
#[derive(Debug)]
pub struct RadixSorter {
    /// The bind group layout.
    #[allow(dead_code)]
    bind_group_layout: wgpu::BindGroupLayout,
    /// The bind groups, one per pass.
    bind_groups: Vec<wgpu::BindGroup>,
    /// The histogram pipeline.
    histogram_pipeline: wgpu::ComputePipeline,
    /// The scan pipeline.
    scan_pipeline: wgpu::ComputePipeline,
    /// The scatter pipeline.
    scatter_pipeline: wgpu::ComputePipeline,
}

impl RadixSorter {
    /// The number of pairs handled by one workgroup.
    pub const BLOCK_SIZE: u32 = 256;

    /// The number of digit values.
    pub const RADIX: u32 = 256;

    /// The number of bits of a digit.
    pub const DIGIT_BITS: u32 = 8;

    /// The number of digit passes over the key.
    pub const KEY_PASSES: u32 = u32::BITS / Self::DIGIT_BITS;

    /// The bind group layout descriptor.
    pub const BIND_GROUP_LAYOUT_DESCRIPTOR: wgpu::BindGroupLayoutDescriptor<'static> =
        wgpu::BindGroupLayoutDescriptor {
            label: Some("Radix Sorter Bind Group Layout"),
            entries: &[
                // Pass info uniform buffer
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<RadixSortPassPod>() as u64,
                        ),
                    },
                    count: None,
                },
                // Visible counter storage buffer
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<u32>() as u64),
                    },
                    count: None,
                },
                // Source keys storage buffer
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Source indices storage buffer
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Destination keys storage buffer
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Destination indices storage buffer
                wgpu::BindGroupLayoutEntry {
                    binding: 5,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Histograms storage buffer
                wgpu::BindGroupLayoutEntry {
                    binding: 6,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        };

    /// Create a new radix sorter for `point_count` pairs.
    pub fn new(
        device: &wgpu::Device,
        point_count: u32,
        visible_counter: &VisibleCounterBuffer,
        sort: &SortPingPongBuffers,
        histograms: &RadixSortHistogramBuffer,
    ) -> Self {
        log::debug!("Creating radix sorter bind group layout");
        let bind_group_layout =
            device.create_bind_group_layout(&Self::BIND_GROUP_LAYOUT_DESCRIPTOR);

        let block_capacity = Self::block_capacity(point_count);
        let passes = Self::passes(point_count);

        log::debug!("Creating radix sorter bind groups for {} passes", passes.len());
        let bind_groups = passes
            .iter()
            .enumerate()
            .map(|(i, pass)| {
                let pod = RadixSortPassPod {
                    shift: pass.shift,
                    digit_from_index: pass.digit_from_index as u32,
                    block_capacity,
                    _padding: 0,
                };

                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(format!("Radix Sort Pass {i} Buffer").as_str()),
                    contents: bytemuck::bytes_of(&pod),
                    usage: wgpu::BufferUsages::UNIFORM,
                });

                let (src, dst) = match i % 2 {
                    0 => (sort.front(), sort.back()),
                    _ => (sort.back(), sort.front()),
                };

                Self::create_bind_group(
                    device,
                    &bind_group_layout,
                    &buffer,
                    visible_counter,
                    src,
                    dst,
                    histograms,
                )
            })
            .collect();

        log::debug!("Creating radix sorter shader");
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Radix Sorter Shader"),
            source: wgpu::ShaderSource::Wgsl(
                include_str!("shader/radix_sort.wgsl")
                    .replace("{{workgroup_size}}", Self::BLOCK_SIZE.to_string().as_str())
                    .into(),
            ),
        });

        log::debug!("Creating radix sorter pipeline layout");
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Radix Sorter Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let create_pipeline = |label: &str, entry_point: &str| {
            log::debug!("Creating radix sorter {entry_point} pipeline");
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                module: &shader,
                entry_point: Some(entry_point),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                cache: None,
            })
        };

        let histogram_pipeline = create_pipeline("Radix Sorter Histogram Pipeline", "histogram");
        let scan_pipeline = create_pipeline("Radix Sorter Scan Pipeline", "scan");
        let scatter_pipeline = create_pipeline("Radix Sorter Scatter Pipeline", "scatter");

        log::info!("Radix sorter created");

        Self {
            bind_group_layout,
            bind_groups,
            histogram_pipeline,
            scan_pipeline,
            scatter_pipeline,
        }
    }

    /// Sort the pairs.
    ///
    /// Does nothing on the device if the dispatch `x` of `indirect_args` is zero.
    pub fn sort(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        indirect_args: &RadixSortIndirectArgsBuffer,
    ) {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Radix Sorter Compute Pass"),
            timestamp_writes: None,
        });

        for bind_group in self.bind_groups.iter() {
            pass.set_bind_group(0, bind_group, &[]);

            pass.set_pipeline(&self.histogram_pipeline);
            pass.dispatch_workgroups_indirect(indirect_args.buffer(), 0);

            pass.set_pipeline(&self.scan_pipeline);
            pass.dispatch_workgroups(1, 1, 1);

            pass.set_pipeline(&self.scatter_pipeline);
            pass.dispatch_workgroups_indirect(indirect_args.buffer(), 0);
        }
    }

    /// Get the maximum number of blocks for `point_count` pairs, at least one.
    pub fn block_capacity(point_count: u32) -> u32 {
        point_count.div_ceil(Self::BLOCK_SIZE).max(1)
    }

    /// Get the digit passes for `point_count` pairs.
    ///
    /// Index digits come first so the key passes, being stable, leave equal keys in index
    /// order. The pass count is always even so the result lands back in the front side.
    pub fn passes(point_count: u32) -> Vec<RadixSortPass> {
        let index_bits = u32::BITS - point_count.saturating_sub(1).leading_zeros();
        let mut index_passes = index_bits.div_ceil(Self::DIGIT_BITS);
        if (index_passes + Self::KEY_PASSES) % 2 == 1 {
            index_passes += 1;
        }

        let index = (0..index_passes).map(|i| RadixSortPass {
            shift: i * Self::DIGIT_BITS,
            digit_from_index: true,
        });
        let key = (0..Self::KEY_PASSES).map(|i| RadixSortPass {
            shift: i * Self::DIGIT_BITS,
            digit_from_index: false,
        });

        index.chain(key).collect()
    }

    /// Create the bind group of one pass.
    fn create_bind_group(
        device: &wgpu::Device,
        bind_group_layout: &wgpu::BindGroupLayout,
        pass_buffer: &wgpu::Buffer,
        visible_counter: &VisibleCounterBuffer,
        src: &SortBuffers,
        dst: &SortBuffers,
        histograms: &RadixSortHistogramBuffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Radix Sorter Bind Group"),
            layout: bind_group_layout,
            entries: &[
                // Pass info uniform buffer
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: pass_buffer.as_entire_binding(),
                },
                // Visible counter storage buffer
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: visible_counter.buffer().as_entire_binding(),
                },
                // Source keys storage buffer
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: src.keys.buffer().as_entire_binding(),
                },
                // Source indices storage buffer
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: src.indices.buffer().as_entire_binding(),
                },
                // Destination keys storage buffer
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: dst.keys.buffer().as_entire_binding(),
                },
                // Destination indices storage buffer
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: dst.indices.buffer().as_entire_binding(),
                },
                // Histograms storage buffer
                wgpu::BindGroupEntry {
                    binding: 6,
                    resource: histograms.buffer().as_entire_binding(),
                },
            ],
        })
    }
}

const _: () = assert!(RadixSorter::BLOCK_SIZE == RadixSorter::RADIX);

/// One digit pass of [`RadixSorter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadixSortPass {
    /// The bit offset of the digit.
    pub shift: u32,
    /// Whether the digit is taken from the index instead of the key.
    pub digit_from_index: bool,
}

/// The POD representation of a [`RadixSortPass`].
///
/// Must match `PassInfo` in `shader/radix_sort.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RadixSortPassPod {
    pub shift: u32,
    pub digit_from_index: u32,
    pub block_capacity: u32,
    pub _padding: u32,
}
