use crate::{
    BufferWrapper, IndirectArgsBuffer, RadixSortHistogramBuffer, RadixSortIndirectArgsBuffer,
    SortPingPongBuffers, SplatBuffer, SplatSlotsBuffer, VisibleCounterBuffer, ZeroBuffer,
};

/// All device arrays of one point cloud.
///
/// Sized from the point count at construction and never resized.
#[derive(Debug, Clone)]
pub struct SplatBufferSet {
    pub splats: SplatBuffer,
    pub splat_slots: SplatSlotsBuffer,
    pub sort: SortPingPongBuffers,
    pub radix_sort_histograms: RadixSortHistogramBuffer,
    pub visible_counter: VisibleCounterBuffer,
    pub radix_sort_indirect_args: RadixSortIndirectArgsBuffer,
    pub indirect_args: IndirectArgsBuffer,
    pub zero: ZeroBuffer,
}

impl SplatBufferSet {
    /// Create a new buffer set for `point_count` Gaussians.
    pub fn new(device: &wgpu::Device, point_count: u32) -> Self {
        log::debug!("Creating splat buffer");
        let splats = SplatBuffer::new(device, point_count);

        log::debug!("Creating splat slots buffer");
        let splat_slots = SplatSlotsBuffer::new(device, point_count);

        log::debug!("Creating sort ping-pong buffers");
        let sort = SortPingPongBuffers::new(device, point_count);

        log::debug!("Creating radix sort histogram buffer");
        let radix_sort_histograms = RadixSortHistogramBuffer::new(device, point_count);

        log::debug!("Creating visible counter buffer");
        let visible_counter = VisibleCounterBuffer::new(device);

        log::debug!("Creating radix sort indirect args buffer");
        let radix_sort_indirect_args = RadixSortIndirectArgsBuffer::new(device);

        log::debug!("Creating indirect args buffer");
        let indirect_args = IndirectArgsBuffer::new(device);

        log::debug!("Creating zero buffer");
        let zero = ZeroBuffer::new(device);

        Self {
            splats,
            splat_slots,
            sort,
            radix_sort_histograms,
            visible_counter,
            radix_sort_indirect_args,
            indirect_args,
            zero,
        }
    }

    /// Zero the visible counter and the radix sort dispatch `x`.
    ///
    /// Recorded as device-side copies from [`ZeroBuffer`], the host never writes either.
    pub fn reset(&self, encoder: &mut wgpu::CommandEncoder) {
        let size = std::mem::size_of::<u32>() as wgpu::BufferAddress;

        encoder.copy_buffer_to_buffer(
            self.zero.buffer(),
            0,
            self.visible_counter.buffer(),
            0,
            size,
        );
        encoder.copy_buffer_to_buffer(
            self.zero.buffer(),
            0,
            self.radix_sort_indirect_args.buffer(),
            0,
            size,
        );
    }

    /// Copy the visible counter into the draw `instance_count`.
    pub fn propagate_visible_count(&self, encoder: &mut wgpu::CommandEncoder) {
        encoder.copy_buffer_to_buffer(
            self.visible_counter.buffer(),
            0,
            self.indirect_args.buffer(),
            IndirectArgsBuffer::INSTANCE_COUNT_OFFSET,
            std::mem::size_of::<u32>() as wgpu::BufferAddress,
        );
    }
}
