use wgpu::util::DeviceExt;

use crate::{BufferWrapper, FixedSizeBufferWrapper, FixedSizeBufferWrapperError};

/// The draw indirect args buffer for [`Renderer`](crate::Renderer).
///
/// Holds `{ vertex_count: 6, instance_count, first_vertex: 0, first_instance: 0 }`. Only
/// `instance_count` ever changes, and only through a device-side copy from
/// [`VisibleCounterBuffer`].
#[derive(Debug, Clone)]
pub struct IndirectArgsBuffer(wgpu::Buffer);

impl IndirectArgsBuffer {
    /// The number of vertices of one splat quad, two triangles.
    pub const VERTICES_PER_INSTANCE: u32 = 6;

    /// The byte offset of `instance_count`.
    pub const INSTANCE_COUNT_OFFSET: wgpu::BufferAddress =
        std::mem::size_of::<u32>() as wgpu::BufferAddress;

    /// Create a new indirect args buffer.
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Indirect Args Buffer"),
            contents: wgpu::util::DrawIndirectArgs {
                vertex_count: Self::VERTICES_PER_INSTANCE,
                instance_count: 0,
                first_vertex: 0,
                first_instance: 0,
            }
            .as_bytes(),
            usage: Self::DEFAULT_USAGES,
        });

        Self(buffer)
    }
}

impl BufferWrapper for IndirectArgsBuffer {
    const DEFAULT_USAGES: wgpu::BufferUsages = wgpu::BufferUsages::from_bits_retain(
        wgpu::BufferUsages::INDIRECT.bits()
            | wgpu::BufferUsages::COPY_DST.bits()
            | wgpu::BufferUsages::COPY_SRC.bits(),
    );

    fn buffer(&self) -> &wgpu::Buffer {
        &self.0
    }
}

impl From<IndirectArgsBuffer> for wgpu::Buffer {
    fn from(wrapper: IndirectArgsBuffer) -> Self {
        wrapper.0
    }
}

impl TryFrom<wgpu::Buffer> for IndirectArgsBuffer {
    type Error = FixedSizeBufferWrapperError;

    fn try_from(buffer: wgpu::Buffer) -> Result<Self, Self::Error> {
        Self::verify_buffer_size(&buffer).map(|()| Self(buffer))
    }
}

impl FixedSizeBufferWrapper for IndirectArgsBuffer {
    /// `[vertex_count, instance_count, first_vertex, first_instance]`.
    type Pod = [u32; 4];
}

/// The dispatch indirect args buffer for [`RadixSorter`](crate::RadixSorter).
///
/// `x` is zeroed at the start of every frame and incremented by the
/// [`Preprocessor`](crate::Preprocessor) once per started block of
/// [`RadixSorter::BLOCK_SIZE`](crate::RadixSorter::BLOCK_SIZE) visible splats.
#[derive(Debug, Clone)]
pub struct RadixSortIndirectArgsBuffer(wgpu::Buffer);

impl RadixSortIndirectArgsBuffer {
    /// Create a new dispatch indirect args buffer.
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Radix Sort Indirect Args Buffer"),
            contents: wgpu::util::DispatchIndirectArgs { x: 0, y: 1, z: 1 }.as_bytes(),
            usage: Self::DEFAULT_USAGES,
        });

        Self(buffer)
    }
}

impl BufferWrapper for RadixSortIndirectArgsBuffer {
    const DEFAULT_USAGES: wgpu::BufferUsages = wgpu::BufferUsages::from_bits_retain(
        wgpu::BufferUsages::STORAGE.bits()
            | wgpu::BufferUsages::INDIRECT.bits()
            | wgpu::BufferUsages::COPY_DST.bits()
            | wgpu::BufferUsages::COPY_SRC.bits(),
    );

    fn buffer(&self) -> &wgpu::Buffer {
        &self.0
    }
}

impl From<RadixSortIndirectArgsBuffer> for wgpu::Buffer {
    fn from(wrapper: RadixSortIndirectArgsBuffer) -> Self {
        wrapper.0
    }
}

impl TryFrom<wgpu::Buffer> for RadixSortIndirectArgsBuffer {
    type Error = FixedSizeBufferWrapperError;

    fn try_from(buffer: wgpu::Buffer) -> Result<Self, Self::Error> {
        Self::verify_buffer_size(&buffer).map(|()| Self(buffer))
    }
}

impl FixedSizeBufferWrapper for RadixSortIndirectArgsBuffer {
    /// `[x, y, z]`.
    type Pod = [u32; 3];
}

/// The visible counter storage buffer.
///
/// A single `u32` used as an atomic counter on the device:
/// - It is zeroed by a device-side copy before every preprocessing dispatch.
/// - Every visible Gaussian increments it once with a relaxed `atomicAdd`, the returned value
///   is the compaction slot of the Gaussian.
/// - The final value is only read by later dispatches and copies. The dispatch and pass
///   boundaries wgpu records between them act as the acquire, so no reader ever observes a
///   partially incremented count.
///
/// The host never reads it on the frame path.
#[derive(Debug, Clone)]
pub struct VisibleCounterBuffer(wgpu::Buffer);

impl VisibleCounterBuffer {
    /// Create a new visible counter buffer.
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Visible Counter Buffer"),
            contents: bytemuck::bytes_of(&0u32),
            usage: Self::DEFAULT_USAGES,
        });

        Self(buffer)
    }
}

impl BufferWrapper for VisibleCounterBuffer {
    const DEFAULT_USAGES: wgpu::BufferUsages = wgpu::BufferUsages::from_bits_retain(
        wgpu::BufferUsages::STORAGE.bits()
            | wgpu::BufferUsages::COPY_DST.bits()
            | wgpu::BufferUsages::COPY_SRC.bits(),
    );

    fn buffer(&self) -> &wgpu::Buffer {
        &self.0
    }
}

impl From<VisibleCounterBuffer> for wgpu::Buffer {
    fn from(wrapper: VisibleCounterBuffer) -> Self {
        wrapper.0
    }
}

impl TryFrom<wgpu::Buffer> for VisibleCounterBuffer {
    type Error = FixedSizeBufferWrapperError;

    fn try_from(buffer: wgpu::Buffer) -> Result<Self, Self::Error> {
        Self::verify_buffer_size(&buffer).map(|()| Self(buffer))
    }
}

impl FixedSizeBufferWrapper for VisibleCounterBuffer {
    type Pod = u32;
}

/// The zero scratch buffer, only ever used as a copy source for resets.
#[derive(Debug, Clone)]
pub struct ZeroBuffer(wgpu::Buffer);

impl ZeroBuffer {
    /// The size of the zero region.
    pub const SIZE: wgpu::BufferAddress = 16;

    /// Create a new zero buffer.
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Zero Buffer"),
            size: Self::SIZE,
            usage: Self::DEFAULT_USAGES,
            mapped_at_creation: false,
        });

        Self(buffer)
    }
}

impl BufferWrapper for ZeroBuffer {
    const DEFAULT_USAGES: wgpu::BufferUsages = wgpu::BufferUsages::COPY_SRC;

    fn buffer(&self) -> &wgpu::Buffer {
        &self.0
    }
}

impl From<ZeroBuffer> for wgpu::Buffer {
    fn from(wrapper: ZeroBuffer) -> Self {
        wrapper.0
    }
}
