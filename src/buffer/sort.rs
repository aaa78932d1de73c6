use crate::{BufferWrapper, RadixSorter};

/// The sort keys storage buffer.
///
/// Each key is `0xFFFF_FFFF - bits(view_depth)`, so ascending keys order splats from the
/// farthest to the nearest.
#[derive(Debug, Clone)]
pub struct SortKeysBuffer(wgpu::Buffer);

impl SortKeysBuffer {
    /// Create a new sort keys buffer.
    pub fn new(device: &wgpu::Device, point_count: u32, label: &str) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: point_count.max(1) as wgpu::BufferAddress
                * std::mem::size_of::<u32>() as wgpu::BufferAddress,
            usage: Self::DEFAULT_USAGES,
            mapped_at_creation: false,
        });

        Self(buffer)
    }
}

impl BufferWrapper for SortKeysBuffer {
    const DEFAULT_USAGES: wgpu::BufferUsages = wgpu::BufferUsages::from_bits_retain(
        wgpu::BufferUsages::STORAGE.bits() | wgpu::BufferUsages::COPY_SRC.bits(),
    );

    fn buffer(&self) -> &wgpu::Buffer {
        &self.0
    }
}

impl From<SortKeysBuffer> for wgpu::Buffer {
    fn from(wrapper: SortKeysBuffer) -> Self {
        wrapper.0
    }
}

/// The sort indices storage buffer.
///
/// Each index is the original index of a visible Gaussian. After sorting, the indices of the
/// first side of [`SortPingPongBuffers`] are the draw order consumed by the
/// [`Renderer`](crate::Renderer).
#[derive(Debug, Clone)]
pub struct SortIndicesBuffer(wgpu::Buffer);

impl SortIndicesBuffer {
    /// Create a new sort indices buffer.
    pub fn new(device: &wgpu::Device, point_count: u32, label: &str) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: point_count.max(1) as wgpu::BufferAddress
                * std::mem::size_of::<u32>() as wgpu::BufferAddress,
            usage: Self::DEFAULT_USAGES,
            mapped_at_creation: false,
        });

        Self(buffer)
    }
}

impl BufferWrapper for SortIndicesBuffer {
    const DEFAULT_USAGES: wgpu::BufferUsages = wgpu::BufferUsages::from_bits_retain(
        wgpu::BufferUsages::STORAGE.bits() | wgpu::BufferUsages::COPY_SRC.bits(),
    );

    fn buffer(&self) -> &wgpu::Buffer {
        &self.0
    }
}

impl From<SortIndicesBuffer> for wgpu::Buffer {
    fn from(wrapper: SortIndicesBuffer) -> Self {
        wrapper.0
    }
}

/// One side of the ping-pong sort buffers.
#[derive(Debug, Clone)]
pub struct SortBuffers {
    pub keys: SortKeysBuffer,
    pub indices: SortIndicesBuffer,
}

/// The ping-pong sort buffers.
///
/// The [`Preprocessor`](crate::Preprocessor) writes side `0`, every radix sort pass reads one
/// side and writes the other, and the sorted result always ends up back in side `0`.
#[derive(Debug, Clone)]
pub struct SortPingPongBuffers(pub [SortBuffers; 2]);

impl SortPingPongBuffers {
    /// Create new ping-pong sort buffers.
    pub fn new(device: &wgpu::Device, point_count: u32) -> Self {
        Self([0, 1].map(|side| SortBuffers {
            keys: SortKeysBuffer::new(
                device,
                point_count,
                format!("Sort Keys Buffer {side}").as_str(),
            ),
            indices: SortIndicesBuffer::new(
                device,
                point_count,
                format!("Sort Indices Buffer {side}").as_str(),
            ),
        }))
    }

    /// Get the side written by preprocessing and holding the sorted result.
    pub fn front(&self) -> &SortBuffers {
        &self.0[0]
    }

    /// Get the scratch side.
    pub fn back(&self) -> &SortBuffers {
        &self.0[1]
    }
}

/// The radix sort block histogram storage buffer.
///
/// Laid out digit-major, `histograms[digit * block_capacity + block]`.
#[derive(Debug, Clone)]
pub struct RadixSortHistogramBuffer(wgpu::Buffer);

impl RadixSortHistogramBuffer {
    /// Create a new radix sort histogram buffer.
    pub fn new(device: &wgpu::Device, point_count: u32) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Radix Sort Histogram Buffer"),
            size: (RadixSorter::RADIX * RadixSorter::block_capacity(point_count))
                as wgpu::BufferAddress
                * std::mem::size_of::<u32>() as wgpu::BufferAddress,
            usage: Self::DEFAULT_USAGES,
            mapped_at_creation: false,
        });

        Self(buffer)
    }
}

impl BufferWrapper for RadixSortHistogramBuffer {
    const DEFAULT_USAGES: wgpu::BufferUsages = wgpu::BufferUsages::STORAGE;

    fn buffer(&self) -> &wgpu::Buffer {
        &self.0
    }
}

impl From<RadixSortHistogramBuffer> for wgpu::Buffer {
    fn from(wrapper: RadixSortHistogramBuffer) -> Self {
        wrapper.0
    }
}
