use crate::{BufferWrapper, unpack_half2};

/// The splat storage buffer.
///
/// Holds one [`SplatPod`] per Gaussian. Visible splats are compacted to the front by the
/// [`Preprocessor`](crate::Preprocessor) every frame, the rest of the buffer keeps whatever
/// an earlier frame left there.
#[derive(Debug, Clone)]
pub struct SplatBuffer(wgpu::Buffer);

impl SplatBuffer {
    /// Create a new splat buffer, zero-initialized.
    pub fn new(device: &wgpu::Device, point_count: u32) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Splat Buffer"),
            size: point_count.max(1) as wgpu::BufferAddress
                * std::mem::size_of::<SplatPod>() as wgpu::BufferAddress,
            usage: Self::DEFAULT_USAGES,
            mapped_at_creation: false,
        });

        Self(buffer)
    }

    /// Get the number of splats the buffer can hold.
    pub fn capacity(&self) -> u32 {
        (self.0.size() / std::mem::size_of::<SplatPod>() as wgpu::BufferAddress) as u32
    }
}

impl BufferWrapper for SplatBuffer {
    const DEFAULT_USAGES: wgpu::BufferUsages = wgpu::BufferUsages::from_bits_retain(
        wgpu::BufferUsages::STORAGE.bits()
            | wgpu::BufferUsages::COPY_DST.bits()
            | wgpu::BufferUsages::COPY_SRC.bits(),
    );

    fn buffer(&self) -> &wgpu::Buffer {
        &self.0
    }
}

impl From<SplatBuffer> for wgpu::Buffer {
    fn from(wrapper: SplatBuffer) -> Self {
        wrapper.0
    }
}

impl From<wgpu::Buffer> for SplatBuffer {
    fn from(buffer: wgpu::Buffer) -> Self {
        Self(buffer)
    }
}

/// The splat slots storage buffer.
///
/// Indexed by the original Gaussian index, each entry is the slot of the Gaussian's splat in
/// [`SplatBuffer`] for the current frame. Only entries of visible Gaussians are meaningful.
#[derive(Debug, Clone)]
pub struct SplatSlotsBuffer(wgpu::Buffer);

impl SplatSlotsBuffer {
    /// Create a new splat slots buffer.
    pub fn new(device: &wgpu::Device, point_count: u32) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Splat Slots Buffer"),
            size: point_count.max(1) as wgpu::BufferAddress
                * std::mem::size_of::<u32>() as wgpu::BufferAddress,
            usage: Self::DEFAULT_USAGES,
            mapped_at_creation: false,
        });

        Self(buffer)
    }
}

impl BufferWrapper for SplatSlotsBuffer {
    const DEFAULT_USAGES: wgpu::BufferUsages = wgpu::BufferUsages::from_bits_retain(
        wgpu::BufferUsages::STORAGE.bits() | wgpu::BufferUsages::COPY_SRC.bits(),
    );

    fn buffer(&self) -> &wgpu::Buffer {
        &self.0
    }
}

impl From<SplatSlotsBuffer> for wgpu::Buffer {
    fn from(wrapper: SplatSlotsBuffer) -> Self {
        wrapper.0
    }
}

/// The POD representation of a splat.
///
/// Must match `Splat` in `shader/preprocess.wgsl` and `shader/render.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SplatPod {
    /// The center in normalized device coordinates, as `f32` bits.
    pub center: [u32; 2],
    /// The quad half-size in normalized device coordinates, packed `f16` pair.
    pub extent: u32,
    /// The conic `x` and `y`, packed `f16` pair.
    pub conic_xy: u32,
    /// The conic `z` and the opacity, packed `f16` pair.
    pub conic_z_opacity: u32,
    /// The red and green color components, packed `f16` pair.
    pub color_rg: u32,
    /// The blue and alpha color components, packed `f16` pair.
    pub color_ba: u32,
    /// The original index of the Gaussian.
    pub gaussian_index: u32,
}

impl SplatPod {
    /// Get the center in normalized device coordinates.
    pub fn center(&self) -> [f32; 2] {
        self.center.map(f32::from_bits)
    }

    /// Get the quad half-size in normalized device coordinates.
    pub fn extent(&self) -> [f32; 2] {
        unpack_half2(self.extent)
    }

    /// Get the conic, the inverse of the 2D covariance in pixels.
    pub fn conic(&self) -> [f32; 3] {
        let [x, y] = unpack_half2(self.conic_xy);
        let [z, _] = unpack_half2(self.conic_z_opacity);
        [x, y, z]
    }

    /// Get the opacity.
    pub fn opacity(&self) -> f32 {
        unpack_half2(self.conic_z_opacity)[1]
    }

    /// Get the RGBA color.
    pub fn color(&self) -> [f32; 4] {
        let [r, g] = unpack_half2(self.color_rg);
        let [b, a] = unpack_half2(self.color_ba);
        [r, g, b, a]
    }
}
