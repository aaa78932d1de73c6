use wgpu::util::DeviceExt;

use crate::{BufferWrapper, FixedSizeBufferWrapper, FixedSizeBufferWrapperError};

/// The render settings uniform buffer.
#[derive(Debug, Clone)]
pub struct RenderSettingsBuffer(wgpu::Buffer);

impl RenderSettingsBuffer {
    /// Create a new render settings buffer.
    pub fn new(device: &wgpu::Device, settings: &RenderSettingsPod) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Render Settings Buffer"),
            contents: bytemuck::bytes_of(settings),
            usage: Self::DEFAULT_USAGES,
        });

        Self(buffer)
    }

    /// Update the size multiplier.
    ///
    /// Only the bytes of [`RenderSettingsPod::size_multiplier`] are written.
    pub fn update_size_multiplier(&self, queue: &wgpu::Queue, size_multiplier: f32) {
        queue.write_buffer(
            &self.0,
            std::mem::offset_of!(RenderSettingsPod, size_multiplier) as wgpu::BufferAddress,
            bytemuck::bytes_of(&size_multiplier),
        );
    }
}

impl BufferWrapper for RenderSettingsBuffer {
    const DEFAULT_USAGES: wgpu::BufferUsages = wgpu::BufferUsages::from_bits_retain(
        wgpu::BufferUsages::UNIFORM.bits()
            | wgpu::BufferUsages::COPY_DST.bits()
            | wgpu::BufferUsages::COPY_SRC.bits(),
    );

    fn buffer(&self) -> &wgpu::Buffer {
        &self.0
    }
}

impl From<RenderSettingsBuffer> for wgpu::Buffer {
    fn from(wrapper: RenderSettingsBuffer) -> Self {
        wrapper.0
    }
}

impl TryFrom<wgpu::Buffer> for RenderSettingsBuffer {
    type Error = FixedSizeBufferWrapperError;

    fn try_from(buffer: wgpu::Buffer) -> Result<Self, Self::Error> {
        Self::verify_buffer_size(&buffer).map(|()| Self(buffer))
    }
}

impl FixedSizeBufferWrapper for RenderSettingsBuffer {
    type Pod = RenderSettingsPod;
}

/// The POD representation of render settings.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RenderSettingsPod {
    /// The multiplier applied to every Gaussian scale.
    pub size_multiplier: f32,
    /// The spherical harmonics degree, `0..=3`.
    pub sh_degree: u32,
    /// The total number of Gaussians.
    pub point_count: u32,
    pub _padding: u32,
}

impl RenderSettingsPod {
    /// Create new render settings.
    pub fn new(size_multiplier: f32, sh_degree: u32, point_count: u32) -> Self {
        Self {
            size_multiplier,
            sh_degree,
            point_count,
            _padding: 0,
        }
    }
}
