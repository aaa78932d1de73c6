use glam::*;

use crate::{BufferWrapper, FixedSizeBufferWrapper, FixedSizeBufferWrapperError};

/// The camera buffer.
///
/// The camera uniform is computed by the caller, the renderer only binds this buffer and
/// never writes to it.
#[derive(Debug, Clone)]
pub struct CameraBuffer(wgpu::Buffer);

impl CameraBuffer {
    /// Create a new camera buffer.
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Buffer"),
            size: std::mem::size_of::<CameraPod>() as u64,
            usage: Self::DEFAULT_USAGES,
            mapped_at_creation: false,
        });

        Self(buffer)
    }

    /// Update the camera buffer with [`CameraPod`].
    pub fn update_with_pod(&self, queue: &wgpu::Queue, pod: &CameraPod) {
        queue.write_buffer(&self.0, 0, bytemuck::bytes_of(pod));
    }
}

impl BufferWrapper for CameraBuffer {
    fn buffer(&self) -> &wgpu::Buffer {
        &self.0
    }
}

impl From<CameraBuffer> for wgpu::Buffer {
    fn from(wrapper: CameraBuffer) -> Self {
        wrapper.0
    }
}

impl TryFrom<wgpu::Buffer> for CameraBuffer {
    type Error = FixedSizeBufferWrapperError;

    fn try_from(buffer: wgpu::Buffer) -> Result<Self, Self::Error> {
        Self::verify_buffer_size(&buffer).map(|()| Self(buffer))
    }
}

impl FixedSizeBufferWrapper for CameraBuffer {
    type Pod = CameraPod;
}

/// The POD representation of camera.
///
/// `view` is a right-handed view matrix, `proj` maps view space to wgpu clip space with
/// depth in `[0, 1]`, and `size` is the render target size in pixels.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraPod {
    pub view: Mat4,
    pub proj: Mat4,
    pub size: Vec2,
    pub _padding: [u32; 2],
}

impl CameraPod {
    /// Create a new camera.
    pub fn new(view: Mat4, proj: Mat4, size: UVec2) -> Self {
        Self {
            view,
            proj,
            size: size.as_vec2(),
            _padding: [0; 2],
        }
    }

    /// Create a perspective camera at `pos` looking along `dir`.
    pub fn perspective(
        pos: Vec3,
        dir: Vec3,
        vertical_fov: f32,
        z: std::ops::Range<f32>,
        size: UVec2,
    ) -> Self {
        Self::new(
            Mat4::look_to_rh(pos, dir, Vec3::Y),
            Mat4::perspective_rh(vertical_fov, size.x as f32 / size.y as f32, z.start, z.end),
            size,
        )
    }
}
