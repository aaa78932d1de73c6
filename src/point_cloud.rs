use glam::*;
use wgpu::util::DeviceExt;

use crate::{BufferWrapper, PointCloudError, pack_half2};

/// The maximum supported spherical harmonics degree.
pub const MAX_SH_DEGREE: u32 = 3;

/// The number of spherical harmonics coefficients of [`MAX_SH_DEGREE`].
pub const SH_COEFFICIENT_COUNT: usize = 16;

/// The zeroth order spherical harmonics basis constant.
pub const SH_C0: f32 = 0.282_094_8;

/// A 3D Gaussian on the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gaussian {
    /// The world position.
    pub pos: Vec3,
    /// The rotation.
    pub rot: Quat,
    /// The linear scale.
    pub scale: Vec3,
    /// The opacity in `[0, 1]`.
    pub opacity: f32,
    /// The spherical harmonics coefficients, RGB per coefficient.
    pub sh: [Vec3; SH_COEFFICIENT_COUNT],
}

impl Gaussian {
    /// Create a Gaussian with view independent color.
    pub fn with_color(pos: Vec3, rot: Quat, scale: Vec3, color: Vec3, opacity: f32) -> Self {
        let mut sh = [Vec3::ZERO; SH_COEFFICIENT_COUNT];
        sh[0] = (color - Vec3::splat(0.5)) / SH_C0;

        Self {
            pos,
            rot,
            scale,
            opacity,
            sh,
        }
    }
}

/// The POD representation of Gaussian.
///
/// Must match `Gaussian` in `shader/preprocess.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GaussianPod {
    pub pos: [f32; 3],
    pub opacity: f32,
    /// The rotation `(w, x, y, z)`, two packed `f16` pairs.
    pub rot: [u32; 2],
    /// The scale `(x, y, z, 0)`, two packed `f16` pairs.
    pub scale: [u32; 2],
}

impl GaussianPod {
    /// Convert from Gaussian to Gaussian POD.
    pub fn from_gaussian(gaussian: &Gaussian) -> Self {
        let rot = gaussian.rot.normalize();

        Self {
            pos: gaussian.pos.to_array(),
            opacity: gaussian.opacity,
            rot: [pack_half2(rot.w, rot.x), pack_half2(rot.y, rot.z)],
            scale: [
                pack_half2(gaussian.scale.x, gaussian.scale.y),
                pack_half2(gaussian.scale.z, 0.0),
            ],
        }
    }
}

impl From<&Gaussian> for GaussianPod {
    fn from(gaussian: &Gaussian) -> Self {
        Self::from_gaussian(gaussian)
    }
}

/// The POD representation of the spherical harmonics coefficients of a Gaussian.
///
/// 48 `f16`, coefficient `k` channel `c` at half index `3k + c`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShPod {
    pub coefficients: [u32; 24],
}

impl ShPod {
    /// Convert from Gaussian to spherical harmonics POD.
    pub fn from_gaussian(gaussian: &Gaussian) -> Self {
        let halves = gaussian
            .sh
            .iter()
            .flat_map(|c| c.to_array())
            .collect::<Vec<_>>();

        Self {
            coefficients: std::array::from_fn(|i| pack_half2(halves[2 * i], halves[2 * i + 1])),
        }
    }
}

impl From<&Gaussian> for ShPod {
    fn from(gaussian: &Gaussian) -> Self {
        Self::from_gaussian(gaussian)
    }
}

/// The Gaussians storage buffer, an array of [`GaussianPod`].
#[derive(Debug, Clone)]
pub struct GaussiansBuffer(wgpu::Buffer);

impl GaussiansBuffer {
    /// Create a new Gaussians buffer.
    pub fn new(device: &wgpu::Device, gaussians: &[Gaussian]) -> Self {
        Self::new_with_pods(
            device,
            &gaussians
                .iter()
                .map(GaussianPod::from_gaussian)
                .collect::<Vec<_>>(),
        )
    }

    /// Create a new Gaussians buffer with [`GaussianPod`].
    pub fn new_with_pods(device: &wgpu::Device, pods: &[GaussianPod]) -> Self {
        let buffer = match pods.is_empty() {
            true => device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Gaussians Buffer"),
                size: std::mem::size_of::<GaussianPod>() as wgpu::BufferAddress,
                usage: Self::DEFAULT_USAGES,
                mapped_at_creation: false,
            }),
            false => device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Gaussians Buffer"),
                contents: bytemuck::cast_slice(pods),
                usage: Self::DEFAULT_USAGES,
            }),
        };

        Self(buffer)
    }

    /// Get the number of Gaussians the buffer can hold.
    pub fn len(&self) -> usize {
        self.0.size() as usize / std::mem::size_of::<GaussianPod>()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BufferWrapper for GaussiansBuffer {
    const DEFAULT_USAGES: wgpu::BufferUsages = wgpu::BufferUsages::from_bits_retain(
        wgpu::BufferUsages::STORAGE.bits()
            | wgpu::BufferUsages::COPY_DST.bits()
            | wgpu::BufferUsages::COPY_SRC.bits(),
    );

    fn buffer(&self) -> &wgpu::Buffer {
        &self.0
    }
}

impl From<GaussiansBuffer> for wgpu::Buffer {
    fn from(wrapper: GaussiansBuffer) -> Self {
        wrapper.0
    }
}

impl From<wgpu::Buffer> for GaussiansBuffer {
    fn from(buffer: wgpu::Buffer) -> Self {
        Self(buffer)
    }
}

/// The spherical harmonics storage buffer, an array of [`ShPod`].
#[derive(Debug, Clone)]
pub struct ShBuffer(wgpu::Buffer);

impl ShBuffer {
    /// Create a new spherical harmonics buffer.
    pub fn new(device: &wgpu::Device, gaussians: &[Gaussian]) -> Self {
        Self::new_with_pods(
            device,
            &gaussians
                .iter()
                .map(ShPod::from_gaussian)
                .collect::<Vec<_>>(),
        )
    }

    /// Create a new spherical harmonics buffer with [`ShPod`].
    pub fn new_with_pods(device: &wgpu::Device, pods: &[ShPod]) -> Self {
        let buffer = match pods.is_empty() {
            true => device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("SH Buffer"),
                size: std::mem::size_of::<ShPod>() as wgpu::BufferAddress,
                usage: Self::DEFAULT_USAGES,
                mapped_at_creation: false,
            }),
            false => device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("SH Buffer"),
                contents: bytemuck::cast_slice(pods),
                usage: Self::DEFAULT_USAGES,
            }),
        };

        Self(buffer)
    }

    /// Get the number of Gaussians the buffer can hold.
    pub fn len(&self) -> usize {
        self.0.size() as usize / std::mem::size_of::<ShPod>()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BufferWrapper for ShBuffer {
    const DEFAULT_USAGES: wgpu::BufferUsages = wgpu::BufferUsages::from_bits_retain(
        wgpu::BufferUsages::STORAGE.bits()
            | wgpu::BufferUsages::COPY_DST.bits()
            | wgpu::BufferUsages::COPY_SRC.bits(),
    );

    fn buffer(&self) -> &wgpu::Buffer {
        &self.0
    }
}

impl From<ShBuffer> for wgpu::Buffer {
    fn from(wrapper: ShBuffer) -> Self {
        wrapper.0
    }
}

impl From<wgpu::Buffer> for ShBuffer {
    fn from(buffer: wgpu::Buffer) -> Self {
        Self(buffer)
    }
}

/// A point cloud of Gaussians resident on the device.
///
/// This is what the renderer consumes from a point cloud loader.
#[derive(Debug, Clone)]
pub struct PointCloud {
    gaussians: GaussiansBuffer,
    sh: ShBuffer,
    point_count: u32,
    sh_degree: u32,
}

impl PointCloud {
    /// Create a new point cloud by uploading `gaussians`.
    pub fn new(
        device: &wgpu::Device,
        gaussians: &[Gaussian],
        sh_degree: u32,
    ) -> Result<Self, PointCloudError> {
        log::debug!("Creating gaussians buffer");
        let gaussians_buffer = GaussiansBuffer::new(device, gaussians);

        log::debug!("Creating SH buffer");
        let sh_buffer = ShBuffer::new(device, gaussians);

        Self::from_buffers(
            gaussians_buffer,
            sh_buffer,
            gaussians.len() as u32,
            sh_degree,
        )
    }

    /// Create a new point cloud from buffers of an external loader.
    pub fn from_buffers(
        gaussians: GaussiansBuffer,
        sh: ShBuffer,
        point_count: u32,
        sh_degree: u32,
    ) -> Result<Self, PointCloudError> {
        if sh_degree > MAX_SH_DEGREE {
            return Err(PointCloudError::ShDegreeOutOfRange {
                degree: sh_degree,
                max: MAX_SH_DEGREE,
            });
        }

        if gaussians.len() < point_count as usize {
            return Err(PointCloudError::GaussiansBufferTooSmall {
                point_count,
                buffer_size: gaussians.buffer().size(),
            });
        }

        if sh.len() < point_count as usize {
            return Err(PointCloudError::ShBufferTooSmall {
                point_count,
                buffer_size: sh.buffer().size(),
            });
        }

        Ok(Self {
            gaussians,
            sh,
            point_count,
            sh_degree,
        })
    }

    /// Get the Gaussians buffer.
    pub fn gaussians(&self) -> &GaussiansBuffer {
        &self.gaussians
    }

    /// Get the spherical harmonics buffer.
    pub fn sh(&self) -> &ShBuffer {
        &self.sh
    }

    /// Get the number of points.
    pub fn point_count(&self) -> u32 {
        self.point_count
    }

    /// Get the spherical harmonics degree.
    pub fn sh_degree(&self) -> u32 {
        self.sh_degree
    }
}
