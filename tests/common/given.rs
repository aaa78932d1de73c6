use glam::*;
use wgpu_3dgs_splat::{CameraBuffer, CameraPod, Gaussian, PointCloud};

use crate::common::TestContext;

pub const RENDER_TARGET_SIZE: UVec2 = UVec2::new(64, 64);

pub const RENDER_TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// A camera at the origin looking down `-Z` with a 90 degree vertical field of view, so the
/// view matrix is the identity and the view depth of a point is `-z`.
pub fn camera(z: std::ops::Range<f32>) -> CameraPod {
    CameraPod::perspective(
        Vec3::ZERO,
        Vec3::NEG_Z,
        std::f32::consts::FRAC_PI_2,
        z,
        RENDER_TARGET_SIZE,
    )
}

pub fn camera_buffer(ctx: &TestContext, pod: &CameraPod) -> CameraBuffer {
    let buffer = CameraBuffer::new(&ctx.device);
    buffer.update_with_pod(&ctx.queue, pod);
    buffer
}

pub fn gaussian(pos: Vec3, color: Vec3, opacity: f32, scale: f32) -> Gaussian {
    Gaussian::with_color(pos, Quat::IDENTITY, Vec3::splat(scale), color, opacity)
}

/// A small white Gaussian on the view axis at `depth`.
pub fn gaussian_at_depth(depth: f32) -> Gaussian {
    gaussian(Vec3::new(0.0, 0.0, -depth), Vec3::ONE, 0.8, 0.05)
}

/// Gaussians spread over the view, with many sharing a depth.
pub fn gaussian_grid(count: u32) -> Vec<Gaussian> {
    (0..count)
        .map(|i| {
            let x = ((i * 7) % 21) as f32 * 0.05 - 0.5;
            let y = ((i * 13) % 21) as f32 * 0.05 - 0.5;
            let depth = 2.0 + (i % 37) as f32 * 0.1;
            gaussian(
                Vec3::new(x, y, -depth),
                Vec3::new(0.2, 0.4, 0.6),
                0.5,
                0.02,
            )
        })
        .collect()
}

pub fn point_cloud(ctx: &TestContext, gaussians: &[Gaussian]) -> PointCloud {
    point_cloud_with_sh_degree(ctx, gaussians, 0)
}

pub fn point_cloud_with_sh_degree(
    ctx: &TestContext,
    gaussians: &[Gaussian],
    sh_degree: u32,
) -> PointCloud {
    PointCloud::new(&ctx.device, gaussians, sh_degree).expect("point cloud")
}

pub fn render_target_texture(ctx: &TestContext) -> wgpu::Texture {
    render_target_texture_with_size(ctx, RENDER_TARGET_SIZE)
}

pub fn render_target_texture_with_size(ctx: &TestContext, size: UVec2) -> wgpu::Texture {
    ctx.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Render Target Texture"),
        size: wgpu::Extent3d {
            width: size.x,
            height: size.y,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: RENDER_TARGET_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    })
}
