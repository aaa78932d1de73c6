use glam::*;
use wgpu_3dgs_splat::{DownloadableBufferWrapper, GaussianRenderer};

use crate::common::{TestContext, given};

/// Record one frame with a fresh encoder, submit it and wait for the device.
pub fn render(ctx: &TestContext, renderer: &GaussianRenderer, render_target: &wgpu::Texture) {
    let view = render_target.create_view(&wgpu::TextureViewDescriptor::default());

    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Command Encoder"),
        });

    renderer.render(&mut encoder, &view);

    ctx.queue.submit(Some(encoder.finish()));
    ctx.device.poll(wgpu::PollType::Wait).expect("device poll");
}

/// Download the render target as rows of RGBA8 pixels.
pub fn download_render_target(ctx: &TestContext, render_target: &wgpu::Texture) -> Vec<U8Vec4> {
    let size = given::RENDER_TARGET_SIZE;
    let bytes_per_row = size.x * std::mem::size_of::<U8Vec4>() as u32;
    assert_eq!(bytes_per_row % wgpu::COPY_BYTES_PER_ROW_ALIGNMENT, 0);

    let buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Render Target Download Buffer"),
        size: (bytes_per_row * size.y) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::COPY_SRC,
        mapped_at_creation: false,
    });

    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Target Download Command Encoder"),
        });

    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture: render_target,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(size.y),
            },
        },
        render_target.size(),
    );

    ctx.queue.submit(Some(encoder.finish()));

    pollster::block_on(buffer.download::<[u8; 4]>(&ctx.device, &ctx.queue))
        .expect("download")
        .into_iter()
        .map(U8Vec4::from_array)
        .collect()
}

/// Get the pixel at `pos` of downloaded render target pixels.
pub fn pixel_at(pixels: &[U8Vec4], pos: UVec2) -> U8Vec4 {
    pixels[(pos.y * given::RENDER_TARGET_SIZE.x + pos.x) as usize]
}
