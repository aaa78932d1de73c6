use glam::*;
use wgpu_3dgs_splat::{
    BufferWrapper, CameraBuffer, CameraPod, DownloadableBufferWrapper, FixedSizeBufferWrapperError,
};

use crate::common::TestContext;

#[test]
fn test_camera_buffer_new_should_return_correct_buffer() {
    let ctx = TestContext::new();
    let buffer = CameraBuffer::new(&ctx.device);

    assert_eq!(
        buffer.buffer().size(),
        std::mem::size_of::<CameraPod>() as wgpu::BufferAddress
    );
}

#[test]
fn test_camera_buffer_update_with_pod_should_update_buffer_correctly() {
    let ctx = TestContext::new();
    let buffer = CameraBuffer::try_from(ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Test Camera Buffer"),
        size: std::mem::size_of::<CameraPod>() as wgpu::BufferAddress,
        usage: CameraBuffer::DEFAULT_USAGES | wgpu::BufferUsages::COPY_SRC,
        mapped_at_creation: false,
    }))
    .expect("try_from");

    let pod = CameraPod::perspective(
        Vec3::new(1.0, 2.0, 3.0),
        Vec3::NEG_Z,
        std::f32::consts::FRAC_PI_4,
        0.1..100.0,
        UVec2::new(1920, 1080),
    );

    buffer.update_with_pod(&ctx.queue, &pod);

    let downloaded = pollster::block_on(buffer.download::<CameraPod>(&ctx.device, &ctx.queue))
        .expect("download")[0];

    assert_eq!(downloaded, pod);
    assert_eq!(downloaded.size, Vec2::new(1920.0, 1080.0));
}

#[test]
fn test_camera_buffer_try_from_when_size_mismatched_should_return_error() {
    let ctx = TestContext::new();
    let wgpu_buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Test Camera Buffer"),
        size: 64,
        usage: CameraBuffer::DEFAULT_USAGES,
        mapped_at_creation: false,
    });

    let result = CameraBuffer::try_from(wgpu_buffer);

    assert!(matches!(
        result,
        Err(FixedSizeBufferWrapperError::BufferSizeMismatched {
            buffer_size: 64,
            expected_size: 144,
        })
    ));
}
