use wgpu_3dgs_splat::{
    BufferWrapper, DownloadableBufferWrapper, RenderSettingsBuffer, RenderSettingsPod,
};

use crate::common::TestContext;

#[test]
fn test_render_settings_buffer_new_should_hold_settings() {
    let ctx = TestContext::new();
    let pod = RenderSettingsPod::new(1.5, 2, 1234);
    let buffer = RenderSettingsBuffer::new(&ctx.device, &pod);

    let downloaded =
        pollster::block_on(buffer.download::<RenderSettingsPod>(&ctx.device, &ctx.queue))
            .expect("download")[0];

    assert_eq!(
        buffer.buffer().size(),
        std::mem::size_of::<RenderSettingsPod>() as wgpu::BufferAddress
    );
    assert_eq!(downloaded, pod);
}

#[test]
fn test_render_settings_buffer_update_size_multiplier_should_only_write_size_multiplier() {
    let ctx = TestContext::new();
    let buffer = RenderSettingsBuffer::new(&ctx.device, &RenderSettingsPod::new(1.0, 3, 42));

    buffer.update_size_multiplier(&ctx.queue, 0.25);

    let downloaded =
        pollster::block_on(buffer.download::<RenderSettingsPod>(&ctx.device, &ctx.queue))
            .expect("download")[0];

    assert_eq!(downloaded, RenderSettingsPod::new(0.25, 3, 42));
}

#[test]
fn test_render_settings_buffer_try_from_when_size_mismatched_should_return_error() {
    let ctx = TestContext::new();
    let wgpu_buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Test Render Settings Buffer"),
        size: 32,
        usage: RenderSettingsBuffer::DEFAULT_USAGES,
        mapped_at_creation: false,
    });

    assert!(RenderSettingsBuffer::try_from(wgpu_buffer).is_err());
}
