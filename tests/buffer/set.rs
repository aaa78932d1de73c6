use wgpu_3dgs_splat::{
    BufferWrapper, DownloadableBufferWrapper, RadixSorter, SplatBufferSet, SplatPod,
};

use crate::common::TestContext;

#[test]
fn test_splat_buffer_set_new_should_size_buffers_by_point_count() {
    let ctx = TestContext::new();
    let point_count = 300;
    let set = SplatBufferSet::new(&ctx.device, point_count);

    let u32_size = std::mem::size_of::<u32>() as wgpu::BufferAddress;
    let n = point_count as wgpu::BufferAddress;

    assert_eq!(
        set.splats.buffer().size(),
        n * std::mem::size_of::<SplatPod>() as wgpu::BufferAddress
    );
    assert_eq!(set.splats.capacity(), point_count);
    assert_eq!(set.splat_slots.buffer().size(), n * u32_size);
    for side in set.sort.0.iter() {
        assert_eq!(side.keys.buffer().size(), n * u32_size);
        assert_eq!(side.indices.buffer().size(), n * u32_size);
    }
    assert_eq!(
        set.radix_sort_histograms.buffer().size(),
        (RadixSorter::RADIX * 2) as wgpu::BufferAddress * u32_size
    );
}

#[test]
fn test_splat_buffer_set_new_when_empty_should_allocate_one_element() {
    let ctx = TestContext::new();
    let set = SplatBufferSet::new(&ctx.device, 0);

    let u32_size = std::mem::size_of::<u32>() as wgpu::BufferAddress;

    assert_eq!(set.splats.capacity(), 1);
    assert_eq!(set.splat_slots.buffer().size(), u32_size);
    assert_eq!(set.sort.front().keys.buffer().size(), u32_size);
    assert_eq!(set.sort.back().indices.buffer().size(), u32_size);
    assert_eq!(
        set.radix_sort_histograms.buffer().size(),
        RadixSorter::RADIX as wgpu::BufferAddress * u32_size
    );
}

#[test]
fn test_splat_buffer_set_reset_should_zero_counter_and_sort_dispatch() {
    let ctx = TestContext::new();
    let set = SplatBufferSet::new(&ctx.device, 16);

    ctx.queue.write_buffer(
        set.visible_counter.buffer(),
        0,
        bytemuck::bytes_of(&100u32),
    );
    ctx.queue.write_buffer(
        set.radix_sort_indirect_args.buffer(),
        0,
        bytemuck::bytes_of(&[5u32, 1, 1]),
    );

    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Command Encoder"),
        });
    set.reset(&mut encoder);
    ctx.queue.submit(Some(encoder.finish()));

    let counter =
        pollster::block_on(set.visible_counter.download::<u32>(&ctx.device, &ctx.queue))
            .expect("download");
    let dispatch = pollster::block_on(
        set.radix_sort_indirect_args.download::<u32>(&ctx.device, &ctx.queue),
    )
    .expect("download");

    assert_eq!(counter, vec![0]);
    assert_eq!(dispatch, vec![0, 1, 1]);
}

#[test]
fn test_splat_buffer_set_propagate_visible_count_should_only_write_instance_count() {
    let ctx = TestContext::new();
    let set = SplatBufferSet::new(&ctx.device, 16);

    ctx.queue.write_buffer(set.visible_counter.buffer(), 0, bytemuck::bytes_of(&42u32));

    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Command Encoder"),
        });
    set.propagate_visible_count(&mut encoder);
    ctx.queue.submit(Some(encoder.finish()));

    let draw_args =
        pollster::block_on(set.indirect_args.download::<u32>(&ctx.device, &ctx.queue))
            .expect("download");

    assert_eq!(draw_args, vec![6, 42, 0, 0]);
}
