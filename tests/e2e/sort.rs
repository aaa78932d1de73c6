use glam::*;
use wgpu_3dgs_splat::{Gaussian, GaussianRenderer, RadixSorter};

use crate::common::{FrameState, TestContext, given, render};

fn render_state(ctx: &TestContext, gaussians: &[Gaussian]) -> FrameState {
    let camera = given::camera_buffer(ctx, &given::camera(0.1..100.0));
    let renderer = GaussianRenderer::new(
        &ctx.device,
        &given::point_cloud(ctx, gaussians),
        given::RENDER_TARGET_FORMAT,
        &camera,
    )
    .expect("renderer");

    render(ctx, &renderer, &given::render_target_texture(ctx));
    FrameState::download(ctx, &renderer)
}

/// The view is the identity, so the view depth of each Gaussian is exactly `-z`.
fn expected_order(gaussians: &[Gaussian]) -> Vec<u32> {
    let mut order = (0..gaussians.len() as u32).collect::<Vec<_>>();
    order.sort_by_key(|&i| (u32::MAX - (-gaussians[i as usize].pos.z).to_bits(), i));
    order
}

fn assert_sorted(state: &FrameState) {
    for (pair, keys) in state
        .sorted_indices
        .windows(2)
        .zip(state.sorted_keys.windows(2))
    {
        assert!(
            (keys[0], pair[0]) < (keys[1], pair[1]),
            "({}, {}) should come before ({}, {})",
            keys[0],
            pair[0],
            keys[1],
            pair[1],
        );
    }
}

#[test]
fn test_gaussian_renderer_render_when_depths_tie_should_order_by_index() {
    let ctx = TestContext::new();
    let mut gaussians = (0..5)
        .map(|i| {
            given::gaussian(
                Vec3::new(i as f32 * 0.2 - 0.4, 0.0, -3.0),
                Vec3::ONE,
                0.8,
                0.05,
            )
        })
        .collect::<Vec<_>>();
    gaussians.push(given::gaussian_at_depth(4.0));

    let state = render_state(&ctx, &gaussians);

    assert_eq!(state.visible, 6);
    assert_eq!(state.sorted_indices, vec![5, 0, 1, 2, 3, 4]);
    assert_eq!(state.sorted_keys[1..].iter().min(), state.sorted_keys[1..].iter().max());
}

#[test]
fn test_gaussian_renderer_render_should_sort_multiple_blocks() {
    let ctx = TestContext::new();
    let gaussians = given::gaussian_grid(1000);

    let state = render_state(&ctx, &gaussians);

    assert_eq!(state.visible, 1000);
    assert_eq!(state.sort_dispatch, vec![4, 1, 1]);
    assert_sorted(&state);
    assert_eq!(state.sorted_indices, expected_order(&gaussians));
    assert_eq!(
        state.sorted_keys,
        state
            .sorted_indices
            .iter()
            .map(|&i| u32::MAX - (-gaussians[i as usize].pos.z).to_bits())
            .collect::<Vec<_>>()
    );
}

#[test]
fn test_gaussian_renderer_render_should_sort_with_padded_index_passes() {
    let ctx = TestContext::new();
    let point_count = 70_000;
    let gaussians = (0..point_count)
        .map(|i| {
            given::gaussian(
                Vec3::new(0.0, 0.0, -(1.0 + (i % 997) as f32 * 0.01)),
                Vec3::ONE,
                0.5,
                0.01,
            )
        })
        .collect::<Vec<_>>();

    let state = render_state(&ctx, &gaussians);

    assert_eq!(RadixSorter::passes(point_count).len(), 8);
    assert_eq!(state.visible, point_count);
    assert_eq!(
        state.sort_dispatch[0],
        point_count.div_ceil(RadixSorter::BLOCK_SIZE)
    );
    assert_sorted(&state);
    assert_eq!(state.sorted_indices, expected_order(&gaussians));
}
