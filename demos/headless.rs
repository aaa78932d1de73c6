use clap::Parser;
use glam::*;

use wgpu_3dgs_splat::{self as gs, DownloadableBufferWrapper};

/// The command line arguments.
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "\
    Renders a synthetic Gaussian cloud offscreen while orbiting the camera.\n\
    \n\
    The number of visible splats is read back and logged after every frame.\
    "
)]
struct Args {
    /// Number of Gaussians.
    #[arg(short, long, default_value_t = 100_000)]
    points: u32,

    /// Number of frames to render.
    #[arg(short, long, default_value_t = 8)]
    frames: u32,

    /// Render target width.
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Render target height.
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Spherical harmonics degree, at most 3.
    #[arg(long, default_value_t = 0)]
    sh_degree: u32,

    /// Gaussian scale multiplier.
    #[arg(long, default_value_t = 1.0)]
    size_multiplier: f32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    pollster::block_on(run(args))
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

    log::debug!("Requesting adapter");
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            ..Default::default()
        })
        .await?;

    log::info!("Using adapter {}", adapter.get_info().name);

    log::debug!("Requesting device");
    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("Device"),
            required_limits: adapter.limits(),
            ..Default::default()
        })
        .await?;

    let size = UVec2::new(args.width, args.height);
    let format = wgpu::TextureFormat::Rgba8Unorm;

    log::debug!("Creating render target");
    let render_target = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Render Target"),
        size: wgpu::Extent3d {
            width: size.x,
            height: size.y,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let render_target_view = render_target.create_view(&wgpu::TextureViewDescriptor::default());

    log::info!("Generating {} Gaussians", args.points);
    let gaussians = synthetic_cloud(args.points, args.sh_degree);
    let point_cloud = gs::PointCloud::new(&device, &gaussians, args.sh_degree)?;

    let camera = gs::CameraBuffer::new(&device);
    let mut renderer = gs::GaussianRenderer::new(&device, &point_cloud, format, &camera)?;
    renderer.set_size_multiplier(&queue, args.size_multiplier);

    for frame in 0..args.frames {
        let angle = frame as f32 / args.frames.max(1) as f32 * std::f32::consts::TAU;
        let pos = Vec3::new(angle.sin(), 0.3, angle.cos()) * 4.0;

        camera.update_with_pod(
            &queue,
            &gs::CameraPod::perspective(
                pos,
                -pos,
                std::f32::consts::FRAC_PI_3,
                0.1..100.0,
                size,
            ),
        );

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Frame Command Encoder"),
        });
        renderer.render(&mut encoder, &render_target_view);
        queue.submit(Some(encoder.finish()));

        let visible = renderer
            .buffers()
            .visible_counter
            .download::<u32>(&device, &queue)
            .await?[0];

        log::info!(
            "Frame {frame}: {visible} of {} splats visible",
            renderer.point_count()
        );
    }

    Ok(())
}

/// A shell of Gaussians on a Fibonacci sphere, colored by direction.
fn synthetic_cloud(count: u32, sh_degree: u32) -> Vec<gs::Gaussian> {
    let golden_angle = std::f32::consts::PI * (3.0 - 5.0f32.sqrt());

    (0..count)
        .map(|i| {
            let t = (i as f32 + 0.5) / count as f32;
            let y = 1.0 - 2.0 * t;
            let r = (1.0 - y * y).sqrt();
            let theta = golden_angle * i as f32;
            let dir = Vec3::new(r * theta.cos(), y, r * theta.sin());

            let radius = 1.0 + 0.1 * (theta * 3.0).sin();
            let mut gaussian = gs::Gaussian::with_color(
                dir * radius,
                Quat::from_rotation_arc(Vec3::Z, dir),
                Vec3::new(0.02, 0.02, 0.005),
                dir * 0.5 + Vec3::splat(0.5),
                0.8,
            );

            if sh_degree > 0 {
                // View dependent tint along the first band
                gaussian.sh[1] = Vec3::new(0.2, 0.0, -0.2);
            }

            gaussian
        })
        .collect()
}
