mod buffer;
mod error;
mod point_cloud;
mod preprocessor;
mod radix_sorter;
mod renderer;

pub use buffer::*;
pub use error::*;
pub use point_cloud::*;
pub use preprocessor::*;
pub use radix_sorter::*;
pub use renderer::*;

/// The 3D Gaussian splatting renderer.
///
/// Owns every stage and device array of one [`PointCloud`] and records a whole frame into a
/// caller provided encoder. Nothing is submitted and the host never waits on the device.
#[derive(Debug)]
pub struct GaussianRenderer {
    point_count: u32,
    sh_degree: u32,
    size_multiplier: f32,

    camera: CameraBuffer,
    settings: RenderSettingsBuffer,
    buffers: SplatBufferSet,

    preprocessor: Preprocessor,
    radix_sorter: RadixSorter,
    renderer: Renderer,
}

impl GaussianRenderer {
    /// The initial Gaussian scale multiplier.
    pub const DEFAULT_SIZE_MULTIPLIER: f32 = 1.0;

    /// Create a new renderer.
    ///
    /// `camera` is shared with the caller, who updates it before recording each frame.
    pub fn new(
        device: &wgpu::Device,
        point_cloud: &PointCloud,
        texture_format: wgpu::TextureFormat,
        camera: &CameraBuffer,
    ) -> Result<Self, GaussianRendererCreateError> {
        let point_count = point_cloud.point_count();
        let sh_degree = point_cloud.sh_degree();
        let size_multiplier = Self::DEFAULT_SIZE_MULTIPLIER;

        log::debug!("Creating render settings buffer");
        let settings = RenderSettingsBuffer::new(
            device,
            &RenderSettingsPod::new(size_multiplier, sh_degree, point_count),
        );

        let buffers = SplatBufferSet::new(device, point_count);

        log::debug!("Creating preprocessor");
        let preprocessor = Preprocessor::new(device, camera, &settings, point_cloud, &buffers)?;

        log::debug!("Creating radix sorter");
        let radix_sorter = RadixSorter::new(
            device,
            point_count,
            &buffers.visible_counter,
            &buffers.sort,
            &buffers.radix_sort_histograms,
        );

        log::debug!("Creating renderer");
        let renderer = Renderer::new(device, texture_format, camera, &buffers);

        log::info!("Gaussian renderer created with {point_count} points");

        Ok(Self {
            point_count,
            sh_degree,
            size_multiplier,

            camera: camera.clone(),
            settings,
            buffers,

            preprocessor,
            radix_sorter,
            renderer,
        })
    }

    /// Record a frame rendering into `view`.
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        log::trace!("Recording buffer reset");
        self.buffers.reset(encoder);

        if self.point_count > 0 {
            log::trace!("Recording preprocess");
            self.preprocessor.preprocess(encoder, self.point_count);

            log::trace!("Recording radix sort");
            self.radix_sorter.sort(encoder, &self.buffers.radix_sort_indirect_args);
        }

        log::trace!("Recording visible count propagation");
        self.buffers.propagate_visible_count(encoder);

        log::trace!("Recording render");
        self.renderer.render(encoder, view, &self.buffers.indirect_args);
    }

    /// Set the Gaussian scale multiplier, applied from the next submitted frame.
    pub fn set_size_multiplier(&mut self, queue: &wgpu::Queue, size_multiplier: f32) {
        self.settings.update_size_multiplier(queue, size_multiplier);
        self.size_multiplier = size_multiplier;
    }

    /// Get the number of points.
    pub fn point_count(&self) -> u32 {
        self.point_count
    }

    /// Get the spherical harmonics degree.
    pub fn sh_degree(&self) -> u32 {
        self.sh_degree
    }

    /// Get the Gaussian scale multiplier.
    pub fn size_multiplier(&self) -> f32 {
        self.size_multiplier
    }

    /// Get the camera buffer.
    pub fn camera(&self) -> &CameraBuffer {
        &self.camera
    }

    /// Get the render settings buffer.
    pub fn settings(&self) -> &RenderSettingsBuffer {
        &self.settings
    }

    /// Get the device arrays.
    pub fn buffers(&self) -> &SplatBufferSet {
        &self.buffers
    }
}
