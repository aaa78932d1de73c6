use thiserror::Error;

/// The error type for buffer downloads.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    BufferDownloadOneShotReceive(#[from] oneshot::RecvError),
    #[error("{0}")]
    BufferDownloadAsync(#[from] wgpu::BufferAsyncError),
    #[error("{0}")]
    DevicePoll(#[from] wgpu::PollError),
}

/// The error type for [`FixedSizeBufferWrapper`](crate::FixedSizeBufferWrapper) conversion.
#[derive(Debug, Error)]
pub enum FixedSizeBufferWrapperError {
    #[error("buffer size mismatched, expected {expected_size}, got {buffer_size}")]
    BufferSizeMismatched {
        buffer_size: wgpu::BufferAddress,
        expected_size: wgpu::BufferAddress,
    },
}

/// The error type for [`PointCloud`](crate::PointCloud) creation.
#[derive(Debug, Error)]
pub enum PointCloudError {
    #[error("SH degree {degree} is out of range, expected at most {max}")]
    ShDegreeOutOfRange { degree: u32, max: u32 },
    #[error("Gaussians buffer too small for {point_count} points, got {buffer_size} bytes")]
    GaussiansBufferTooSmall {
        point_count: u32,
        buffer_size: wgpu::BufferAddress,
    },
    #[error("SH buffer too small for {point_count} points, got {buffer_size} bytes")]
    ShBufferTooSmall {
        point_count: u32,
        buffer_size: wgpu::BufferAddress,
    },
}

/// The error type for [`GaussianRenderer`](crate::GaussianRenderer) creation.
#[derive(Debug, Error)]
pub enum GaussianRendererCreateError {
    #[error(
        "{label} size {buffer_size} exceeds the device storage buffer binding limit {device_limit}"
    )]
    StorageBufferExceedsDeviceLimit {
        label: &'static str,
        buffer_size: wgpu::BufferAddress,
        device_limit: u32,
    },
    #[error(
        "{point_count} points need {workgroups} workgroups, but the device allows {device_limit}"
    )]
    TooManyPoints {
        point_count: u32,
        workgroups: u32,
        device_limit: u32,
    },
}
