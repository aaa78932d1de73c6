use crate::{Error, FixedSizeBufferWrapperError};

/// A trait for types wrapping a [`wgpu::Buffer`].
pub trait BufferWrapper {
    /// The usages a buffer of this type is created with.
    const DEFAULT_USAGES: wgpu::BufferUsages = wgpu::BufferUsages::from_bits_retain(
        wgpu::BufferUsages::UNIFORM.bits() | wgpu::BufferUsages::COPY_DST.bits(),
    );

    /// Get the buffer.
    fn buffer(&self) -> &wgpu::Buffer;
}

impl BufferWrapper for wgpu::Buffer {
    fn buffer(&self) -> &wgpu::Buffer {
        self
    }
}

/// A [`BufferWrapper`] whose buffer always holds exactly one [`FixedSizeBufferWrapper::Pod`].
pub trait FixedSizeBufferWrapper: BufferWrapper {
    /// The POD type stored in the buffer.
    type Pod: bytemuck::Pod;

    /// The expected buffer size.
    fn pod_size() -> wgpu::BufferAddress {
        std::mem::size_of::<Self::Pod>() as wgpu::BufferAddress
    }

    /// Verify that `buffer` has the size of [`FixedSizeBufferWrapper::Pod`].
    fn verify_buffer_size(buffer: &wgpu::Buffer) -> Result<(), FixedSizeBufferWrapperError> {
        let expected_size = Self::pod_size();
        match buffer.size() == expected_size {
            true => Ok(()),
            false => Err(FixedSizeBufferWrapperError::BufferSizeMismatched {
                buffer_size: buffer.size(),
                expected_size,
            }),
        }
    }
}

/// A [`BufferWrapper`] that can be read back to the host.
///
/// This is an inspection utility and never part of the frame path, the renderer itself
/// does not read any buffer back. The wrapped buffer must have [`wgpu::BufferUsages::COPY_SRC`].
#[allow(async_fn_in_trait)]
pub trait DownloadableBufferWrapper: BufferWrapper {
    /// Download the buffer contents as a [`Vec`] of `T`.
    ///
    /// This submits a copy to `queue` and blocks on [`wgpu::Device::poll`] until it is mapped.
    async fn download<T: bytemuck::Pod>(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<Vec<T>, Error> {
        let size = self.buffer().size();

        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Download Staging Buffer"),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Download Command Encoder"),
        });
        encoder.copy_buffer_to_buffer(self.buffer(), 0, &staging, 0, size);
        queue.submit(Some(encoder.finish()));

        let (tx, rx) = oneshot::channel();
        let slice = staging.slice(..);
        slice.map_async(wgpu::MapMode::Read, move |result| {
            if let Err(e) = tx.send(result) {
                log::error!("Error occurred while sending buffer download data: {e:?}");
            }
        });
        device.poll(wgpu::PollType::Wait)?;
        rx.await??;

        let data = {
            let view = slice.get_mapped_range();
            bytemuck::allocation::pod_collect_to_vec::<u8, T>(&view)
        };
        staging.unmap();

        Ok(data)
    }
}

impl<T: BufferWrapper> DownloadableBufferWrapper for T {}
