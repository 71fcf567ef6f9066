//! Device selection for inference.

use candle_core::Device;
use tracing::info;

/// Returns the device classification runs on.
///
/// Prefers Metal or CUDA when the matching feature is compiled in and a GPU
/// is present, otherwise the CPU.
#[must_use]
pub fn get_device() -> Device {
    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(device) => {
                info!("Classifying on Metal");
                return device;
            }
            Err(e) => tracing::debug!("Metal unavailable: {e}"),
        }
    }

    #[cfg(feature = "cuda")]
    {
        match Device::new_cuda(0) {
            Ok(device) => {
                info!("Classifying on CUDA");
                return device;
            }
            Err(e) => tracing::debug!("CUDA unavailable: {e}"),
        }
    }

    info!("Classifying on CPU");
    Device::Cpu
}
