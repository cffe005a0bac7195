use candle_core::Device;

/// Metal GPU 0 when built with the `metal` feature and one is present, else CPU.
pub fn select_device() -> Device {
    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(device) => {
                tracing::info!(device = "metal", "embedding device selected");
                return device;
            }
            Err(e) => tracing::warn!(error = %e, "metal unavailable, using cpu"),
        }
    }
    tracing::info!(device = "cpu", "embedding device selected");
    Device::Cpu
}
