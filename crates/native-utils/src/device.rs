use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamError};

use crate::audio::{convert_i16_to_f32, convert_u16_to_f32, to_mono};

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("no default input device")]
    NoDefaultInput,
    #[error("input device '{0}' not found")]
    NotFound(String),
    #[error("unsupported sample format {0:?}")]
    UnsupportedFormat(SampleFormat),
    #[error("audio host error: {0}")]
    Host(String),
}

fn host_error(e: impl std::fmt::Display) -> DeviceError {
    DeviceError::Host(e.to_string())
}

fn get_host() -> cpal::Host {
    cpal::default_host()
}

/// Finds the named input device, or the host's default input when no name is
/// given.
pub fn get_or_default_input(device_name: Option<&str>) -> Result<Device, DeviceError> {
    let host = get_host();
    tracing::debug!("Host: {:?}", host.id());

    let Some(target) = device_name else {
        return host.default_input_device().ok_or(DeviceError::NoDefaultInput);
    };
    host.input_devices()
        .map_err(host_error)?
        .find(|device| device.name().is_ok_and(|name| name == target))
        .ok_or_else(|| DeviceError::NotFound(target.to_string()))
}

/// One line per input device: name, channel count and default rate.
pub fn get_available_inputs() -> Result<String, DeviceError> {
    let host = get_host();
    let default_device = host.default_input_device().and_then(|d| d.name().ok());

    let mut device_names = Vec::new();
    for device in host.input_devices().map_err(host_error)? {
        let name = device.name().unwrap_or_else(|_| "<unnamed>".to_string());
        let mut line = match device.default_input_config() {
            Ok(cfg) => format!(" * {}({}ch, {}hz)", name, cfg.channels(), cfg.sample_rate().0),
            Err(_) => format!(" * {}(no default config)", name),
        };
        if default_device.as_deref() == Some(name.as_str()) {
            line.push_str(" [default]");
        }
        device_names.push(line);
    }
    Ok(device_names.join("\n"))
}

/// Whether a stream error means the device is gone for good.
///
/// Backend errors such as buffer overruns are transient and only logged.
pub fn is_device_lost(err: &StreamError) -> bool {
    matches!(err, StreamError::DeviceNotAvailable)
}

/// Starts capturing from `device` with its default configuration.
///
/// `on_samples` receives mono f32 chunks and the capture sample rate, on the
/// audio thread. `on_lost` is called with a reason when the device disappears
/// after the stream started. The capture runs for as long as the returned
/// stream lives.
pub fn start_capture<F, L>(
    device: &Device,
    mut on_samples: F,
    mut on_lost: L,
) -> Result<Stream, DeviceError>
where
    F: FnMut(Vec<f32>, u32) + Send + 'static,
    L: FnMut(String) + Send + 'static,
{
    let supported = device.default_input_config().map_err(host_error)?;
    let format = supported.sample_format();
    let config = supported.config();
    let channels = config.channels as usize;
    let sample_rate = config.sample_rate.0;
    tracing::info!("Input stream config: {:?} ({:?})", &config, format);

    let on_error = move |err: StreamError| {
        tracing::error!("An error occurred on input stream: {}", err);
        if is_device_lost(&err) {
            on_lost(err.to_string());
        }
    };
    let stream = match format {
        SampleFormat::F32 => device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                on_samples(to_mono(data, channels), sample_rate)
            },
            on_error,
            None,
        ),
        SampleFormat::I16 => device.build_input_stream(
            &config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                on_samples(to_mono(&convert_i16_to_f32(data), channels), sample_rate)
            },
            on_error,
            None,
        ),
        SampleFormat::U16 => device.build_input_stream(
            &config,
            move |data: &[u16], _: &cpal::InputCallbackInfo| {
                on_samples(to_mono(&convert_u16_to_f32(data), channels), sample_rate)
            },
            on_error,
            None,
        ),
        other => return Err(DeviceError::UnsupportedFormat(other)),
    }
    .map_err(host_error)?;

    stream.play().map_err(host_error)?;
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cpal::BackendSpecificError;

    #[test]
    fn test_only_a_missing_device_counts_as_lost() {
        assert!(is_device_lost(&StreamError::DeviceNotAvailable));
        assert!(!is_device_lost(&StreamError::BackendSpecific {
            err: BackendSpecificError {
                description: "buffer overrun".to_string(),
            },
        }));
    }
}
