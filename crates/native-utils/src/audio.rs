/// Down-mixes interleaved samples to mono by averaging each frame.
///
/// A trailing partial frame is dropped.
pub fn to_mono(data: &[f32], channels: usize) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => data.to_vec(),
        n => data
            .chunks_exact(n)
            .map(|frame| frame.iter().sum::<f32>() / n as f32)
            .collect(),
    }
}

/// Converts signed 16-bit samples to f32 in [-1.0, 1.0).
pub fn convert_i16_to_f32(pcm16: &[i16]) -> Vec<f32> {
    pcm16.iter().map(|&sample| sample as f32 / 32768.0).collect()
}

/// Converts unsigned 16-bit samples (midpoint 32768) to f32.
pub fn convert_u16_to_f32(pcm16: &[u16]) -> Vec<f32> {
    pcm16
        .iter()
        .map(|&sample| (sample as f32 - 32768.0) / 32768.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_mono_averages_frames() {
        let stereo = [0.5, 0.25, -0.5, -0.25, 1.0];
        assert_eq!(to_mono(&stereo, 2), vec![0.375, -0.375]);
        assert_eq!(to_mono(&stereo, 1), stereo.to_vec());
        assert!(to_mono(&stereo, 0).is_empty());
    }

    #[test]
    fn test_integer_conversions() {
        assert_eq!(convert_i16_to_f32(&[0, -32768, 16384]), vec![0.0, -1.0, 0.5]);
        assert_eq!(convert_u16_to_f32(&[32768, 0]), vec![0.0, -1.0]);
    }
}
