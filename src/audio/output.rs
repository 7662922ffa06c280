// Output hygiene - Final stage between the tone mix and the device buffer

use cpal::{FromSample, Sample};

/// Zero out values small enough to hit denormal slow paths
#[inline]
pub fn flush_denormals_to_zero(x: f32) -> f32 {
    if x.abs() < 1e-15 { 0.0 } else { x }
}

/// tanh saturation, keeps overlapping tones inside [-1, 1]
#[inline]
pub fn soft_clip(x: f32) -> f32 {
    x.tanh()
}

/// Write one mono sample to every channel of an interleaved frame
#[inline]
pub fn write_mono_frame<T>(sample: f32, frame: &mut [T])
where
    T: Sample + FromSample<f32>,
{
    for channel_sample in frame.iter_mut() {
        *channel_sample = Sample::from_sample::<f32>(sample);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flush_denormals() {
        assert_eq!(flush_denormals_to_zero(1e-20), 0.0);
        assert_eq!(flush_denormals_to_zero(0.25), 0.25);
    }

    #[test]
    fn test_soft_clip_bounds() {
        assert!(soft_clip(10.0) <= 1.0);
        assert!(soft_clip(-10.0) >= -1.0);
        assert!((soft_clip(0.01) - 0.01).abs() < 1e-5);
    }

    #[test]
    fn test_write_mono_frame() {
        let mut stereo = [0.0f32; 2];
        write_mono_frame(0.5, &mut stereo);
        assert_eq!(stereo, [0.5, 0.5]);

        let mut ints = [7i16; 2];
        write_mono_frame(0.0, &mut ints);
        assert_eq!(ints, [0, 0]);
    }
}
