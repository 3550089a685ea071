//! Feature extraction - sensor window to fixed-length feature vector
//!
//! Converts a window of flex-sensor samples into the 25-value statistical
//! summary the classifier was trained on: per channel, in fixed order,
//! `{mean, std, min, max, range}`. Pure arithmetic, no state.

/// Flex sensors per glove sample
pub const CHANNEL_COUNT: usize = 5;

/// Statistics computed per channel
pub const STATS_PER_CHANNEL: usize = 5;

/// Total feature vector length
pub const FEATURE_COUNT: usize = CHANNEL_COUNT * STATS_PER_CHANNEL;

/// Extract the feature vector from a window of n >= 1 samples.
///
/// Layout is channel-major: features[ch * 5 ..] = [mean, std, min, max,
/// range] for channel `ch`. Standard deviation is the population std
/// (ddof = 0), so a window of length 1 yields std = 0 and range = 0.
pub fn extract_features(window: &[[f32; CHANNEL_COUNT]]) -> [f32; FEATURE_COUNT] {
    let mut features = [0.0f32; FEATURE_COUNT];
    let n = window.len() as f64;

    for ch in 0..CHANNEL_COUNT {
        let mut sum = 0.0f64;
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;

        for sample in window {
            let value = sample[ch];
            sum += value as f64;
            min = min.min(value);
            max = max.max(value);
        }

        let mean = sum / n;
        let mut variance = 0.0f64;
        for sample in window {
            let delta = sample[ch] as f64 - mean;
            variance += delta * delta;
        }
        let std = (variance / n).sqrt();

        let base = ch * STATS_PER_CHANNEL;
        features[base] = mean as f32;
        features[base + 1] = std as f32;
        features[base + 2] = min;
        features[base + 3] = max;
        features[base + 4] = max - min;
    }

    features
}
