//! Input level metering for the dashboard animation.
//!
//! RMS over the last 50 ms is converted to dBFS and mapped onto 0-100% over a
//! 40 dB window ending at the configured reference level.

/// Lowest value shown while audio is flowing, so the meter never looks dead.
const FLOOR_PERCENT: u8 = 4;

/// Width of the displayed dynamic range.
const WINDOW_DB: f32 = 40.0;

/// Converts the tail of `samples` into a 0-100 level.
///
/// Returns 0 when there is nothing to measure.
pub fn level_percent(samples: &[i16], sample_rate: u32, reference_level_db: i8) -> u8 {
    if samples.is_empty() || sample_rate == 0 {
        return 0;
    }

    let window = ((sample_rate / 20) as usize).clamp(1, samples.len());
    let recent = &samples[samples.len() - window..];

    let sum_of_squares: i64 = recent.iter().map(|&x| i64::from(x).pow(2)).sum();
    let mean_square = sum_of_squares / recent.len() as i64;
    let rms = (mean_square as f32).sqrt();

    let db_fs = if rms > 0.0 {
        20.0 * (rms / f32::from(i16::MAX)).log10()
    } else {
        -160.0
    };

    let min_db = f32::from(reference_level_db) - WINDOW_DB;
    ((db_fs - min_db) / WINDOW_DB * 100.0).clamp(f32::from(FLOOR_PERCENT), 100.0) as u8
}

/// Scrolling history of levels sized to the terminal width.
#[derive(Debug, Default)]
pub struct LevelHistory {
    values: Vec<u64>,
}

impl LevelHistory {
    /// Appends a level, dropping the oldest once `width` is exceeded.
    pub fn push(&mut self, level: u8, width: usize) {
        self.values.push(u64::from(level));
        if self.values.len() > width {
            let excess = self.values.len() - width;
            self.values.drain(..excess);
        }
    }

    /// Matches the history length to a new width, padding on the left.
    pub fn resize(&mut self, width: usize) {
        if self.values.len() > width {
            let excess = self.values.len() - width;
            self.values.drain(..excess);
        } else if self.values.len() < width {
            let missing = width - self.values.len();
            self.values.splice(0..0, std::iter::repeat(0).take(missing));
        }
    }

    pub fn clear(&mut self) {
        self.values.iter_mut().for_each(|v| *v = 0);
    }

    pub fn values(&self) -> &[u64] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_zero() {
        assert_eq!(level_percent(&[], 16000, -20), 0);
        assert_eq!(level_percent(&[100], 0, -20), 0);
    }

    #[test]
    fn test_silence_sits_at_floor() {
        assert_eq!(level_percent(&[0; 1600], 16000, -20), FLOOR_PERCENT);
    }

    #[test]
    fn test_loud_signal_saturates() {
        assert_eq!(level_percent(&[i16::MAX; 1600], 16000, -20), 100);
    }

    #[test]
    fn test_reference_level_maps_to_full_scale() {
        // -20 dBFS is a tenth of full scale.
        let amplitude = (f32::from(i16::MAX) / 10.0) as i16;
        let level = level_percent(&[amplitude; 800], 16000, -20);
        assert!(level >= 99, "got {level}");
    }

    #[test]
    fn test_history_scrolls_and_resizes() {
        let mut history = LevelHistory::default();
        history.resize(3);
        history.push(10, 3);
        history.push(20, 3);
        assert_eq!(history.values(), &[0, 10, 20]);

        history.resize(5);
        assert_eq!(history.values(), &[0, 0, 0, 10, 20]);
        history.resize(2);
        assert_eq!(history.values(), &[10, 20]);

        history.clear();
        assert_eq!(history.values(), &[0, 0]);
    }
}
