//! The canonical telemetry record
//!
//! Every field travels as a plain `f32`. Negative values are sentinels for
//! "not available" on the fields that can be missing on the host (GPU load,
//! CPU and GPU temperature). Percentages are not range checked here; the
//! renderer clamps them when it turns them into pixels.

/// One snapshot of remote host telemetry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    /// CPU load in percent
    pub cpu: f32,
    /// CPU temperature in °C, negative when unavailable
    pub temp_c: f32,
    /// RAM usage in percent
    pub ram: f32,
    /// GPU load in percent, negative when the host has no GPU
    pub gpu: f32,
    /// GPU temperature in °C, negative when unavailable
    pub gpu_temp_c: f32,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            cpu: 0.0,
            temp_c: -1.0,
            ram: 0.0,
            gpu: -1.0,
            gpu_temp_c: -1.0,
        }
    }
}

impl Metrics {
    pub const fn new(cpu: f32, temp_c: f32, ram: f32, gpu: f32, gpu_temp_c: f32) -> Self {
        Self {
            cpu,
            temp_c,
            ram,
            gpu,
            gpu_temp_c,
        }
    }

    /// GPU load, or `None` when the sentinel is set.
    pub fn gpu(&self) -> Option<f32> {
        available(self.gpu)
    }

    /// CPU temperature, or `None` when the sentinel is set.
    pub fn temp_c(&self) -> Option<f32> {
        available(self.temp_c)
    }

    /// GPU temperature, or `None` when the sentinel is set.
    ///
    /// Zero is a valid reading; only negative values mean "unavailable".
    pub fn gpu_temp_c(&self) -> Option<f32> {
        available(self.gpu_temp_c)
    }
}

fn available(value: f32) -> Option<f32> {
    if value < 0.0 { None } else { Some(value) }
}

/// Clamp a percentage into `0.0..=100.0`. NaN becomes zero.
pub fn clamp_percent(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// Round a non-negative value to the nearest integer, halves up.
pub fn round_non_negative(value: f32) -> i32 {
    (value.max(0.0) + 0.5) as i32
}

/// Quantize a temperature to tenths of a degree, `-1` for unavailable.
pub fn temperature_tenths(value: Option<f32>) -> i32 {
    match value {
        Some(v) => (v * 10.0) as i32,
        None => -1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_are_strictly_negative() {
        let m = Metrics::new(10.0, -1.0, 20.0, -1.0, 0.0);
        assert_eq!(m.temp_c(), None);
        assert_eq!(m.gpu(), None);
        assert_eq!(m.gpu_temp_c(), Some(0.0));
    }

    #[test]
    fn default_has_nothing_available() {
        let m = Metrics::default();
        assert_eq!(m.gpu(), None);
        assert_eq!(m.temp_c(), None);
        assert_eq!(m.gpu_temp_c(), None);
    }

    #[test]
    fn clamp_percent_limits_range() {
        assert_eq!(clamp_percent(-5.0), 0.0);
        assert_eq!(clamp_percent(42.5), 42.5);
        assert_eq!(clamp_percent(150.0), 100.0);
        assert_eq!(clamp_percent(f32::NAN), 0.0);
    }

    #[test]
    fn rounding_and_quantizing() {
        assert_eq!(round_non_negative(41.4), 41);
        assert_eq!(round_non_negative(41.5), 42);
        assert_eq!(round_non_negative(-3.0), 0);
        assert_eq!(temperature_tenths(Some(54.37)), 543);
        assert_eq!(temperature_tenths(None), -1);
    }
}
