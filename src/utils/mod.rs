//! Utilities module for logging, errors, and small formatting helpers

pub mod error;
pub mod logging;

// Re-export main types for convenience
pub use error::{AgriAidError, Result};
pub use logging::{init_logging, LogConfig, LogLevel};

/// Format a probability in [0, 1] as a percentage string
pub fn format_percent(probability: f32) -> String {
    format!("{:.2}%", probability * 100.0)
}

/// Format a duration in milliseconds in a human-readable way
pub fn format_millis(ms: f64) -> String {
    if ms < 1.0 {
        format!("{:.0}µs", ms * 1000.0)
    } else if ms < 1000.0 {
        format!("{:.1}ms", ms)
    } else {
        format!("{:.2}s", ms / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.5), "50.00%");
        assert_eq!(format_percent(1.0), "100.00%");
    }

    #[test]
    fn test_format_millis() {
        assert_eq!(format_millis(0.25), "250µs");
        assert_eq!(format_millis(12.34), "12.3ms");
        assert_eq!(format_millis(2500.0), "2.50s");
    }
}
