use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// What the Escape key resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EscapeScope {
    /// Clear every display mode and announce it.
    #[default]
    AllModes,
    /// Clear only the red giant easter egg, silently.
    RedGiantOnly,
}

/// Closed interval used for the randomized star attributes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    fn check(&self, field: &'static str) -> Result<(), ConfigError> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min < 0.0 || self.min > self.max {
            return Err(ConfigError::Invalid {
                field,
                reason: format!("expected 0 <= min <= max, got {}..{}", self.min, self.max),
            });
        }
        Ok(())
    }
}

/// Every tunable policy constant of the page scripts.
///
/// Missing JSON fields fall back to the defaults the site ships with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub star_count: usize,
    pub star_size_px: Interval,
    pub star_opacity: Interval,
    pub star_duration_secs: Interval,

    /// Pixels of parallax offset per pixel scrolled.
    pub parallax_rate: f64,

    pub reveal_threshold: f64,
    pub reveal_root_margin: String,
    /// Extra transition delay per target, in scan order.
    pub reveal_stagger_secs: f64,
    pub reveal_offset_px: f64,
    pub reveal_duration_secs: f64,

    pub lazy_root_margin: String,
    pub nav_root_margin: String,

    pub toast_dwell_ms: u64,
    pub toast_exit_ms: u64,
    pub submit_latency_ms: u64,
    pub message_dwell_ms: u64,
    pub copy_feedback_ms: u64,

    /// Add the floating scroll-to-top button.
    pub scroll_to_top: bool,
    pub scroll_top_threshold_px: f64,
    pub escape_scope: EscapeScope,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            star_count: 150,
            star_size_px: Interval::new(0.5, 3.0),
            star_opacity: Interval::new(0.3, 1.0),
            star_duration_secs: Interval::new(2.0, 6.0),
            parallax_rate: 0.3,
            reveal_threshold: 0.1,
            reveal_root_margin: "0px 0px -50px 0px".to_string(),
            reveal_stagger_secs: 0.1,
            reveal_offset_px: 30.0,
            reveal_duration_secs: 0.6,
            lazy_root_margin: "50px 0px".to_string(),
            nav_root_margin: "-50% 0px -50% 0px".to_string(),
            toast_dwell_ms: 3000,
            toast_exit_ms: 300,
            submit_latency_ms: 1500,
            message_dwell_ms: 5000,
            copy_feedback_ms: 2000,
            scroll_to_top: true,
            scroll_top_threshold_px: 300.0,
            escape_scope: EscapeScope::AllModes,
        }
    }
}

impl SiteConfig {
    /// Parse and validate a JSON config. Absent fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: SiteConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.star_size_px.check("star_size_px")?;
        self.star_opacity.check("star_opacity")?;
        self.star_duration_secs.check("star_duration_secs")?;
        if self.star_opacity.max > 1.0 {
            return Err(ConfigError::Invalid {
                field: "star_opacity",
                reason: format!("max opacity {} exceeds 1", self.star_opacity.max),
            });
        }
        if !self.parallax_rate.is_finite() {
            return Err(ConfigError::Invalid {
                field: "parallax_rate",
                reason: "must be finite".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.reveal_threshold) {
            return Err(ConfigError::Invalid {
                field: "reveal_threshold",
                reason: format!("{} is outside 0..=1", self.reveal_threshold),
            });
        }
        for (field, secs) in [
            ("reveal_stagger_secs", self.reveal_stagger_secs),
            ("reveal_duration_secs", self.reveal_duration_secs),
        ] {
            if !secs.is_finite() || secs < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{secs} is not a non-negative duration"),
                });
            }
        }
        Ok(())
    }

    pub fn toast_dwell(&self) -> Duration {
        Duration::from_millis(self.toast_dwell_ms)
    }

    pub fn toast_exit(&self) -> Duration {
        Duration::from_millis(self.toast_exit_ms)
    }

    pub fn submit_latency(&self) -> Duration {
        Duration::from_millis(self.submit_latency_ms)
    }

    pub fn message_dwell(&self) -> Duration {
        Duration::from_millis(self.message_dwell_ms)
    }

    pub fn copy_feedback(&self) -> Duration {
        Duration::from_millis(self.copy_feedback_ms)
    }
}
