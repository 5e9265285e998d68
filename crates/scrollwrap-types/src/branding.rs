//! Cosmetic branding inputs consumed by the presentation shell.

use serde::{Deserialize, Serialize};

/// Brand colors for the gating surface. Cosmetic only; the engine never
/// reads these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandingConfig {
    /// Color of the primary action control, CSS-style string.
    pub primary_color: String,

    /// Accent color for the progress indicator and helper emphasis.
    pub accent_color: String,
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            primary_color: "#1a56db".to_string(),
            accent_color: "#0e9f6e".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_present_when_host_supplies_nothing() {
        let branding = BrandingConfig::default();
        assert!(!branding.primary_color.is_empty());
        assert!(!branding.accent_color.is_empty());
    }
}
