//! Projection of a gate snapshot into one renderable frame.

use serde::{Deserialize, Serialize};

use scrollwrap_types::{BrandingConfig, GatePhase, GateSnapshot};

/// Live-region status copy. One message per distinct user situation, with
/// stable wording so assistive announcements do not churn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HelperText {
    /// Completion not yet satisfied.
    KeepReading,
    /// Terms fully seen, acknowledgment still missing.
    CheckTheBox,
    /// Both conditions met; the action is live.
    Ready,
    /// Commit in flight.
    Processing,
    /// Gate released; the surface is about to disappear.
    Released,
}

impl std::fmt::Display for HelperText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HelperText::KeepReading => {
                write!(f, "Please scroll through the full terms to continue.")
            }
            HelperText::CheckTheBox => {
                write!(f, "Please confirm you have read and accept the terms.")
            }
            HelperText::Ready => write!(f, "You can continue to your document."),
            HelperText::Processing => write!(f, "Recording your acceptance..."),
            HelperText::Released => write!(f, "Your document is ready."),
        }
    }
}

/// Progress through the terms body, derived from the detector's continuous
/// scroll ratio rather than its boolean output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressIndicator {
    /// Viewed ratio, 0.0-1.0.
    pub ratio: f64,

    /// Rounded display percentage.
    pub percent: u8,
}

impl ProgressIndicator {
    fn from_ratio(ratio: f64) -> Self {
        let ratio = ratio.clamp(0.0, 1.0);
        Self {
            ratio,
            percent: (ratio * 100.0).round() as u8,
        }
    }
}

/// What to do with the protected content region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverlayTreatment {
    /// Content stays blurred behind the gating surface.
    Blurred,
    /// Content is visible; the blur is lifted.
    Revealed,
}

/// The primary action control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionControl {
    /// The pure enablement guard, evaluated on the projected snapshot.
    pub enabled: bool,

    /// Brand color of the control.
    pub color: String,
}

/// One renderable frame of the gating surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellFrame {
    pub helper: HelperText,
    pub progress: ProgressIndicator,
    pub overlay: OverlayTreatment,
    pub action: ActionControl,

    /// Accent color for the progress indicator and helper emphasis.
    pub accent_color: String,
}

impl ShellFrame {
    /// Project a snapshot into a frame. Stateless: equal inputs always yield
    /// equal frames.
    pub fn project(snapshot: &GateSnapshot, branding: &BrandingConfig) -> Self {
        let helper = match snapshot.phase {
            GatePhase::Committing => HelperText::Processing,
            GatePhase::Released => HelperText::Released,
            _ if !snapshot.completion_satisfied => HelperText::KeepReading,
            _ if !snapshot.acknowledgment_given => HelperText::CheckTheBox,
            _ => HelperText::Ready,
        };

        // The blur lifts when the commit begins, never before: Ready still
        // shows blurred content behind an enabled action.
        let overlay = if snapshot.phase.commit_started() {
            OverlayTreatment::Revealed
        } else {
            OverlayTreatment::Blurred
        };

        Self {
            helper,
            progress: ProgressIndicator::from_ratio(snapshot.progress),
            overlay,
            action: ActionControl {
                enabled: snapshot.action_enabled(),
                color: branding.primary_color.clone(),
            },
            accent_color: branding.accent_color.clone(),
        }
    }
}
