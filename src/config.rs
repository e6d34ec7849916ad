//! Scan options, with environment overrides for deployment tuning.

use std::sync::OnceLock;
use std::time::Duration;

use crate::plan::{AttemptPlan, DimWindow};
use crate::quality::QualityThresholds;

/// Default cap on the longest image side before scanning begins.
pub const DEFAULT_MAX_DIMENSION: u32 = 2000;

// Attempts whose projected dimensions leave this window never reach the
// decoder, whatever plan the caller supplies.
const GLOBAL_DIM_WINDOW: DimWindow = DimWindow { min: 20, max: 8000 };

static MAX_DIMENSION: OnceLock<u32> = OnceLock::new();
static BUDGET_MS: OnceLock<Option<u64>> = OnceLock::new();

/// Everything a [`Scanner`](crate::pipeline::Scanner) needs to know.
///
/// The defaults run the standard plan with camera-photo sharpening, no
/// time budget and region hints enabled, honoring the `SNAPCODE_MAX_DIM`
/// and `SNAPCODE_BUDGET_MS` environment variables when set.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Ordered attempt plan.
    pub plan: AttemptPlan,
    /// Apply mild sharpen and contrast lift to freshly loaded photos.
    pub camera_nudge: bool,
    /// Longest image side allowed before downscaling kicks in.
    pub max_dimension: u32,
    /// Wall-clock budget for the attempt loop; `None` means unlimited.
    pub budget: Option<Duration>,
    /// Run the stripe and contour passes when every attempt fails.
    pub region_hints: bool,
    /// Record a per-attempt trace on the returned detection.
    pub diagnostics: bool,
    /// Thresholds for the quality analyzer.
    pub quality: QualityThresholds,
    /// Hard dimension gate applied to every attempt.
    pub dim_window: DimWindow,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            plan: AttemptPlan::standard(),
            camera_nudge: true,
            max_dimension: env_max_dimension(),
            budget: env_budget(),
            region_hints: true,
            diagnostics: false,
            quality: QualityThresholds::default(),
            dim_window: GLOBAL_DIM_WINDOW,
        }
    }
}

impl ScanOptions {
    /// Options with every default.
    pub fn new() -> Self {
        ScanOptions::default()
    }

    /// Replace the attempt plan.
    pub fn with_plan(mut self, plan: AttemptPlan) -> Self {
        self.plan = plan;
        self
    }

    /// Enable or disable the camera-photo sharpening pass.
    pub fn with_camera_nudge(mut self, enabled: bool) -> Self {
        self.camera_nudge = enabled;
        self
    }

    /// Cap the longest image side.
    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension;
        self
    }

    /// Bound the attempt loop by wall-clock time.
    pub fn with_budget(mut self, budget: Option<Duration>) -> Self {
        self.budget = budget;
        self
    }

    /// Enable or disable the secondary localization passes.
    pub fn with_region_hints(mut self, enabled: bool) -> Self {
        self.region_hints = enabled;
        self
    }

    /// Enable or disable the per-attempt trace.
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    /// Replace the quality thresholds.
    pub fn with_quality_thresholds(mut self, thresholds: QualityThresholds) -> Self {
        self.quality = thresholds;
        self
    }
}

fn env_max_dimension() -> u32 {
    *MAX_DIMENSION.get_or_init(|| parse_env_u32("SNAPCODE_MAX_DIM", DEFAULT_MAX_DIMENSION))
}

// Zero disables the budget, matching "no budget" semantics for the
// common case of an empty or unset variable.
fn env_budget() -> Option<Duration> {
    BUDGET_MS
        .get_or_init(|| {
            std::env::var("SNAPCODE_BUDGET_MS")
                .ok()
                .and_then(|value| value.parse::<u64>().ok())
                .filter(|ms| *ms > 0)
        })
        .map(Duration::from_millis)
}

fn parse_env_u32(name: &str, default: u32) -> u32 {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
