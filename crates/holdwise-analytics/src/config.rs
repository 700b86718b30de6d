//! Engine configuration.
//!
//! Every field has a default, so an empty TOML document is a valid config:
//!
//! ```toml
//! parallel_threshold = 64
//! top_positions = 25
//!
//! [significance]
//! min_share_delta = 500
//! min_weight_change_pct = 1.5
//!
//! [consensus]
//! min_weight = 0.05
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AnalyticsError, AnalyticsResult};

// =============================================================================
// SIGNIFICANCE
// =============================================================================

/// Thresholds deciding whether a position delta is significant.
///
/// A delta is significant if it exceeds either enabled threshold. A threshold
/// set to `None` is disabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignificanceThresholds {
    /// Minimum absolute share change.
    pub min_share_delta: Option<Decimal>,

    /// Minimum absolute weight change, in percentage points of the portfolio.
    pub min_weight_change_pct: Option<f64>,
}

impl Default for SignificanceThresholds {
    fn default() -> Self {
        Self {
            min_share_delta: Some(dec!(100)),
            min_weight_change_pct: Some(2.0),
        }
    }
}

impl SignificanceThresholds {
    /// Thresholds with both tests disabled. Nothing is significant.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            min_share_delta: None,
            min_weight_change_pct: None,
        }
    }

    /// Sets the share threshold.
    #[must_use]
    pub fn with_min_share_delta(mut self, threshold: Option<Decimal>) -> Self {
        self.min_share_delta = threshold;
        self
    }

    /// Sets the weight threshold.
    #[must_use]
    pub fn with_min_weight_change_pct(mut self, threshold: Option<f64>) -> Self {
        self.min_weight_change_pct = threshold;
        self
    }

    /// Returns true if the change passes either threshold.
    #[must_use]
    pub fn is_significant(&self, share_delta: Decimal, weight_change_pct: Option<f64>) -> bool {
        let by_shares = self
            .min_share_delta
            .is_some_and(|min| share_delta.abs() > min);
        let by_weight = match (self.min_weight_change_pct, weight_change_pct) {
            (Some(min), Some(change)) => change.abs() > min,
            _ => false,
        };
        by_shares || by_weight
    }
}

// =============================================================================
// CONCENTRATION
// =============================================================================

/// Herfindahl index cut-offs for concentration bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcentrationBands {
    /// Index above which a portfolio is concentrated.
    pub concentrated_above: f64,

    /// Index above which a portfolio is balanced (otherwise diversified).
    pub balanced_above: f64,
}

impl Default for ConcentrationBands {
    fn default() -> Self {
        Self {
            concentrated_above: 0.20,
            balanced_above: 0.10,
        }
    }
}

// =============================================================================
// CONSENSUS
// =============================================================================

/// Weight and investor-count thresholds for consensus/contrarian lists.
///
/// Weights are fractions of the portfolio (0.03 = 3%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusThresholds {
    /// Minimum weight for an investor to count towards consensus.
    pub min_weight: f64,

    /// Minimum contributing investors for consensus.
    pub min_investors: usize,

    /// Minimum single-investor weight for a contrarian position.
    pub contrarian_min_weight: f64,

    /// Maximum total holders (at any weight) for a contrarian position.
    pub contrarian_max_investors: usize,
}

impl Default for ConsensusThresholds {
    fn default() -> Self {
        Self {
            min_weight: 0.03,
            min_investors: 2,
            contrarian_min_weight: 0.04,
            contrarian_max_investors: 2,
        }
    }
}

// =============================================================================
// INSIGHTS
// =============================================================================

/// Thresholds for the supplemental insight analytics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightThresholds {
    /// Minimum previous value for an exit to be tracked.
    pub min_exit_value: Decimal,

    /// Minimum value for a new position to count as a discovery.
    pub min_discovery_value: Decimal,

    /// Minimum investors making the same discovery.
    pub min_discovery_investors: usize,

    /// Share growth factor for a momentum shift (1.2 = +20%).
    pub momentum_factor: f64,

    /// Minimum investors sharing a momentum shift.
    pub min_momentum_investors: usize,

    /// Minimum absolute value change counted in buy/sell balance.
    pub min_flow_value: Decimal,

    /// Fraction of active investors that must have filed for a period to be
    /// considered the latest covered period.
    pub period_coverage: f64,
}

impl Default for InsightThresholds {
    fn default() -> Self {
        Self {
            min_exit_value: dec!(1_000_000),
            min_discovery_value: dec!(5_000_000),
            min_discovery_investors: 2,
            momentum_factor: 1.2,
            min_momentum_investors: 2,
            min_flow_value: dec!(1_000_000),
            period_coverage: 0.3,
        }
    }
}

// =============================================================================
// ENGINE CONFIG
// =============================================================================

/// Configuration for the holdings analytics engine.
///
/// Controls parallelism, significance thresholds, classification bands and
/// view sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Enable parallel processing (requires 'parallel' feature).
    pub parallel: bool,

    /// Minimum investor count to trigger parallel processing.
    pub parallel_threshold: usize,

    /// Delta significance thresholds.
    pub significance: SignificanceThresholds,

    /// Concentration band cut-offs.
    pub concentration: ConcentrationBands,

    /// Consensus and contrarian thresholds.
    pub consensus: ConsensusThresholds,

    /// Number of largest positions shown in a portfolio view.
    pub top_positions: usize,

    /// Number of snapshot comparisons counted by the activity view.
    pub activity_comparisons: usize,

    /// Insight thresholds.
    pub insights: InsightThresholds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            parallel_threshold: 32,
            significance: SignificanceThresholds::default(),
            concentration: ConcentrationBands::default(),
            consensus: ConsensusThresholds::default(),
            top_positions: 20,
            activity_comparisons: 2,
            insights: InsightThresholds::default(),
        }
    }
}

impl EngineConfig {
    /// Creates a new config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config that always uses sequential processing.
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }

    /// Parses a TOML document. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::ConfigParse` for malformed TOML.
    pub fn from_toml_str(content: &str) -> AnalyticsResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::Io` if the file cannot be read and
    /// `AnalyticsError::ConfigParse` if it is not valid TOML.
    pub fn from_file(path: impl AsRef<Path>) -> AnalyticsResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| AnalyticsError::io(path.display().to_string(), e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Sets whether to use parallel processing.
    #[must_use]
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// Sets the threshold for parallel processing.
    #[must_use]
    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Sets the significance thresholds.
    #[must_use]
    pub fn with_significance(mut self, significance: SignificanceThresholds) -> Self {
        self.significance = significance;
        self
    }

    /// Sets the concentration bands.
    #[must_use]
    pub fn with_concentration(mut self, bands: ConcentrationBands) -> Self {
        self.concentration = bands;
        self
    }

    /// Sets the consensus thresholds.
    #[must_use]
    pub fn with_consensus(mut self, consensus: ConsensusThresholds) -> Self {
        self.consensus = consensus;
        self
    }

    /// Sets the number of top positions in portfolio views.
    #[must_use]
    pub fn with_top_positions(mut self, count: usize) -> Self {
        self.top_positions = count;
        self
    }

    /// Sets the number of comparisons in activity views.
    #[must_use]
    pub fn with_activity_comparisons(mut self, count: usize) -> Self {
        self.activity_comparisons = count;
        self
    }

    /// Sets the insight thresholds.
    #[must_use]
    pub fn with_insights(mut self, insights: InsightThresholds) -> Self {
        self.insights = insights;
        self
    }

    /// Returns true if parallel processing should be used for the given count.
    #[must_use]
    pub fn should_parallelize(&self, count: usize) -> bool {
        cfg!(feature = "parallel") && self.parallel && count >= self.parallel_threshold
    }

    /// Checks every threshold for range and consistency.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::InvalidConfig` naming the first bad field.
    pub fn validate(&self) -> AnalyticsResult<()> {
        let sig = &self.significance;
        if sig.min_share_delta.is_some_and(|v| v < Decimal::ZERO) {
            return Err(AnalyticsError::invalid_config(
                "significance.min_share_delta",
                "must be non-negative",
            ));
        }
        if sig
            .min_weight_change_pct
            .is_some_and(|v| !v.is_finite() || v < 0.0)
        {
            return Err(AnalyticsError::invalid_config(
                "significance.min_weight_change_pct",
                "must be a non-negative number",
            ));
        }

        let bands = &self.concentration;
        if !(0.0..=1.0).contains(&bands.balanced_above)
            || !(0.0..=1.0).contains(&bands.concentrated_above)
        {
            return Err(AnalyticsError::invalid_config(
                "concentration",
                "band cut-offs must lie in [0, 1]",
            ));
        }
        if bands.balanced_above >= bands.concentrated_above {
            return Err(AnalyticsError::invalid_config(
                "concentration",
                "balanced_above must be below concentrated_above",
            ));
        }

        let consensus = &self.consensus;
        if !(consensus.min_weight > 0.0 && consensus.min_weight <= 1.0) {
            return Err(AnalyticsError::invalid_config(
                "consensus.min_weight",
                "must lie in (0, 1]",
            ));
        }
        if !(consensus.contrarian_min_weight > 0.0 && consensus.contrarian_min_weight <= 1.0) {
            return Err(AnalyticsError::invalid_config(
                "consensus.contrarian_min_weight",
                "must lie in (0, 1]",
            ));
        }
        if consensus.min_investors == 0 || consensus.contrarian_max_investors == 0 {
            return Err(AnalyticsError::invalid_config(
                "consensus",
                "investor counts must be at least 1",
            ));
        }

        if self.top_positions == 0 {
            return Err(AnalyticsError::invalid_config(
                "top_positions",
                "must be at least 1",
            ));
        }
        if self.activity_comparisons == 0 {
            return Err(AnalyticsError::invalid_config(
                "activity_comparisons",
                "must be at least 1",
            ));
        }

        let insights = &self.insights;
        if !(insights.momentum_factor.is_finite() && insights.momentum_factor > 0.0) {
            return Err(AnalyticsError::invalid_config(
                "insights.momentum_factor",
                "must be a positive number",
            ));
        }
        if !(insights.period_coverage > 0.0 && insights.period_coverage <= 1.0) {
            return Err(AnalyticsError::invalid_config(
                "insights.period_coverage",
                "must lie in (0, 1]",
            ));
        }
        if insights.min_exit_value < Decimal::ZERO
            || insights.min_discovery_value < Decimal::ZERO
            || insights.min_flow_value < Decimal::ZERO
        {
            return Err(AnalyticsError::invalid_config(
                "insights",
                "value thresholds must be non-negative",
            ));
        }

        Ok(())
    }
}
