//! Network-quality profile classification.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Categorical bandwidth class reported by the network-quality capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectiveType {
    /// Slowest class.
    #[serde(rename = "slow-2g")]
    Slow2g,
    /// Second-slowest class.
    #[serde(rename = "2g")]
    TwoG,
    /// Moderate bandwidth.
    #[serde(rename = "3g")]
    ThreeG,
    /// Full bandwidth.
    #[serde(rename = "4g")]
    FourG,
}

impl EffectiveType {
    /// Whether this class sits in the slow tier (two lowest classes).
    #[must_use]
    pub const fn is_slow_tier(self) -> bool {
        matches!(self, Self::Slow2g | Self::TwoG)
    }
}

impl fmt::Display for EffectiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Slow2g => "slow-2g",
            Self::TwoG => "2g",
            Self::ThreeG => "3g",
            Self::FourG => "4g",
        };
        f.write_str(label)
    }
}

/// Latest observed network profile. Never persisted; always re-sampled
/// from the capability provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkProfile {
    /// Coarse bandwidth class.
    pub effective_type: EffectiveType,
    /// Whether the user enabled a data-saving preference.
    pub save_data: bool,
}

impl NetworkProfile {
    /// Create a profile.
    #[must_use]
    pub const fn new(effective_type: EffectiveType, save_data: bool) -> Self {
        Self {
            effective_type,
            save_data,
        }
    }

    /// Whether the profile warrants the slow-network advisory: either the
    /// slow bandwidth tier or an enabled data saver.
    #[must_use]
    pub const fn is_constrained(&self) -> bool {
        self.effective_type.is_slow_tier() || self.save_data
    }

    /// Human-readable summary, e.g. `4g (Data Saver On)`.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.save_data {
            format!("{} (Data Saver On)", self.effective_type)
        } else {
            self.effective_type.to_string()
        }
    }
}
