//! Account tiers and their static budgets

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Cost of one word in micro-dollars (1.20 USD per 1000 words)
pub const COST_PER_WORD_MICROS: i64 = 1_200;

/// Deadline applied to a single humanize call, retries included
pub const HUMANIZE_TIMEOUT_MS: u64 = 35_000;

/// Named plan with fixed word budgets, model selector, and cost rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Basic,
    Pro,
}

/// Static configuration attached to a tier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierConfig {
    pub monthly_word_budget: u32,
    pub per_request_word_budget: u32,
    pub model: &'static str,
    pub cost_per_word_micros: i64,
    pub timeout_ms: u64,
}

static FREE: TierConfig = TierConfig {
    monthly_word_budget: 5_000,
    per_request_word_budget: 500,
    model: "claude-3-haiku-20240307",
    cost_per_word_micros: COST_PER_WORD_MICROS,
    timeout_ms: HUMANIZE_TIMEOUT_MS,
};

static BASIC: TierConfig = TierConfig {
    monthly_word_budget: 50_000,
    per_request_word_budget: 2_000,
    model: "claude-3-sonnet-20240229",
    cost_per_word_micros: COST_PER_WORD_MICROS,
    timeout_ms: HUMANIZE_TIMEOUT_MS,
};

static PRO: TierConfig = TierConfig {
    monthly_word_budget: 200_000,
    per_request_word_budget: 5_000,
    model: "claude-sonnet-4-5-20250929",
    cost_per_word_micros: COST_PER_WORD_MICROS,
    timeout_ms: HUMANIZE_TIMEOUT_MS,
};

impl Tier {
    /// Interpret a stored or requested tier value. Unknown values degrade to `Free`.
    pub fn clamp(raw: &str) -> Self {
        match raw {
            "basic" => Self::Basic,
            "pro" => Self::Pro,
            _ => Self::Free,
        }
    }

    pub fn config(self) -> &'static TierConfig {
        match self {
            Self::Free => &FREE,
            Self::Basic => &BASIC,
            Self::Pro => &PRO,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Basic => "basic",
            Self::Pro => "pro",
        }
    }

    pub fn all() -> [Tier; 3] {
        [Self::Free, Self::Basic, Self::Pro]
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TierConfig {
    /// Cost of `words` in micro-dollars, rounded to 4 decimal places of a dollar
    pub fn cost_for(&self, words: u32) -> i64 {
        round_to_four_decimals(i64::from(words) * self.cost_per_word_micros)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Round micro-dollars to the nearest 0.0001 USD (100 micros), half away from zero
fn round_to_four_decimals(micros: i64) -> i64 {
    let rem = micros % 100;

    if rem.abs() >= 50 {
        micros - rem + 100 * micros.signum()
    } else {
        micros - rem
    }
}

/// Render micro-dollars as a dollar amount
pub fn micros_to_usd(micros: i64) -> f64 {
    micros as f64 / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_known_tiers() {
        assert_eq!(Tier::clamp("free"), Tier::Free);
        assert_eq!(Tier::clamp("basic"), Tier::Basic);
        assert_eq!(Tier::clamp("pro"), Tier::Pro);
    }

    #[test]
    fn test_clamp_unknown_values_fall_back_to_free() {
        assert_eq!(Tier::clamp(""), Tier::Free);
        assert_eq!(Tier::clamp("enterprise"), Tier::Free);
        assert_eq!(Tier::clamp("PRO"), Tier::Free);
        assert_eq!(Tier::clamp(" basic"), Tier::Free);
    }

    #[test]
    fn test_config_budgets() {
        let free = Tier::Free.config();
        assert_eq!(free.monthly_word_budget, 5_000);
        assert_eq!(free.per_request_word_budget, 500);
        assert_eq!(free.model, "claude-3-haiku-20240307");

        let basic = Tier::Basic.config();
        assert_eq!(basic.monthly_word_budget, 50_000);
        assert_eq!(basic.per_request_word_budget, 2_000);

        let pro = Tier::Pro.config();
        assert_eq!(pro.monthly_word_budget, 200_000);
        assert_eq!(pro.per_request_word_budget, 5_000);
        assert_eq!(pro.model, "claude-sonnet-4-5-20250929");

        for tier in Tier::all() {
            assert_eq!(tier.config().timeout_ms, 35_000);
        }
    }

    #[test]
    fn test_cost_for_words() {
        let config = Tier::Free.config();

        // 150 words * 0.0012 = 0.18 USD
        assert_eq!(config.cost_for(150), 180_000);
        assert_eq!(config.cost_for(1), 1_200);
        assert_eq!(config.cost_for(0), 0);
        assert!((micros_to_usd(config.cost_for(1000)) - 1.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rounding_to_four_decimals() {
        assert_eq!(round_to_four_decimals(1_249), 1_200);
        assert_eq!(round_to_four_decimals(1_250), 1_300);
        assert_eq!(round_to_four_decimals(99), 100);
        assert_eq!(round_to_four_decimals(-150), -200);
    }

    #[test]
    fn test_tier_serialization() {
        assert_eq!(serde_json::to_string(&Tier::Basic).unwrap(), "\"basic\"");
        let tier: Tier = serde_json::from_str("\"pro\"").unwrap();
        assert_eq!(tier, Tier::Pro);
        assert_eq!(Tier::Free.to_string(), "free");
    }
}
