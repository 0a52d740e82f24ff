use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvestmentGoal {
    LongTermGrowth,
    ShortTermGains,
    DividendIncome,
    CapitalPreservation,
    Balanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskAppetite {
    Low,
    Medium,
    High,
    VeryHigh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarketPreference {
    Us,
    Kr,
    Both,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvestmentStrategy {
    Value,
    Growth,
    Dividend,
    IndexTracking,
    Esg,
    Momentum,
    Contrarian,
    SmallCap,
    SectorRotation,
    #[default]
    Undefined,
}

/// Investment preferences collected by the dashboard form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub investment_goal: InvestmentGoal,
    pub risk_appetite: RiskAppetite,
    pub market_preference: MarketPreference,
    #[serde(default)]
    pub investment_strategy: InvestmentStrategy,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseProfileError {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

impl InvestmentGoal {
    pub const ALL: [Self; 5] = [
        Self::LongTermGrowth,
        Self::ShortTermGains,
        Self::DividendIncome,
        Self::CapitalPreservation,
        Self::Balanced,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::LongTermGrowth => "long-term-growth",
            Self::ShortTermGains => "short-term-gains",
            Self::DividendIncome => "dividend-income",
            Self::CapitalPreservation => "capital-preservation",
            Self::Balanced => "balanced",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::LongTermGrowth => "Long-term growth",
            Self::ShortTermGains => "Short-term gains",
            Self::DividendIncome => "Dividend income",
            Self::CapitalPreservation => "Capital preservation",
            Self::Balanced => "Balanced portfolio",
        }
    }
}

impl RiskAppetite {
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::VeryHigh];

    pub fn name(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::VeryHigh => "very-high",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::VeryHigh => "Very high",
        }
    }
}

impl MarketPreference {
    pub const ALL: [Self; 3] = [Self::Us, Self::Kr, Self::Both];

    pub fn name(self) -> &'static str {
        match self {
            Self::Us => "us",
            Self::Kr => "kr",
            Self::Both => "both",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Us => "US stocks",
            Self::Kr => "Korean stocks",
            Self::Both => "Both (US and Korea)",
        }
    }
}

impl InvestmentStrategy {
    pub const ALL: [Self; 10] = [
        Self::Value,
        Self::Growth,
        Self::Dividend,
        Self::IndexTracking,
        Self::Esg,
        Self::Momentum,
        Self::Contrarian,
        Self::SmallCap,
        Self::SectorRotation,
        Self::Undefined,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Value => "value",
            Self::Growth => "growth",
            Self::Dividend => "dividend",
            Self::IndexTracking => "index-tracking",
            Self::Esg => "esg",
            Self::Momentum => "momentum",
            Self::Contrarian => "contrarian",
            Self::SmallCap => "small-cap",
            Self::SectorRotation => "sector-rotation",
            Self::Undefined => "undefined",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Value => "Value investing",
            Self::Growth => "Growth investing",
            Self::Dividend => "Dividend investing",
            Self::IndexTracking => "Index tracking",
            Self::Esg => "ESG investing",
            Self::Momentum => "Momentum investing",
            Self::Contrarian => "Contrarian investing",
            Self::SmallCap => "Small-cap investing",
            Self::SectorRotation => "Sector rotation",
            Self::Undefined => "No specific strategy",
        }
    }
}

fn parse_named<T: Copy>(
    kind: &'static str,
    all: &[T],
    name: fn(T) -> &'static str,
    s: &str,
) -> Result<T, ParseProfileError> {
    let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
    all.iter()
        .copied()
        .find(|v| name(*v) == wanted)
        .ok_or_else(|| ParseProfileError {
            kind,
            value: s.to_string(),
            expected: all.iter().map(|v| name(*v)).collect::<Vec<_>>().join(", "),
        })
}

impl FromStr for InvestmentGoal {
    type Err = ParseProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_named("investment goal", &Self::ALL, Self::name, s)
    }
}

impl FromStr for RiskAppetite {
    type Err = ParseProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_named("risk appetite", &Self::ALL, Self::name, s)
    }
}

impl FromStr for MarketPreference {
    type Err = ParseProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_named("market preference", &Self::ALL, Self::name, s)
    }
}

impl FromStr for InvestmentStrategy {
    type Err = ParseProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_named("investment strategy", &Self::ALL, Self::name, s)
    }
}

impl fmt::Display for UserProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "goal={}, risk={}, market={}, strategy={}",
            self.investment_goal.name(),
            self.risk_appetite.name(),
            self.market_preference.name(),
            self.investment_strategy.name()
        )
    }
}
