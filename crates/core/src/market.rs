//! Mock market data shown next to the AI output: a fixed set of economic
//! indicators and randomly sampled volatility readings.

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomicIndicator {
    pub id: String,
    pub name: String,
    pub value: f64,
    pub unit: String,
    pub trend: Trend,
    pub last_updated: NaiveDate,
}

fn indicator(
    id: &str,
    name: &str,
    value: f64,
    trend: Trend,
    (y, m, d): (i32, u32, u32),
) -> Option<EconomicIndicator> {
    Some(EconomicIndicator {
        id: id.to_string(),
        name: name.to_string(),
        value,
        unit: "%".to_string(),
        trend,
        last_updated: NaiveDate::from_ymd_opt(y, m, d)?,
    })
}

pub fn economic_indicators() -> Vec<EconomicIndicator> {
    [
        indicator("1", "Inflation (CPI YoY)", 2.8, Trend::Down, (2024, 7, 15)),
        indicator("2", "Unemployment rate", 3.9, Trend::Neutral, (2024, 7, 5)),
        indicator("3", "GDP growth (QoQ)", 0.5, Trend::Up, (2024, 6, 28)),
        indicator("4", "Policy rate (central bank)", 5.25, Trend::Neutral, (2024, 7, 20)),
    ]
    .into_iter()
    .flatten()
    .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolatilityIndex {
    Vix,
    Vkospi,
}

impl VolatilityIndex {
    pub fn id(self) -> &'static str {
        match self {
            Self::Vix => "vix",
            Self::Vkospi => "vkospi",
        }
    }

    pub fn index_name(self) -> &'static str {
        match self {
            Self::Vix => "VIX",
            Self::Vkospi => "VKOSPI",
        }
    }

    pub fn market(self) -> &'static str {
        match self {
            Self::Vix => "Global market volatility (VIX)",
            Self::Vkospi => "Domestic market volatility (VKOSPI)",
        }
    }

    /// Range the mock readings are drawn from.
    pub fn range(self) -> (f64, f64) {
        match self {
            Self::Vix => (10.0, 40.0),
            Self::Vkospi => (10.0, 45.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolatilityLevel {
    Low,
    Moderate,
    High,
    Extreme,
}

impl VolatilityLevel {
    fn message(self, index_name: &str) -> String {
        match self {
            Self::Low => format!("{index_name} is steady; market volatility is low."),
            Self::Moderate => {
                format!("{index_name} has risen somewhat, but market volatility is moderate.")
            }
            Self::High => format!(
                "{index_name} is elevated and market volatility is widening. Invest with care."
            ),
            Self::Extreme => format!(
                "{index_name} is very high and market volatility is extreme. Exercise particular caution."
            ),
        }
    }
}

/// Buckets `value` by the quarter of `[min, max]` it falls in.
pub fn classify_volatility(value: f64, min: f64, max: f64) -> VolatilityLevel {
    let span = max - min;
    if value < min + span * 0.25 {
        VolatilityLevel::Low
    } else if value < min + span * 0.5 {
        VolatilityLevel::Moderate
    } else if value < min + span * 0.75 {
        VolatilityLevel::High
    } else {
        VolatilityLevel::Extreme
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolatilityAlert {
    pub id: String,
    pub market: String,
    pub index_name: String,
    pub index_value: f64,
    pub level: VolatilityLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

pub fn volatility_alert(index: VolatilityIndex, value: f64, now: DateTime<Utc>) -> VolatilityAlert {
    let value = (value * 100.0).round() / 100.0;
    let (min, max) = index.range();
    let level = classify_volatility(value, min, max);

    VolatilityAlert {
        id: index.id().to_string(),
        market: index.market().to_string(),
        index_name: index.index_name().to_string(),
        index_value: value,
        level,
        message: level.message(index.index_name()),
        timestamp: now,
    }
}

pub fn sample_volatility(index: VolatilityIndex, rng: &mut impl Rng) -> VolatilityAlert {
    let (min, max) = index.range();
    let value = rng.gen_range(min..max);
    let alert = volatility_alert(index, value, Utc::now());
    tracing::debug!(
        index = index.index_name(),
        value = alert.index_value,
        level = ?alert.level,
        "sampled mock volatility"
    );
    alert
}
