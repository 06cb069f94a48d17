use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One of the four dashboard counters. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatKey {
    ActiveMatters,
    HearingsThisWeek,
    FilingsPending,
    TeamUtilisation,
}

impl StatKey {
    pub const ALL: [StatKey; 4] = [
        StatKey::ActiveMatters,
        StatKey::HearingsThisWeek,
        StatKey::FilingsPending,
        StatKey::TeamUtilisation,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StatKey::ActiveMatters => "activeMatters",
            StatKey::HearingsThisWeek => "hearingsThisWeek",
            StatKey::FilingsPending => "filingsPending",
            StatKey::TeamUtilisation => "teamUtilisation",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub active_matters: f64,
    pub hearings_this_week: f64,
    pub filings_pending: f64,
    pub team_utilisation: f64,
}

impl Stats {
    #[must_use]
    pub fn get(&self, key: StatKey) -> f64 {
        match key {
            StatKey::ActiveMatters => self.active_matters,
            StatKey::HearingsThisWeek => self.hearings_this_week,
            StatKey::FilingsPending => self.filings_pending,
            StatKey::TeamUtilisation => self.team_utilisation,
        }
    }

    pub fn set(&mut self, key: StatKey, value: f64) {
        let value = if value.is_finite() { value } else { 0.0 };
        match key {
            StatKey::ActiveMatters => self.active_matters = value,
            StatKey::HearingsThisWeek => self.hearings_this_week = value,
            StatKey::FilingsPending => self.filings_pending = value,
            StatKey::TeamUtilisation => self.team_utilisation = value,
        }
    }

    /// Full stats from a JSON object. Missing or unusable values become 0 and
    /// unknown keys are ignored.
    #[must_use]
    pub fn from_json(map: &Map<String, Value>) -> Self {
        let mut stats = Self::default();
        for key in StatKey::ALL {
            stats.set(key, map.get(key.as_str()).map_or(0.0, coerce_number));
        }
        stats
    }

    /// The recognized keys present in `map` with their coerced values.
    #[must_use]
    pub fn partial_from_json(map: &Map<String, Value>) -> Vec<(StatKey, f64)> {
        StatKey::ALL
            .into_iter()
            .filter_map(|key| map.get(key.as_str()).map(|v| (key, coerce_number(v))))
            .collect()
    }
}

/// Numeric coercion for client-supplied counters: numbers pass through,
/// numeric strings are parsed, booleans count as 1/0 and everything else
/// (including non-finite results) is 0.
#[must_use]
pub fn coerce_number(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse::<f64>().unwrap_or(0.0)
            }
        }
        Value::Bool(b) => f64::from(u8::from(*b)),
        _ => 0.0,
    };
    if n.is_finite() { n } else { 0.0 }
}
