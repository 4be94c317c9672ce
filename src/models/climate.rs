//! Historical climate records

use serde::{Deserialize, Serialize};

/// Long-term monthly climate norm for one (location, year, month)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalAverage {
    pub year: i32,
    /// Month number, 1-12
    pub month: u32,
    /// Average rainfall in mm/day
    pub avg_rainfall_mm: f64,
    /// Average temperature at 2 m in Celsius
    pub avg_temp_c: f64,
}

/// Inclusive range of years
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    #[must_use]
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// Number of years covered; zero for an inverted range
    #[must_use]
    pub fn len(&self) -> usize {
        usize::try_from(i64::from(self.end) - i64::from(self.start) + 1).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.start..=self.end
    }

    /// Label like `1985–2000`
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}–{}", self.start, self.end)
    }
}
