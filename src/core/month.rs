//! Month index and spatial level definitions.

use crate::error::{BenchmarkError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// First calendar year of the month index. Month 1 is January of this year.
pub const EPOCH_YEAR: i32 = 1980;

/// Integer month index with month 1 = January 1980.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthId(pub u32);

impl MonthId {
    /// Build the month index for a calendar year and month of year (1-12).
    ///
    /// # Example
    /// ```
    /// use benchmark_draws::core::MonthId;
    ///
    /// assert_eq!(MonthId::from_year_month(1990, 1).unwrap().get(), 121);
    /// ```
    pub fn from_year_month(year: i32, month: u32) -> Result<Self> {
        if year < EPOCH_YEAR {
            return Err(BenchmarkError::InvalidParameter(format!(
                "year {year} precedes the month index epoch {EPOCH_YEAR}"
            )));
        }
        if !(1..=12).contains(&month) {
            return Err(BenchmarkError::InvalidParameter(format!(
                "month of year must be in 1..=12, got {month}"
            )));
        }
        u32::try_from(year - EPOCH_YEAR)
            .ok()
            .and_then(|y| y.checked_mul(12))
            .and_then(|m| m.checked_add(month))
            .map(Self)
            .ok_or_else(|| {
                BenchmarkError::InvalidParameter(format!(
                    "year {year} lies beyond the month index range"
                ))
            })
    }

    /// First month of a calendar year.
    pub fn first_of_year(year: i32) -> Result<Self> {
        Self::from_year_month(year, 1)
    }

    /// Last month of a calendar year.
    pub fn last_of_year(year: i32) -> Result<Self> {
        Self::from_year_month(year, 12)
    }

    /// Inclusive range of raw month ids covering a calendar year.
    pub fn year_range(year: i32) -> Result<RangeInclusive<u32>> {
        Ok(Self::first_of_year(year)?.0..=Self::last_of_year(year)?.0)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Calendar year of this month. Month 0 is treated as December 1979.
    pub fn year(self) -> i32 {
        EPOCH_YEAR + (i64::from(self.0) - 1).div_euclid(12) as i32
    }

    /// Month of year, 1-12.
    pub fn month(self) -> u32 {
        (i64::from(self.0) - 1).rem_euclid(12) as u32 + 1
    }

    /// Position of this month within its year, 0-11.
    pub fn offset_in_year(self) -> u32 {
        self.month() - 1
    }

    /// First calendar day of the month.
    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year(), self.month(), 1)
    }
}

impl From<u32> for MonthId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for MonthId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Spatial resolution of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Country-month.
    #[default]
    Cm,
    /// PRIO-GRID cell-month.
    Pgm,
}

impl Level {
    /// Short name used in file names.
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Cm => "cm",
            Level::Pgm => "pgm",
        }
    }

    /// Name of the spatial unit column at this level.
    pub fn unit_column(self) -> &'static str {
        match self {
            Level::Cm => "country_id",
            Level::Pgm => "priogrid_gid",
        }
    }

    /// Fail unless `got` equals this level.
    pub fn ensure(self, got: Level) -> Result<()> {
        if self == got {
            Ok(())
        } else {
            Err(BenchmarkError::LevelMismatch {
                expected: self,
                got,
            })
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_index_epoch() {
        assert_eq!(MonthId::from_year_month(1980, 1).unwrap(), MonthId(1));
        assert_eq!(MonthId::from_year_month(1980, 12).unwrap(), MonthId(12));
        assert_eq!(MonthId::from_year_month(2018, 1).unwrap(), MonthId(457));
    }

    #[test]
    fn year_range_for_1990() {
        assert_eq!(MonthId::year_range(1990).unwrap(), 121..=132);
    }

    #[test]
    fn year_and_month_roundtrip() {
        for id in 1..=600 {
            let m = MonthId(id);
            assert_eq!(MonthId::from_year_month(m.year(), m.month()).unwrap(), m);
        }
        assert_eq!(MonthId(132).year(), 1990);
        assert_eq!(MonthId(132).month(), 12);
        assert_eq!(MonthId(133).offset_in_year(), 0);
    }

    #[test]
    fn first_day_is_calendar_date() {
        let date = MonthId(457).first_day().unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2018, 1, 1).unwrap());
    }

    #[test]
    fn rejects_pre_epoch_and_bad_months() {
        assert!(MonthId::from_year_month(1979, 12).is_err());
        assert!(MonthId::from_year_month(2000, 0).is_err());
        assert!(MonthId::from_year_month(2000, 13).is_err());
    }

    #[test]
    fn rejects_years_past_index_range() {
        assert!(matches!(
            MonthId::from_year_month(400_000_000, 1),
            Err(BenchmarkError::InvalidParameter(_))
        ));
        assert!(MonthId::year_range(i32::MAX).is_err());
        assert!(MonthId::last_of_year(357_915_921).is_err());

        let last = MonthId(u32::MAX);
        assert_eq!(MonthId::from_year_month(last.year(), last.month()).unwrap(), last);
    }

    #[test]
    fn level_names() {
        assert_eq!(Level::Cm.to_string(), "cm");
        assert_eq!(Level::Pgm.unit_column(), "priogrid_gid");
        assert!(Level::Cm.ensure(Level::Cm).is_ok());
        assert_eq!(
            Level::Cm.ensure(Level::Pgm),
            Err(BenchmarkError::LevelMismatch {
                expected: Level::Cm,
                got: Level::Pgm
            })
        );
    }
}
