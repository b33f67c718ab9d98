use std::fmt;

use chrono::{
    Datelike,
    NaiveDate
};

#[derive(Debug, PartialEq, Eq)]
pub enum ParseKeyError {
    InvalidLength(usize),
    NotNumeric(String),
    InvalidDate(String)
}

impl fmt::Display for ParseKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseKeyError::InvalidLength(len) => {
                write!(f, "unexpected key length {}", len)
            },
            ParseKeyError::NotNumeric(key) => {
                write!(f, "key '{}' is not numeric", key)
            },
            ParseKeyError::InvalidDate(key) => {
                write!(f, "key '{}' is not a calendar date", key)
            }
        }
    }
}

impl std::error::Error for ParseKeyError {}

fn check_digits(key: &str, len: usize) -> Result<(), ParseKeyError> {
    if key.len() != len {
        return Err(ParseKeyError::InvalidLength(key.len()));
    }
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseKeyError::NotNumeric(key.to_owned()));
    }
    Ok(())
}

/// `YYYYMM`：一個月份的快取鍵。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MonthKey(String);

impl MonthKey {
    pub fn from_date(d: NaiveDate) -> MonthKey {
        MonthKey(format!("{:04}{:02}", d.year(), d.month()))
    }

    pub fn parse(key: &str) -> Result<MonthKey, ParseKeyError> {
        check_digits(key, 6)?;
        let month: u32 = key[4..].parse().map_err(|_| ParseKeyError::NotNumeric(key.to_owned()))?;
        if !(1..=12).contains(&month) {
            return Err(ParseKeyError::InvalidDate(key.to_owned()));
        }
        Ok(MonthKey(key.to_owned()))
    }

    pub fn year(&self) -> i32 {
        // digits are validated on construction
        self.0[..4].parse().unwrap_or_default()
    }

    /// Two-digit month, "01".."12", as the upstream `solMonth` expects it.
    pub fn month_str(&self) -> &str {
        &self.0[4..]
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn contains(&self, date_key: &DateKey) -> bool {
        date_key.as_str().starts_with(self.as_str())
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `YYYYMMDD`：單日鍵，與上游 `locdate` 的字串形式一致。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateKey(String);

impl DateKey {
    pub fn from_date(d: NaiveDate) -> DateKey {
        DateKey(format!("{:04}{:02}{:02}", d.year(), d.month(), d.day()))
    }

    pub fn parse(key: &str) -> Result<DateKey, ParseKeyError> {
        check_digits(key, 8)?;
        NaiveDate::parse_from_str(key, "%Y%m%d")
            .map_err(|_| ParseKeyError::InvalidDate(key.to_owned()))?;
        Ok(DateKey(key.to_owned()))
    }

    pub fn month_key(&self) -> MonthKey {
        MonthKey(self.0[..6].to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_zero_padded() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(MonthKey::from_date(d).as_str(), "202403");
        assert_eq!(DateKey::from_date(d).as_str(), "20240301");
        assert_eq!(MonthKey::from_date(d).month_str(), "03");
        assert_eq!(MonthKey::from_date(d).year(), 2024);
    }

    #[test]
    fn test_month_contains_date() {
        let month = MonthKey::parse("202401").unwrap();
        assert!(month.contains(&DateKey::parse("20240131").unwrap()));
        assert!(!month.contains(&DateKey::parse("20240201").unwrap()));
        assert_eq!(DateKey::parse("20240131").unwrap().month_key(), month);
    }

    #[test]
    fn test_parse_rejects_bad_keys() {
        assert_eq!(DateKey::parse("2024011"), Err(ParseKeyError::InvalidLength(7)));
        assert!(matches!(DateKey::parse("2024O101"), Err(ParseKeyError::NotNumeric(_))));
        assert!(matches!(DateKey::parse("20240230"), Err(ParseKeyError::InvalidDate(_))));
        assert!(matches!(MonthKey::parse("202413"), Err(ParseKeyError::InvalidDate(_))));
    }
}
