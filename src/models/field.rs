use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SportCategory {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Field {
    pub id: i64,
    pub name: String,
    pub weekday_price: i64,
    pub weekend_price: i64,
    pub status: FieldStatus,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: Option<SportCategory>,
}

impl Field {
    pub fn is_bookable(&self) -> bool {
        self.status == FieldStatus::Active
    }

    /// Hourly price on `date`; Saturday and Sunday use the weekend rate.
    pub fn price_for(&self, date: NaiveDate) -> i64 {
        match date.weekday() {
            Weekday::Sat | Weekday::Sun => self.weekend_price,
            _ => self.weekday_price,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldInput {
    pub name: String,
    pub category_id: i64,
    pub weekday_price: i64,
    pub weekend_price: i64,
    pub status: FieldStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> Field {
        Field {
            id: 1,
            name: "Lapangan A".to_string(),
            weekday_price: 100_000,
            weekend_price: 150_000,
            status: FieldStatus::Active,
            image: None,
            category: None,
        }
    }

    #[test]
    fn test_weekend_price() {
        // 2025-06-14 is a Saturday, 2025-06-16 a Monday
        let sat = NaiveDate::from_ymd_opt(2025, 6, 14).unwrap();
        let sun = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let mon = NaiveDate::from_ymd_opt(2025, 6, 16).unwrap();
        assert_eq!(field().price_for(sat), 150_000);
        assert_eq!(field().price_for(sun), 150_000);
        assert_eq!(field().price_for(mon), 100_000);
    }

    #[test]
    fn test_inactive_field_not_bookable() {
        let mut f = field();
        assert!(f.is_bookable());
        f.status = FieldStatus::Inactive;
        assert!(!f.is_bookable());
    }
}
