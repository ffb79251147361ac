//! Estadísticas agregadas para administradores

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

/// Valor agregado de un día (UTC)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct DailyStat {
    pub day: NaiveDate,
    pub value: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodStats {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total: i64,
    pub daily: Vec<DailyStat>,
}

impl PeriodStats {
    pub fn from_daily(start: NaiveDate, end: NaiveDate, daily: Vec<DailyStat>) -> Self {
        let total = daily.iter().map(|d| d.value).sum();
        Self {
            start,
            end,
            total,
            daily,
        }
    }
}
