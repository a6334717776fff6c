use chrono::NaiveDate;
use quill::model::Calendar;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarDto {
    pub id: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl CalendarDto {
    pub fn from(calendar: &Calendar) -> Self {
        Self {
            id: calendar.id.to_string(),
            description: calendar.describe_days(),
            start_date: calendar.start_date,
            end_date: calendar.end_date,
        }
    }
}
