//! Hourly crowd forecast for a hospital department.
//!
//! Runs the prediction pipeline over a 3-day x 24-hour grid and summarizes
//! today's predictions into a dominant crowd level and a recommended visit
//! hour. The classifier's label is read as a crowd level (0 Low, 1 Medium,
//! 2 High).

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as JsonValue};

use crate::pipeline::PredictionPipeline;

pub const FORECAST_DAYS: usize = 3;
pub const HOURS_PER_DAY: u32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrowdLevel {
    Low,
    Medium,
    High,
}

impl CrowdLevel {
    pub fn from_label(label: i64) -> Option<Self> {
        match label {
            0 => Some(CrowdLevel::Low),
            1 => Some(CrowdLevel::Medium),
            2 => Some(CrowdLevel::High),
            _ => None,
        }
    }
}

/// Inputs held constant across the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastParams {
    pub department: String,
    pub staff_count: f64,
    pub average_wait_time: f64,
    pub emergency_load: String,
}

impl ForecastParams {
    pub fn for_department(department: impl Into<String>) -> Self {
        Self {
            department: department.into(),
            staff_count: 10.0,
            average_wait_time: 17.0,
            emergency_load: "Yes".to_string(),
        }
    }

    fn record(&self, day: &str, hour: u32) -> Map<String, JsonValue> {
        let v = json!({
            "Day_of_Week": day,
            "Hour": hour,
            "Department": self.department,
            "Staff_Count": self.staff_count,
            "Average_Wait_Time": self.average_wait_time,
            "Emergency_Load": self.emergency_load,
        });
        match v {
            JsonValue::Object(m) => m,
            _ => Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyForecast {
    pub hour: u32,
    pub label: String,
    /// Crowd level per day; `None` when the prediction failed or the label
    /// is not a known level.
    pub levels: Vec<Option<CrowdLevel>>,
    /// Raw classifier label per day; `None` when that prediction failed.
    pub labels: Vec<Option<i64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrowdForecast {
    pub department: String,
    pub days: Vec<String>,
    pub hours: Vec<HourlyForecast>,
    pub today: CrowdLevel,
    pub recommended_hour: Option<RecommendedHour>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendedHour {
    pub hour: u32,
    pub label: String,
}

/// Build the forecast as seen from local time `now`.
pub fn forecast(pipeline: &PredictionPipeline, params: &ForecastParams, now: NaiveDateTime) -> CrowdForecast {
    let days = day_names(now.weekday());

    let mut hours = Vec::with_capacity(HOURS_PER_DAY as usize);
    let mut failures = 0usize;
    for hour in 0..HOURS_PER_DAY {
        let labels: Vec<Option<i64>> = days
            .iter()
            .map(|day| match pipeline.predict(&params.record(day, hour)) {
                Ok(r) => Some(r.discrete_label),
                Err(e) => {
                    failures += 1;
                    tracing::debug!(day = %day, hour, error = %e, "forecast cell failed");
                    None
                }
            })
            .collect();

        hours.push(HourlyForecast {
            hour,
            label: hour_label(hour),
            levels: labels.iter().map(|l| l.and_then(CrowdLevel::from_label)).collect(),
            labels,
        });
    }

    if failures > 0 {
        tracing::warn!(
            department = %params.department,
            failures,
            "some forecast cells could not be predicted"
        );
    }

    let today_levels: Vec<Option<CrowdLevel>> = hours.iter().map(|h| h.levels[0]).collect();
    let today = dominant_level(&today_levels);
    let recommended_hour = first_low_hour_after(&today_levels, now.hour()).map(|hour| RecommendedHour {
        hour,
        label: hour_label(hour),
    });

    CrowdForecast {
        department: params.department.clone(),
        days: days.to_vec(),
        hours,
        today,
        recommended_hour,
    }
}

/// Most frequent level; ties go to the lower level, and no data reads as Low.
pub fn dominant_level(levels: &[Option<CrowdLevel>]) -> CrowdLevel {
    let count = |target: CrowdLevel| levels.iter().filter(|l| **l == Some(target)).count();

    let mut best = CrowdLevel::High;
    let mut best_count = count(CrowdLevel::High);
    for level in [CrowdLevel::Medium, CrowdLevel::Low] {
        let c = count(level);
        if c >= best_count {
            best = level;
            best_count = c;
        }
    }
    best
}

/// First hour strictly after `current_hour` predicted Low.
pub fn first_low_hour_after(today: &[Option<CrowdLevel>], current_hour: u32) -> Option<u32> {
    today
        .iter()
        .enumerate()
        .map(|(h, l)| (h as u32, l))
        .find(|(h, l)| *h > current_hour && **l == Some(CrowdLevel::Low))
        .map(|(h, _)| h)
}

fn day_names(start: Weekday) -> [String; FORECAST_DAYS] {
    let mut day = start;
    std::array::from_fn(|_| {
        let name = weekday_name(day).to_string();
        day = day.succ();
        name
    })
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// `0` -> "12 AM", `13` -> "1 PM".
pub fn hour_label(hour: u32) -> String {
    let suffix = if hour < 12 { "AM" } else { "PM" };
    let h = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{h} {suffix}")
}
