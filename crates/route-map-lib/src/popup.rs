//! Detail popup for a clicked position marker

use crate::model::RouteData;
use chrono::{DateTime, Local, TimeZone, Utc};
use geo::Coord;

/// Formatted attributes of one position sample
#[derive(Clone, Debug, PartialEq)]
pub struct PopupContent {
    pub time: String,
    pub lon: String,
    pub lat: String,
    pub course: String,
    pub speed: String,
}

impl PopupContent {
    /// Format a sample with its timestamp shown in the local time zone
    pub fn from_sample(sample: &RouteData) -> Self {
        Self::from_sample_in(sample, &Local)
    }

    pub fn from_sample_in<Tz: TimeZone>(sample: &RouteData, tz: &Tz) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            time: format_timestamp(sample.time, tz),
            lon: format!("{:.2}", sample.lon),
            lat: format!("{:.2}", sample.lat),
            course: format_number(sample.course),
            speed: format_number(sample.speed),
        }
    }
}

/// Time then date, e.g. `14:03:07 2024-05-01`
fn format_timestamp<Tz: TimeZone>(millis: f64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match DateTime::<Utc>::from_timestamp_millis(millis as i64) {
        Some(utc) => utc.with_timezone(tz).format("%H:%M:%S %Y-%m-%d").to_string(),
        None => "Invalid Date".to_string(),
    }
}

/// Whole numbers print without a fractional part
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Popup overlay anchored to a map coordinate; hidden while `position` is `None`
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Popup {
    position: Option<Coord<f64>>,
    content: Option<PopupContent>,
}

impl Popup {
    pub fn show(&mut self, position: Coord<f64>, content: PopupContent) {
        self.position = Some(position);
        self.content = Some(content);
    }

    /// Clear the position; the last content is kept like a detached overlay element
    pub fn hide(&mut self) {
        self.position = None;
    }

    pub fn is_open(&self) -> bool {
        self.position.is_some()
    }

    /// Anchor (Web Mercator) and content, only while open
    pub fn visible(&self) -> Option<(Coord<f64>, &PopupContent)> {
        match (self.position, &self.content) {
            (Some(position), Some(content)) => Some((position, content)),
            _ => None,
        }
    }
}
