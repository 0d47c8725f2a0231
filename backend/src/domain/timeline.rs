//! # Service Timeline Layout
//!
//! Places a car's maintenance history on a vertical time axis. The earliest service
//! sits at the top of the axis and the latest date involved (a planned next service
//! or the last service itself) at the bottom.
//!
//! Each dated record gets a solid tick at its date and a two-line label. When the
//! record plans a next service on a date that is not itself a recorded service date,
//! a dashed tick and a "Next service" label mark it as well.
//!
//! Labels never overlap: each label sits at least `min_label_spacing` below the
//! previous one, but never below the end of the axis. Coordinates follow the
//! drawing convention of the report model, with y growing upwards.

use chrono::{Datelike, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::models::report::Drawing;

/// Geometry of the timeline figure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub drawing_width: f64,
    pub drawing_height: f64,
    /// x of the vertical axis
    pub axis_x: f64,
    /// y of the earliest date (top of the axis)
    pub axis_start_y: f64,
    /// y of the latest date (bottom of the axis)
    pub axis_end_y: f64,
    pub min_label_spacing: f64,
    pub service_tick_length: f64,
    pub due_tick_length: f64,
    pub due_dash: [f64; 2],
    pub service_label_offset: f64,
    pub due_label_offset: f64,
    pub font_size: f64,
    /// Sort records by date before layout instead of keeping the given order
    pub sort_chronologically: bool,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            drawing_width: 500.0,
            drawing_height: 400.0,
            axis_x: 50.0,
            axis_start_y: 350.0,
            axis_end_y: 50.0,
            min_label_spacing: 25.0,
            service_tick_length: 20.0,
            due_tick_length: 10.0,
            due_dash: [4.0, 2.0],
            service_label_offset: 25.0,
            due_label_offset: 15.0,
            font_size: 8.0,
            sort_chronologically: false,
        }
    }
}

/// One maintenance record as the timeline sees it
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEvent {
    pub service_id: i64,
    pub date_service: Option<NaiveDate>,
    pub next_date: Option<NaiveDate>,
    pub odometer: Option<u32>,
    /// Resolved work type label, `None` when the reference is missing
    pub work_type: Option<String>,
    pub conclusion: Option<String>,
}

/// Planned next service drawn below a record
#[derive(Debug, Clone, PartialEq)]
pub struct DueMarker {
    pub date: NaiveDate,
    pub tick_y: f64,
    pub label_y: f64,
}

/// Placement of one dated record
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEntry {
    pub service_id: i64,
    pub tick_y: f64,
    pub label_y: f64,
    pub due: Option<DueMarker>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TimelineLayout {
    /// No record has a service date
    NoData,
    Drawing {
        drawing: Drawing,
        entries: Vec<TimelineEntry>,
    },
}

#[derive(Debug, Clone)]
pub struct TimelineEngine {
    config: TimelineConfig,
}

impl TimelineEngine {
    pub fn new(config: TimelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    /// Lay out the dated records of `events`; undated records are skipped
    pub fn layout(&self, events: &[TimelineEvent]) -> TimelineLayout {
        let mut dated: Vec<(&TimelineEvent, NaiveDate)> = events
            .iter()
            .filter_map(|event| event.date_service.map(|date| (event, date)))
            .collect();

        if dated.is_empty() {
            debug!("Timeline has no dated records out of {}", events.len());
            return TimelineLayout::NoData;
        }

        if self.config.sort_chronologically {
            dated.sort_by_key(|(event, date)| (*date, event.service_id));
        }

        let earliest = dated
            .iter()
            .map(|(_, date)| ordinal(*date))
            .min()
            .unwrap_or_default();
        let latest = dated
            .iter()
            .map(|(event, date)| ordinal(event.next_date.unwrap_or(*date)))
            .max()
            .unwrap_or_default();
        let range = (latest - earliest).max(1) as f64;

        let cfg = &self.config;
        let position = |date: NaiveDate| -> f64 {
            cfg.axis_start_y
                - ((ordinal(date) - earliest) as f64 / range) * (cfg.axis_start_y - cfg.axis_end_y)
        };
        let service_dates: HashSet<NaiveDate> = dated.iter().map(|(_, date)| *date).collect();

        let mut drawing = Drawing::new(cfg.drawing_width, cfg.drawing_height);
        drawing.line(cfg.axis_x, cfg.axis_start_y, cfg.axis_x, cfg.axis_end_y);

        let mut entries = Vec::with_capacity(dated.len());
        let mut last_y = cfg.axis_start_y;

        for (event, date) in dated {
            let tick_y = position(date);
            drawing.line(cfg.axis_x, tick_y, cfg.axis_x + cfg.service_tick_length, tick_y);

            let label_y = self.label_position(tick_y, last_y);
            let text_x = cfg.axis_x + cfg.service_label_offset;
            drawing.text(
                text_x,
                label_y - 5.0,
                format!(
                    "{} ({})",
                    date.format("%Y-%m-%d"),
                    event.work_type.as_deref().unwrap_or("Not specified")
                ),
                cfg.font_size,
            );
            drawing.text(
                text_x,
                label_y - 15.0,
                format!(
                    "Mileage: {}, {}",
                    event.odometer.unwrap_or(0),
                    event.conclusion.as_deref().unwrap_or("")
                ),
                cfg.font_size,
            );
            last_y = label_y - 15.0;

            let due = match event.next_date {
                Some(next) if !service_dates.contains(&next) => {
                    let due_tick_y = position(next);
                    drawing.dashed_line(
                        cfg.axis_x,
                        due_tick_y,
                        cfg.axis_x + cfg.due_tick_length,
                        due_tick_y,
                        cfg.due_dash,
                    );

                    let due_label_y = self.label_position(due_tick_y, last_y);
                    drawing.text(
                        cfg.axis_x + cfg.due_label_offset,
                        due_label_y - 5.0,
                        format!("Next service: {}", next.format("%Y-%m-%d")),
                        cfg.font_size,
                    );
                    last_y = due_label_y - 5.0;

                    Some(DueMarker {
                        date: next,
                        tick_y: due_tick_y,
                        label_y: due_label_y,
                    })
                }
                _ => None,
            };

            entries.push(TimelineEntry {
                service_id: event.service_id,
                tick_y,
                label_y,
                due,
            });
        }

        TimelineLayout::Drawing { drawing, entries }
    }

    /// Label anchor: at the tick when there is room, else one spacing below the
    /// previous label, clamped to the end of the axis
    fn label_position(&self, tick_y: f64, last_y: f64) -> f64 {
        tick_y
            .min(last_y - self.config.min_label_spacing)
            .max(self.config.axis_end_y)
    }
}

fn ordinal(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce())
}
