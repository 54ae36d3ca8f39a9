//! Pairing of U/V records into snapshots and the subplot grid layout.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use wind_common::{DataStamp, WindComponent};

use crate::error::{PlotError, PlotResult};
use crate::loader::Record;

/// One U record and one V record valid at the same time.
#[derive(Debug, Clone)]
pub struct WindSnapshot {
    pub u: Record,
    pub v: Record,
}

impl WindSnapshot {
    /// Pair two records; they must share grid shape and reference stamps.
    pub fn new(u: Record, v: Record) -> PlotResult<Self> {
        if u.shape() != v.shape() {
            let ((u_width, u_height), (v_width, v_height)) = (u.shape(), v.shape());
            return Err(PlotError::ShapeMismatch {
                time: u.validity,
                u_width,
                u_height,
                v_width,
                v_height,
            });
        }
        if u.stamp != v.stamp {
            return Err(PlotError::TimeMismatch {
                u: u.stamp,
                v: v.stamp,
            });
        }
        Ok(Self { u, v })
    }

    pub fn stamp(&self) -> DataStamp {
        self.u.stamp
    }

    pub fn validity(&self) -> NaiveDateTime {
        self.u.validity
    }

    pub fn shape(&self) -> (usize, usize) {
        self.u.shape()
    }
}

/// Reference time of a run, taken from the first record's stamps.
pub fn reference_time(first: &Record) -> PlotResult<NaiveDateTime> {
    first.stamp.to_datetime().map_err(PlotError::Stamp)
}

struct Slot {
    validity: NaiveDateTime,
    u: Option<Record>,
    v: Option<Record>,
}

/// Group wind records by validity time, in order of first appearance.
///
/// Records that carry neither component are skipped with a warning. Each
/// validity time must end up with exactly one U and one V record.
pub fn pair_snapshots(records: Vec<Record>) -> PlotResult<Vec<WindSnapshot>> {
    let mut slots: Vec<Slot> = Vec::new();
    let mut by_time: HashMap<NaiveDateTime, usize> = HashMap::new();

    for record in records {
        let Some(component) = record.component else {
            warn!(
                index = record.index,
                short_name = %record.short_name,
                "Skipping record that is not a wind component"
            );
            continue;
        };

        let time = record.validity;
        let position = *by_time.entry(time).or_insert_with(|| {
            slots.push(Slot {
                validity: time,
                u: None,
                v: None,
            });
            slots.len() - 1
        });
        let slot = &mut slots[position];
        let target = match component {
            WindComponent::U => &mut slot.u,
            WindComponent::V => &mut slot.v,
        };
        if target.is_some() {
            return Err(PlotError::DuplicateComponent {
                time,
                component,
                index: record.index,
            });
        }
        *target = Some(record);
    }

    let mut snapshots = Vec::with_capacity(slots.len());
    for slot in slots {
        let time = slot.validity;
        let snapshot = match (slot.u, slot.v) {
            (Some(u), Some(v)) => WindSnapshot::new(u, v)?,
            (Some(_), None) => {
                return Err(PlotError::UnpairedComponent {
                    time,
                    found: WindComponent::U,
                    missing: WindComponent::V,
                })
            }
            (None, Some(_)) => {
                return Err(PlotError::UnpairedComponent {
                    time,
                    found: WindComponent::V,
                    missing: WindComponent::U,
                })
            }
            (None, None) => continue,
        };
        snapshots.push(snapshot);
    }

    debug!(snapshots = snapshots.len(), "Paired U/V records");
    Ok(snapshots)
}

/// Every `stride`-th item, starting with the first.
pub fn select_stride<T>(items: Vec<T>, stride: usize) -> PlotResult<Vec<T>> {
    if stride == 0 {
        return Err(PlotError::InvalidConfig(
            "stride must be at least 1".to_string(),
        ));
    }
    Ok(items.into_iter().step_by(stride).collect())
}

/// What to do when the panels do not fill whole rows.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum LayoutPolicy {
    /// Add a partly empty last row
    #[default]
    Pad,
    /// Drop the panels of the incomplete last row
    Truncate,
    /// Refuse to plot
    Strict,
}

/// Rows and columns of the subplot grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub rows: usize,
    pub cols: usize,
    /// Panels actually drawn
    pub panels: usize,
}

impl GridLayout {
    pub fn compute(panel_count: usize, columns: usize, policy: LayoutPolicy) -> PlotResult<Self> {
        if panel_count == 0 {
            return Err(PlotError::NoPanels);
        }
        if columns == 0 {
            return Err(PlotError::InvalidConfig(
                "columns must be at least 1".to_string(),
            ));
        }

        let full_rows = panel_count / columns;
        if panel_count % columns == 0 {
            return Ok(Self {
                rows: full_rows,
                cols: columns,
                panels: panel_count,
            });
        }

        match policy {
            LayoutPolicy::Pad => Ok(Self {
                rows: full_rows + 1,
                cols: columns,
                panels: panel_count,
            }),
            LayoutPolicy::Truncate if full_rows > 0 => {
                let panels = full_rows * columns;
                warn!(
                    dropped = panel_count - panels,
                    columns, "Dropping panels of the incomplete last row"
                );
                Ok(Self {
                    rows: full_rows,
                    cols: columns,
                    panels,
                })
            }
            LayoutPolicy::Truncate | LayoutPolicy::Strict => Err(PlotError::LayoutMismatch {
                panels: panel_count,
                columns,
            }),
        }
    }

    /// Number of subplot slots, drawn or blank.
    pub fn slots(&self) -> usize {
        self.rows * self.cols
    }
}
