//! One complete plotting run: GRIB file in, PNG out.

use std::path::PathBuf;
use std::time::Instant;

use chrono::NaiveDateTime;
use rayon::prelude::*;
use renderer::{map, png, Coastlines, Figure, TextRenderer};
use tracing::{debug, info, warn};
use wind_common::DataStamp;

use crate::config::Config;
use crate::error::{PlotError, PlotResult};
use crate::loader::extract_records;
use crate::panel::{render_panel, PanelOptions};
use crate::snapshot::{pair_snapshots, reference_time, select_stride, GridLayout, WindSnapshot};

/// What a run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub output: PathBuf,
    pub panels: usize,
    pub rows: usize,
    pub cols: usize,
    pub reference: NaiveDateTime,
    pub stamp: DataStamp,
    /// Size of the written PNG
    pub bytes: usize,
}

/// Read `config.input`, plot every selected snapshot and write the PNG.
pub fn run(config: &Config) -> PlotResult<RunSummary> {
    config.validate()?;
    let start = Instant::now();

    let records = extract_records(&config.input, config.diagnostics)?;
    let first = records.first().ok_or(PlotError::NoPanels)?;
    let stamp = first.stamp;
    let reference = reference_time(first)?;
    info!(records = records.len(), %reference, "Loaded wind records");

    let snapshots = pair_snapshots(records)?;
    let mut snapshots = select_stride(snapshots, config.stride)?;
    let layout = GridLayout::compute(snapshots.len(), config.columns, config.layout)?;
    snapshots.truncate(layout.panels);

    let summary = plot_snapshots(config, &snapshots, layout, stamp, reference)?;
    info!(
        output = %summary.output.display(),
        panels = summary.panels,
        rows = summary.rows,
        cols = summary.cols,
        bytes = summary.bytes,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Wrote wind map"
    );
    Ok(summary)
}

/// Lay out, render and save already paired snapshots.
pub fn plot_snapshots(
    config: &Config,
    snapshots: &[WindSnapshot],
    layout: GridLayout,
    stamp: DataStamp,
    reference: NaiveDateTime,
) -> PlotResult<RunSummary> {
    let mut figure = Figure::new(
        config.panel_width_in * layout.cols as f64,
        config.panel_height_in * layout.rows as f64,
        config.dpi,
    )?;
    let axes = figure.subplots(layout.rows, layout.cols);
    debug!(
        rows = layout.rows,
        cols = layout.cols,
        size = ?figure.size_pixels(),
        "Created figure"
    );

    let text = TextRenderer::load(config.font.as_deref())?;
    let coastlines = match &config.coastlines {
        Some(path) => {
            let coastlines = Coastlines::load(path, config.area_thresh_km2)?;
            if coastlines.is_empty() {
                warn!(path = %path.display(), "Coastline file holds no polygons above the area threshold");
            }
            coastlines
        }
        None => Coastlines::embedded(config.area_thresh_km2)?,
    };

    let options = PanelOptions {
        units: config.units,
        step_hours: config.step_hours,
        barbs: &config.barbs,
        map: &config.map,
        text: &text,
        coastlines: &coastlines,
    };

    // Slots past the last snapshot stay blank
    let panels: Vec<_> = axes
        .par_iter()
        .zip(snapshots.par_iter())
        .map(|(ax, snapshot)| render_panel(ax, snapshot, ax.index, config.stride, reference, &options))
        .collect();
    for panel in panels {
        figure.composite(&panel?);
    }

    let stem = stamp.output_stem();
    map::draw_suptitle(&mut figure, &stem, &config.map, &text)?;

    std::fs::create_dir_all(&config.output_dir).map_err(|source| PlotError::Io {
        path: config.output_dir.clone(),
        source,
    })?;
    let output = config.output_path(&stem);
    let pixmap = figure.into_pixmap();
    let bytes = png::write_png(&output, &pixmap, config.dpi)?;

    Ok(RunSummary {
        output,
        panels: snapshots.len().min(axes.len()),
        rows: layout.rows,
        cols: layout.cols,
        reference,
        stamp,
        bytes,
    })
}
