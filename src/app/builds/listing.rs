//! Build history and build detail
//!
//! Fetching is separate from rendering: the render functions are pure and
//! take the terminal width as a parameter.

use chrono::{DateTime, Local, Utc};
use crossterm::style::Stylize;
use tracing::debug;

use crate::app::builds::PackageContext;
use crate::app::models::{BuildRecord, BuildStatus};
use crate::auth::Session;
use crate::constants::listing;
use crate::errors::{Result, ValidationError};

/// Most recent builds first, at most `limit`
pub async fn list_builds(
    ctx: &PackageContext<'_>,
    session: &Session,
    limit: usize,
) -> Result<Vec<BuildRecord>> {
    let mut builds = ctx.service.list_builds(session, ctx.app_id).await?;
    builds.truncate(limit);
    Ok(builds)
}

/// The requested build id, or the most recent build's id
pub async fn resolve_build_id(
    ctx: &PackageContext<'_>,
    session: &Session,
    requested: Option<&str>,
) -> Result<String> {
    if let Some(id) = requested.map(str::trim).filter(|id| !id.is_empty()) {
        return Ok(id.to_string());
    }

    let builds = ctx.service.list_builds(session, ctx.app_id).await?;
    let latest = builds.into_iter().next().ok_or(ValidationError::NoBuilds)?;
    debug!("No build id given, using most recent build {}", latest.id);
    Ok(latest.id)
}

/// Full record of one build, including its output
pub async fn build_info(
    ctx: &PackageContext<'_>,
    session: &Session,
    build_id: Option<&str>,
) -> Result<BuildRecord> {
    let id = resolve_build_id(ctx, session, build_id).await?;
    ctx.service.get_build(session, ctx.app_id, &id, true).await
}

/// Table columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    Status,
    Platform,
    Mode,
    Created,
    Completed,
}

impl Column {
    fn header(&self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Status => "status",
            Column::Platform => "platform",
            Column::Mode => "mode",
            Column::Created => "created",
            Column::Completed => "completed",
        }
    }

    fn cell(&self, build: &BuildRecord) -> String {
        match self {
            Column::Id => build.id.clone(),
            Column::Status => build.status.to_string(),
            Column::Platform => build.platform.to_string(),
            Column::Mode => build.mode.to_string(),
            Column::Created => format_date(&build.created),
            Column::Completed => build.completed.as_ref().map(format_date).unwrap_or_default(),
        }
    }
}

/// Columns that fit a terminal `width` characters wide
pub fn select_columns(width: u16) -> Vec<Column> {
    let mut columns = vec![Column::Id, Column::Status, Column::Platform, Column::Mode];
    if width > listing::CREATED_COLUMN_MIN_WIDTH {
        columns.push(Column::Created);
    }
    if width > listing::COMPLETED_COLUMN_MIN_WIDTH {
        columns.push(Column::Completed);
    }
    columns
}

/// How tables are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub width: u16,
    pub color: bool,
}

impl RenderOptions {
    /// Current terminal width; colour only when stdout is a terminal
    pub fn detect() -> Self {
        let width = crossterm::terminal::size()
            .map(|(w, _)| w)
            .unwrap_or(listing::FALLBACK_TERMINAL_WIDTH);
        Self {
            width,
            color: atty::is(atty::Stream::Stdout),
        }
    }
}

fn format_date(date: &DateTime<Utc>) -> String {
    date.with_timezone(&Local)
        .format("%Y-%m-%d at %H:%M:%S")
        .to_string()
}

/// Pad a status cell, then colour success/failure
fn format_status(status: BuildStatus, width: usize, color: bool) -> String {
    let padded = format!("{:<width$}", status.as_str(), width = width);
    if !color {
        return padded;
    }
    match status {
        BuildStatus::Success => padded.green().to_string(),
        BuildStatus::Failed => padded.red().to_string(),
        _ => padded,
    }
}

/// Build history as a table, or guidance when there is none
pub fn render_build_list(builds: &[BuildRecord], options: RenderOptions) -> String {
    if builds.is_empty() {
        return "No builds yet. Start one with 'cloudpack package build <android|ios>'.\n"
            .to_string();
    }

    let columns = select_columns(options.width);
    let rows: Vec<Vec<String>> = builds
        .iter()
        .map(|build| columns.iter().map(|c| c.cell(build)).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .max()
                .unwrap_or(0)
                .max(column.header().len())
        })
        .collect();

    let mut out = String::new();
    out.push('\n');

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(column, width)| format!("{:<width$}", column.header(), width = *width))
        .collect();
    out.push_str(header.join("  ").trim_end());
    out.push('\n');

    let separator_width = widths.iter().sum::<usize>() + 2 * (widths.len() - 1);
    out.push_str(&"─".repeat(separator_width));
    out.push('\n');

    for (build, row) in builds.iter().zip(&rows) {
        let cells: Vec<String> = columns
            .iter()
            .zip(row)
            .zip(&widths)
            .map(|((column, cell), width)| match column {
                Column::Status => format_status(build.status, *width, options.color),
                _ => format!("{:<width$}", cell, width = *width),
            })
            .collect();
        out.push_str(cells.join("  ").trim_end());
        out.push('\n');
    }

    out.push_str(&format!(
        "\nShowing {} of your latest builds.\n",
        builds.len()
    ));
    out
}

/// One build as a vertical key/value table, followed by its output
pub fn render_build_detail(build: &BuildRecord, color: bool) -> String {
    let mut pairs: Vec<(&str, String)> = vec![
        ("id", build.id.clone()),
        ("status", String::new()),
        ("platform", build.platform.to_string()),
        ("mode", build.mode.to_string()),
        ("created", format_date(&build.created)),
        (
            "completed",
            build.completed.as_ref().map(format_date).unwrap_or_default(),
        ),
    ];
    if let Some(name) = &build.name {
        pairs.push(("name", name.clone()));
    }
    if let Some(url) = &build.url {
        pairs.push(("url", url.clone()));
    }

    let key_width = pairs.iter().map(|(k, _)| k.len()).max().unwrap_or(0);

    let mut out = String::new();
    out.push('\n');
    for (key, value) in &pairs {
        let value = if *key == "status" {
            format_status(build.status, 0, color)
        } else {
            value.clone()
        };
        out.push_str(format!("{:<width$}  {}", key, value, width = key_width).trim_end());
        out.push('\n');
    }

    if let Some(output) = build.output.as_deref().filter(|o| !o.trim().is_empty()) {
        out.push_str("\nBuild output:\n");
        out.push_str(&"─".repeat(13));
        out.push('\n');
        out.push_str(output.trim_end());
        out.push('\n');
    }

    out
}
