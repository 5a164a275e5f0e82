//! Tabular views of analysis results, built as polars DataFrames.

use crate::calculations::{CriticalPath, ScheduledContainer};
use crate::duration::Hours;
use crate::matrix::DependencyMatrixEntry;
use crate::resource::ResourceAllocation;
use crate::tidp::{Tidp, TidpSummary};
use polars::prelude::*;

fn hours(value: Hours) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn schedule_frame(rows: &[ScheduledContainer]) -> PolarsResult<DataFrame> {
    let columns: Vec<Column> = vec![
        Series::new(
            PlSmallStr::from_static("id"),
            rows.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            PlSmallStr::from_static("name"),
            rows.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            PlSmallStr::from_static("team"),
            rows.iter().map(|r| r.tidp_name.as_str()).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            PlSmallStr::from_static("duration_h"),
            rows.iter().map(|r| hours(r.duration)).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            PlSmallStr::from_static("es"),
            rows.iter().map(|r| hours(r.es)).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            PlSmallStr::from_static("ef"),
            rows.iter().map(|r| hours(r.ef)).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            PlSmallStr::from_static("ls"),
            rows.iter().map(|r| hours(r.ls)).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            PlSmallStr::from_static("lf"),
            rows.iter().map(|r| hours(r.lf)).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            PlSmallStr::from_static("total_float"),
            rows.iter().map(|r| hours(r.total_float)).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            PlSmallStr::from_static("is_critical"),
            rows.iter().map(ScheduledContainer::is_critical).collect::<Vec<_>>(),
        )
        .into_column(),
    ];
    DataFrame::new(columns)
}

/// Every scheduled container in topological order.
pub fn schedule_to_dataframe(path: &CriticalPath) -> PolarsResult<DataFrame> {
    schedule_frame(&path.schedule)
}

/// Critical containers only, ordered by early start.
pub fn critical_path_to_dataframe(path: &CriticalPath) -> PolarsResult<DataFrame> {
    schedule_frame(&path.entries)
}

pub fn dependency_matrix_to_dataframe(
    entries: &[DependencyMatrixEntry],
) -> PolarsResult<DataFrame> {
    let columns: Vec<Column> = vec![
        Series::new(
            PlSmallStr::from_static("from_team"),
            entries.iter().map(|e| e.from.tidp_name.as_str()).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            PlSmallStr::from_static("from_container"),
            entries.iter().map(|e| e.from.container_id.as_str()).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            PlSmallStr::from_static("to_team"),
            entries.iter().map(|e| e.to.tidp_name.as_str()).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            PlSmallStr::from_static("to_container"),
            entries.iter().map(|e| e.to.container_id.as_str()).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            PlSmallStr::from_static("to_name"),
            entries.iter().map(|e| e.to.container_name.as_str()).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            PlSmallStr::from_static("critical"),
            entries.iter().map(|e| e.is_on_critical_path).collect::<Vec<_>>(),
        )
        .into_column(),
    ];
    DataFrame::new(columns)
}

/// One row per discipline, alphabetical.
pub fn resources_to_dataframe(allocation: &ResourceAllocation) -> PolarsResult<DataFrame> {
    let disciplines: Vec<&str> = allocation.by_discipline.keys().map(String::as_str).collect();
    let allocations: Vec<_> = allocation.by_discipline.values().collect();
    let columns: Vec<Column> = vec![
        Series::new(PlSmallStr::from_static("discipline"), disciplines).into_column(),
        Series::new(
            PlSmallStr::from_static("teams"),
            allocations.iter().map(|a| a.teams as i64).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            PlSmallStr::from_static("containers"),
            allocations.iter().map(|a| a.containers as i64).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            PlSmallStr::from_static("estimated_h"),
            allocations.iter().map(|a| hours(a.estimated_hours)).collect::<Vec<_>>(),
        )
        .into_column(),
    ];
    DataFrame::new(columns)
}

pub fn tidp_summaries_to_dataframe(tidps: &[Tidp]) -> PolarsResult<DataFrame> {
    let summaries: Vec<TidpSummary> = tidps.iter().map(TidpSummary::from_tidp).collect();
    let columns: Vec<Column> = vec![
        Series::new(
            PlSmallStr::from_static("id"),
            summaries.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            PlSmallStr::from_static("team"),
            summaries.iter().map(|s| s.team_name.as_str()).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            PlSmallStr::from_static("discipline"),
            summaries.iter().map(|s| s.discipline.as_str()).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            PlSmallStr::from_static("containers"),
            summaries.iter().map(|s| s.container_count as i64).collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            PlSmallStr::from_static("estimated_h"),
            summaries
                .iter()
                .map(|s| hours(s.total_estimated_hours))
                .collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            PlSmallStr::from_static("milestones"),
            summaries
                .iter()
                .map(|s| s.milestones.join("; "))
                .collect::<Vec<_>>(),
        )
        .into_column(),
        Series::new(
            PlSmallStr::from_static("status"),
            summaries.iter().map(|s| s.status.as_str()).collect::<Vec<_>>(),
        )
        .into_column(),
    ];
    DataFrame::new(columns)
}

fn cell_text(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::Boolean(true) => "yes".to_string(),
        AnyValue::Boolean(false) => String::new(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

/// Boxed ASCII table with a header row, one line per DataFrame row.
pub fn render_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let cells: Vec<Vec<String>> = (0..df.height())
        .map(|row_idx| {
            columns
                .iter()
                .map(|col| col.get(row_idx).map(|v| cell_text(&v)).unwrap_or_default())
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = names.iter().map(|n| n.chars().count()).collect();
    for row in &cells {
        for (ci, cell) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(cell.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_row = |values: &[String]| {
        let mut line = String::from("|");
        for (ci, value) in values.iter().enumerate() {
            let pad = widths[ci].saturating_sub(value.chars().count());
            line.push(' ');
            line.push_str(value);
            line.push_str(&" ".repeat(pad));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&names));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &cells {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}
