// CSV ingestion for the two reference files the CLI stands in for the
// external services with: the region reference set and the project rows.
//
// Parsing is forgiving: rows that cannot be made sense of are skipped and
// counted, missing financial fields default to zero and are counted, and
// nothing is silently dropped.
use crate::types::{Project, RawProjectRow, RawRegionRow, Region, RegionLevel};
use crate::util::{parse_date_safe, parse_f64_safe};
use csv::ReaderBuilder;
use std::error::Error;
use tracing::warn;

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub skipped_rows: usize,
    /// Budget/paid fields that were absent or negative and defaulted to 0.
    pub defaulted_financials: usize,
    /// Percent-completed values clamped into [0, 100].
    pub clamped_progress: usize,
}

/// Load the region reference CSV. Rows missing an id, a name, or a
/// recognizable level are skipped and counted; hierarchy validation is
/// left to `RegionIndex::build`.
pub fn load_regions(path: &str) -> Result<(Vec<Region>, LoadReport), Box<dyn Error>> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let mut report = LoadReport::default();
    let mut regions: Vec<Region> = Vec::new();

    for result in rdr.deserialize::<RawRegionRow>() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(_) => {
                report.skipped_rows += 1;
                continue;
            }
        };

        let id = match row.region_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                report.skipped_rows += 1;
                continue;
            }
        };
        let name = match row.region_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                report.skipped_rows += 1;
                continue;
            }
        };
        let level = match row.level.as_deref().and_then(RegionLevel::parse) {
            Some(level) => level,
            None => {
                warn!(region = %id, "unrecognized region level; skipping row");
                report.skipped_rows += 1;
                continue;
            }
        };
        let parent_id = row
            .parent_id
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        regions.push(Region {
            id,
            name,
            level,
            parent_id,
        });
    }

    report.loaded_rows = regions.len();
    Ok((regions, report))
}

/// Load the project CSV. Only a project id is mandatory; everything else
/// degrades gracefully so data-quality problems show up as counts in the
/// report instead of lost rows.
pub fn load_projects(path: &str) -> Result<(Vec<Project>, LoadReport), Box<dyn Error>> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let mut report = LoadReport::default();
    let mut projects: Vec<Project> = Vec::new();

    for result in rdr.deserialize::<RawProjectRow>() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(_) => {
                report.skipped_rows += 1;
                continue;
            }
        };

        let id = match row.project_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                report.skipped_rows += 1;
                continue;
            }
        };
        let name = row
            .project_name
            .unwrap_or_else(|| "Unnamed Project".to_string())
            .trim()
            .to_string();
        let department_id = row
            .department
            .unwrap_or_else(|| "Unknown".to_string())
            .trim()
            .to_string();
        let region_leaf_id = row
            .region_id
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);
        let status = row.status.unwrap_or_default().trim().to_string();

        let allocated_budget = match parse_f64_safe(row.allocated_budget.as_deref()) {
            Some(v) if v >= 0.0 => v,
            _ => {
                report.defaulted_financials += 1;
                0.0
            }
        };
        let amount_paid = match parse_f64_safe(row.amount_paid.as_deref()) {
            Some(v) if v >= 0.0 => v,
            _ => {
                report.defaulted_financials += 1;
                0.0
            }
        };
        let percent_completed = match parse_f64_safe(row.percent_completed.as_deref()) {
            Some(v) if (0.0..=100.0).contains(&v) => v,
            Some(v) => {
                warn!(project = %id, value = v, "percent completed out of range; clamping");
                report.clamped_progress += 1;
                v.clamp(0.0, 100.0)
            }
            None => {
                report.clamped_progress += 1;
                0.0
            }
        };

        projects.push(Project {
            id,
            name,
            department_id,
            region_leaf_id,
            status,
            allocated_budget,
            amount_paid,
            percent_completed,
            start_date: parse_date_safe(row.start_date.as_deref()),
            end_date: parse_date_safe(row.end_date.as_deref()),
        });
    }

    report.loaded_rows = projects.len();
    Ok((projects, report))
}
