use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tabled::Tabled;

use crate::status::CanonicalStatus;

/// The four fixed levels of the geographic hierarchy, ordered from the
/// root (`County`) down to the most specific (`Village`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RegionLevel {
    County,
    SubCounty,
    Ward,
    Village,
}

impl RegionLevel {
    pub const ALL: [RegionLevel; 4] = [
        RegionLevel::County,
        RegionLevel::SubCounty,
        RegionLevel::Ward,
        RegionLevel::Village,
    ];

    /// The level immediately above this one; `None` for `County`.
    pub fn parent(self) -> Option<RegionLevel> {
        match self {
            RegionLevel::County => None,
            RegionLevel::SubCounty => Some(RegionLevel::County),
            RegionLevel::Ward => Some(RegionLevel::SubCounty),
            RegionLevel::Village => Some(RegionLevel::Ward),
        }
    }

    /// Parse the level names found in reference CSVs. Forgiving about
    /// hyphenation and spacing, like the rest of the CSV handling.
    pub fn parse(s: &str) -> Option<RegionLevel> {
        match s.trim().to_lowercase().as_str() {
            "county" => Some(RegionLevel::County),
            "sub-county" | "subcounty" | "sub county" => Some(RegionLevel::SubCounty),
            "ward" => Some(RegionLevel::Ward),
            "village" => Some(RegionLevel::Village),
            _ => None,
        }
    }
}

impl fmt::Display for RegionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RegionLevel::County => "County",
            RegionLevel::SubCounty => "Sub-County",
            RegionLevel::Ward => "Ward",
            RegionLevel::Village => "Village",
        };
        f.write_str(s)
    }
}

/// One node of the geographic reference data. Every non-County region has
/// exactly one parent at the next level up; counties are roots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: String,
    pub name: String,
    pub level: RegionLevel,
    pub parent_id: Option<String>,
}

/// An immutable project snapshot as supplied by the external query service.
/// `region_leaf_id` points at the most specific region the project is
/// tagged with (commonly a ward or village) and may be absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub department_id: String,
    pub region_leaf_id: Option<String>,
    pub status: String,
    pub allocated_budget: f64,
    pub amount_paid: f64,
    pub percent_completed: f64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Derived per-region aggregate. Recomputed on every rollup pass; a node's
/// totals are its direct project contributions plus the sums of its
/// children, so parent and child totals always reconcile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateNode {
    pub region_id: String,
    pub region_name: String,
    pub level: RegionLevel,
    pub total_projects: usize,
    pub total_budget: f64,
    pub total_paid: f64,
    /// `total_paid / total_budget` when the budget is positive, else `0`.
    pub absorption_rate: f64,
    /// Mean `percent_completed` over contributing projects, `0` with none.
    pub average_progress: f64,
    /// Counts for all seven canonical statuses, zeros included, so the
    /// rendered legend is stable across passes.
    pub status_breakdown: BTreeMap<CanonicalStatus, usize>,
}

/// Inclusive date window on project start dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// A partial filter selection as held by the UI. Region fields are kept
/// mutually consistent by the resolver: a child id is only ever present
/// when it descends from every selected ancestor.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterSelection {
    pub county_id: Option<String>,
    pub sub_county_id: Option<String>,
    pub ward_id: Option<String>,
    pub village_id: Option<String>,
    pub status: Option<CanonicalStatus>,
    pub department_id: Option<String>,
    pub date_range: Option<DateRange>,
}

impl FilterSelection {
    /// The region id selected at `level`, if any.
    pub fn region_at(&self, level: RegionLevel) -> Option<&str> {
        match level {
            RegionLevel::County => self.county_id.as_deref(),
            RegionLevel::SubCounty => self.sub_county_id.as_deref(),
            RegionLevel::Ward => self.ward_id.as_deref(),
            RegionLevel::Village => self.village_id.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RawRegionRow {
    #[serde(rename = "RegionId")]
    pub region_id: Option<String>,
    #[serde(rename = "RegionName")]
    pub region_name: Option<String>,
    #[serde(rename = "Level")]
    pub level: Option<String>,
    #[serde(rename = "ParentId")]
    pub parent_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawProjectRow {
    #[serde(rename = "ProjectId")]
    pub project_id: Option<String>,
    #[serde(rename = "ProjectName")]
    pub project_name: Option<String>,
    #[serde(rename = "Department")]
    pub department: Option<String>,
    #[serde(rename = "RegionId")]
    pub region_id: Option<String>,
    #[serde(rename = "Status")]
    pub status: Option<String>,
    #[serde(rename = "AllocatedBudget")]
    pub allocated_budget: Option<String>,
    #[serde(rename = "AmountPaid")]
    pub amount_paid: Option<String>,
    #[serde(rename = "PercentCompleted")]
    pub percent_completed: Option<String>,
    #[serde(rename = "StartDate")]
    pub start_date: Option<String>,
    #[serde(rename = "EndDate")]
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RegionRollupRow {
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "Level")]
    #[tabled(rename = "Level")]
    pub level: String,
    #[serde(rename = "TotalProjects")]
    #[tabled(rename = "TotalProjects")]
    pub total_projects: usize,
    #[serde(rename = "TotalBudget")]
    #[tabled(rename = "TotalBudget")]
    pub total_budget: String,
    #[serde(rename = "TotalPaid")]
    #[tabled(rename = "TotalPaid")]
    pub total_paid: String,
    #[serde(rename = "AbsorptionRate")]
    #[tabled(rename = "AbsorptionRate")]
    pub absorption_rate: String,
    #[serde(rename = "AvgProgress")]
    #[tabled(rename = "AvgProgress")]
    pub avg_progress: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct StatusBreakdownRow {
    #[serde(rename = "Status")]
    #[tabled(rename = "Status")]
    pub status: String,
    #[serde(rename = "Projects")]
    #[tabled(rename = "Projects")]
    pub projects: usize,
    #[serde(rename = "Share")]
    #[tabled(rename = "Share")]
    pub share: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ProjectDrillRow {
    #[serde(rename = "Project")]
    #[tabled(rename = "Project")]
    pub project: String,
    #[serde(rename = "Department")]
    #[tabled(rename = "Department")]
    pub department: String,
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "Status")]
    #[tabled(rename = "Status")]
    pub status: String,
    #[serde(rename = "Budget")]
    #[tabled(rename = "Budget")]
    pub budget: String,
    #[serde(rename = "Paid")]
    #[tabled(rename = "Paid")]
    pub paid: String,
    #[serde(rename = "Progress")]
    #[tabled(rename = "Progress")]
    pub progress: String,
}

#[derive(Debug, Serialize)]
pub struct RollupSummary {
    pub total_projects: usize,
    pub total_regions: usize,
    pub total_budget: f64,
    pub total_paid: f64,
    pub overall_absorption_rate: f64,
    pub average_progress: f64,
    pub unknown_region_projects: usize,
}
