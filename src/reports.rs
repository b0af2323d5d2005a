// Presentation rows for the CLI reports, built from a finished rollup.
use crate::rollup::Rollup;
use crate::status::CanonicalStatus;
use crate::types::{
    Project, ProjectDrillRow, RegionLevel, RegionRollupRow, RollupSummary, StatusBreakdownRow,
};
use crate::util::{average, format_number};

/// County and sub-county rows of the aggregate tree, in tree order.
pub fn regional_summary(rollup: &Rollup) -> Vec<RegionRollupRow> {
    rollup
        .nodes
        .iter()
        .filter(|n| matches!(n.level, RegionLevel::County | RegionLevel::SubCounty))
        .map(|n| RegionRollupRow {
            region: n.region_name.clone(),
            level: n.level.to_string(),
            total_projects: n.total_projects,
            total_budget: format_number(n.total_budget, 2),
            total_paid: format_number(n.total_paid, 2),
            absorption_rate: format_number(n.absorption_rate * 100.0, 2),
            avg_progress: format_number(n.average_progress, 2),
        })
        .collect()
}

/// Project counts per canonical status across all county nodes, one row
/// per status in taxonomy order (zero rows included).
pub fn status_breakdown(rollup: &Rollup) -> Vec<StatusBreakdownRow> {
    let mut counts = vec![0usize; CanonicalStatus::ALL.len()];
    let mut total = 0usize;
    for node in rollup.nodes_at(RegionLevel::County) {
        for (idx, status) in CanonicalStatus::ALL.iter().enumerate() {
            let count = node.status_breakdown.get(status).copied().unwrap_or(0);
            counts[idx] += count;
            total += count;
        }
    }
    CanonicalStatus::ALL
        .iter()
        .zip(counts)
        .map(|(status, projects)| {
            let share = if total > 0 {
                projects as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            StatusBreakdownRow {
                status: status.label().to_string(),
                projects,
                share: format_number(share, 2),
            }
        })
        .collect()
}

/// Table rows for a drill-down result.
pub fn drill_rows(projects: &[&Project], region_name: &str) -> Vec<ProjectDrillRow> {
    projects
        .iter()
        .map(|p| ProjectDrillRow {
            project: p.name.clone(),
            department: p.department_id.clone(),
            region: region_name.to_string(),
            status: CanonicalStatus::normalize(&p.status).label().to_string(),
            budget: format_number(p.allocated_budget, 2),
            paid: format_number(p.amount_paid, 2),
            progress: format_number(p.percent_completed, 2),
        })
        .collect()
}

/// Overall figures for `summary.json`, including the unknown-region count
/// so data-quality gaps stay visible.
pub fn summary(projects: &[Project], rollup: &Rollup) -> RollupSummary {
    let total_budget: f64 = projects.iter().map(|p| p.allocated_budget).sum();
    let total_paid: f64 = projects.iter().map(|p| p.amount_paid).sum();
    let progress: Vec<f64> = projects.iter().map(|p| p.percent_completed).collect();
    RollupSummary {
        total_projects: projects.len(),
        total_regions: rollup.nodes.len(),
        total_budget,
        total_paid,
        overall_absorption_rate: if total_budget > 0.0 {
            total_paid / total_budget
        } else {
            0.0
        },
        average_progress: average(&progress),
        unknown_region_projects: rollup.unknown.total_projects,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::RegionIndex;
    use crate::rollup::aggregate;
    use crate::types::Region;

    fn fixture() -> (Vec<Project>, RegionIndex) {
        let index = RegionIndex::build(vec![
            Region {
                id: "kitui".into(),
                name: "Kitui".into(),
                level: RegionLevel::County,
                parent_id: None,
            },
            Region {
                id: "mwingi".into(),
                name: "Mwingi".into(),
                level: RegionLevel::SubCounty,
                parent_id: Some("kitui".into()),
            },
        ])
        .unwrap();
        let projects = vec![
            Project {
                id: "p1".into(),
                name: "Borehole".into(),
                department_id: "water".into(),
                region_leaf_id: Some("mwingi".into()),
                status: "on-going".into(),
                allocated_budget: 1_000.0,
                amount_paid: 500.0,
                percent_completed: 50.0,
                start_date: None,
                end_date: None,
            },
            Project {
                id: "p2".into(),
                name: "Lost".into(),
                department_id: "water".into(),
                region_leaf_id: None,
                status: "ongoing".into(),
                allocated_budget: 200.0,
                amount_paid: 0.0,
                percent_completed: 0.0,
                start_date: None,
                end_date: None,
            },
        ];
        (projects, index)
    }

    #[test]
    fn summary_reports_unknown_count_and_overall_rate() {
        let (projects, index) = fixture();
        let rollup = aggregate(&projects, &index);
        let s = summary(&projects, &rollup);
        assert_eq!(s.total_projects, 2);
        assert_eq!(s.unknown_region_projects, 1);
        assert_eq!(s.overall_absorption_rate, 500.0 / 1_200.0);
    }

    #[test]
    fn breakdown_covers_all_statuses_in_order() {
        let (projects, index) = fixture();
        let rollup = aggregate(&projects, &index);
        let rows = status_breakdown(&rollup);
        assert_eq!(rows.len(), 7);
        assert_eq!(rows[1].status, "Ongoing");
        assert_eq!(rows[1].projects, 1);
        assert_eq!(rows[0].status, "Completed");
        assert_eq!(rows[0].projects, 0);
    }

    #[test]
    fn regional_summary_keeps_tree_order() {
        let (projects, index) = fixture();
        let rollup = aggregate(&projects, &index);
        let rows = regional_summary(&rollup);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].region, "Kitui");
        assert_eq!(rows[0].level, "County");
        assert_eq!(rows[1].region, "Mwingi");
        assert_eq!(rows[0].absorption_rate, "50.00");
    }
}
