// Rollup aggregation.
//
// One pass over a materialized project snapshot produces a fresh aggregate
// tree: leaf contributions are accumulated per region, then sums are
// propagated upward level by level. Parents are never recomputed from the
// project list, so parent and child totals reconcile by construction.
use std::collections::BTreeMap;
use tracing::warn;

use crate::region::RegionIndex;
use crate::status::CanonicalStatus;
use crate::types::{AggregateNode, Project, RegionLevel};

/// Projects whose `region_leaf_id` is absent or does not resolve in the
/// current index. Surfaced as a data-quality metric, never silently
/// dropped; these projects appear in no named-region node.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct UnknownBucket {
    pub total_projects: usize,
    pub total_budget: f64,
    pub total_paid: f64,
}

/// Result of one aggregation pass: one node per region in the index plus
/// the unknown-region bucket. Treated as immutable by consumers; a new
/// pass builds a new tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Rollup {
    /// Counties first, then each deeper level sorted by region name.
    pub nodes: Vec<AggregateNode>,
    pub unknown: UnknownBucket,
}

impl Rollup {
    pub fn node(&self, region_id: &str) -> Option<&AggregateNode> {
        self.nodes.iter().find(|n| n.region_id == region_id)
    }

    pub fn nodes_at(&self, level: RegionLevel) -> impl Iterator<Item = &AggregateNode> {
        self.nodes.iter().filter(move |n| n.level == level)
    }
}

#[derive(Debug, Clone, Default)]
struct Acc {
    projects: usize,
    budget: f64,
    paid: f64,
    progress_sum: f64,
    statuses: BTreeMap<CanonicalStatus, usize>,
}

impl Acc {
    fn add_project(&mut self, p: &Project, status: CanonicalStatus) {
        self.projects += 1;
        self.budget += p.allocated_budget;
        self.paid += p.amount_paid;
        self.progress_sum += p.percent_completed;
        *self.statuses.entry(status).or_insert(0) += 1;
    }

    fn merge_child(&mut self, child: &Acc) {
        self.projects += child.projects;
        self.budget += child.budget;
        self.paid += child.paid;
        self.progress_sum += child.progress_sum;
        for (status, count) in &child.statuses {
            *self.statuses.entry(*status).or_insert(0) += count;
        }
    }
}

/// Aggregate a project snapshot over the region hierarchy.
///
/// Every region in the index gets a node, zero-project regions included.
/// A project tagged above leaf level counts as a direct contribution of
/// that region. Deterministic: identical inputs give identical trees, with
/// no dependence on hash iteration order.
pub fn aggregate(projects: &[Project], index: &RegionIndex) -> Rollup {
    let mut accs: BTreeMap<String, Acc> = index
        .regions()
        .map(|r| (r.id.clone(), Acc::default()))
        .collect();
    let mut unknown = UnknownBucket::default();

    for project in projects {
        let status = CanonicalStatus::normalize(&project.status);
        let resolved = project
            .region_leaf_id
            .as_deref()
            .and_then(|id| index.region(id));
        match resolved {
            Some(region) => {
                if let Some(acc) = accs.get_mut(&region.id) {
                    acc.add_project(project, status);
                }
            }
            None => {
                warn!(
                    project = %project.id,
                    leaf = project.region_leaf_id.as_deref().unwrap_or("<none>"),
                    "project region does not resolve; counting in the unknown bucket"
                );
                unknown.total_projects += 1;
                unknown.total_budget += project.allocated_budget;
                unknown.total_paid += project.amount_paid;
            }
        }
    }

    // Propagate sums upward, deepest level first. After the village pass a
    // ward's accumulator already holds its whole subtree, so each level
    // only merges its direct children.
    for level in [RegionLevel::Village, RegionLevel::Ward, RegionLevel::SubCounty] {
        for region in index.regions_at(level) {
            let Some(parent_id) = region.parent_id.clone() else {
                continue;
            };
            let child = match accs.get(&region.id) {
                Some(acc) => acc.clone(),
                None => continue,
            };
            if let Some(parent) = accs.get_mut(&parent_id) {
                parent.merge_child(&child);
            }
        }
    }

    let nodes = index
        .regions()
        .map(|region| {
            let acc = &accs[&region.id];
            let absorption_rate = if acc.budget > 0.0 {
                acc.paid / acc.budget
            } else {
                0.0
            };
            let average_progress = if acc.projects > 0 {
                acc.progress_sum / acc.projects as f64
            } else {
                0.0
            };
            let mut status_breakdown = BTreeMap::new();
            for status in CanonicalStatus::ALL {
                let count = acc.statuses.get(&status).copied().unwrap_or(0);
                status_breakdown.insert(status, count);
            }
            AggregateNode {
                region_id: region.id.clone(),
                region_name: region.name.clone(),
                level: region.level,
                total_projects: acc.projects,
                total_budget: acc.budget,
                total_paid: acc.paid,
                absorption_rate,
                average_progress,
                status_breakdown,
            }
        })
        .collect();

    Rollup { nodes, unknown }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Region;

    fn region(id: &str, name: &str, level: RegionLevel, parent: Option<&str>) -> Region {
        Region {
            id: id.to_string(),
            name: name.to_string(),
            level,
            parent_id: parent.map(str::to_string),
        }
    }

    fn project(id: &str, leaf: Option<&str>, status: &str, budget: f64, paid: f64, progress: f64) -> Project {
        Project {
            id: id.to_string(),
            name: format!("Project {id}"),
            department_id: "water".to_string(),
            region_leaf_id: leaf.map(str::to_string),
            status: status.to_string(),
            allocated_budget: budget,
            amount_paid: paid,
            percent_completed: progress,
            start_date: None,
            end_date: None,
        }
    }

    fn single_chain_index() -> RegionIndex {
        RegionIndex::build(vec![
            region("kitui", "Kitui", RegionLevel::County, None),
            region("mwingi", "Mwingi", RegionLevel::SubCounty, Some("kitui")),
            region("central", "Central", RegionLevel::Ward, Some("mwingi")),
        ])
        .unwrap()
    }

    #[test]
    fn rolls_leaf_totals_up_unchanged_through_single_chains() {
        let index = single_chain_index();
        let projects = vec![
            project("p1", Some("central"), "on-going", 1_000_000.0, 250_000.0, 40.0),
            project("p2", Some("central"), "Completed", 500_000.0, 500_000.0, 100.0),
        ];
        let rollup = aggregate(&projects, &index);

        for id in ["central", "mwingi", "kitui"] {
            let node = rollup.node(id).unwrap();
            assert_eq!(node.total_projects, 2, "node {id}");
            assert_eq!(node.total_budget, 1_500_000.0);
            assert_eq!(node.total_paid, 750_000.0);
            assert_eq!(node.absorption_rate, 0.5);
            assert_eq!(node.average_progress, 70.0);
            assert_eq!(node.status_breakdown[&CanonicalStatus::Ongoing], 1);
            assert_eq!(node.status_breakdown[&CanonicalStatus::Completed], 1);
            assert_eq!(node.status_breakdown[&CanonicalStatus::Other], 0);
        }
        assert_eq!(rollup.unknown.total_projects, 0);
    }

    #[test]
    fn every_region_gets_a_node_even_without_projects() {
        let index = single_chain_index();
        let rollup = aggregate(&[], &index);
        assert_eq!(rollup.nodes.len(), 3);
        for node in &rollup.nodes {
            assert_eq!(node.total_projects, 0);
            assert_eq!(node.absorption_rate, 0.0);
            assert_eq!(node.average_progress, 0.0);
            assert!(node.absorption_rate.is_finite());
        }
    }

    #[test]
    fn unresolved_regions_land_in_the_unknown_bucket() {
        let index = single_chain_index();
        let projects = vec![
            project("p1", Some("central"), "ongoing", 100.0, 10.0, 5.0),
            project("p2", Some("nowhere"), "ongoing", 200.0, 20.0, 5.0),
            project("p3", None, "ongoing", 300.0, 30.0, 5.0),
        ];
        let rollup = aggregate(&projects, &index);

        assert_eq!(rollup.unknown.total_projects, 2);
        assert_eq!(rollup.unknown.total_budget, 500.0);
        assert_eq!(rollup.unknown.total_paid, 50.0);
        // The unknown rows appear in no named node.
        assert_eq!(rollup.node("kitui").unwrap().total_projects, 1);
    }

    #[test]
    fn zero_budget_absorption_is_zero_not_nan() {
        let index = single_chain_index();
        let projects = vec![project("p1", Some("central"), "ongoing", 0.0, 0.0, 10.0)];
        let rollup = aggregate(&projects, &index);
        let node = rollup.node("central").unwrap();
        assert_eq!(node.absorption_rate, 0.0);
        assert!(node.absorption_rate.is_finite());
    }

    #[test]
    fn projects_tagged_above_leaf_level_count_at_that_node() {
        let index = single_chain_index();
        let projects = vec![
            project("p1", Some("central"), "ongoing", 100.0, 50.0, 10.0),
            project("p2", Some("mwingi"), "ongoing", 200.0, 100.0, 20.0),
        ];
        let rollup = aggregate(&projects, &index);
        assert_eq!(rollup.node("central").unwrap().total_projects, 1);
        assert_eq!(rollup.node("mwingi").unwrap().total_projects, 2);
        assert_eq!(rollup.node("kitui").unwrap().total_budget, 300.0);
    }

    #[test]
    fn repeated_passes_are_deep_equal() {
        let index = single_chain_index();
        let projects = vec![
            project("p1", Some("central"), "on-going", 123_456.78, 9_999.99, 33.3),
            project("p2", Some("mwingi"), "stalled", 55_000.0, 0.0, 0.0),
            project("p3", None, "???", 1.0, 1.0, 1.0),
        ];
        let first = aggregate(&projects, &index);
        let second = aggregate(&projects, &index);
        assert_eq!(first, second);
    }
}
