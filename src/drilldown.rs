// Drill-down projection.
//
// A click on an aggregate node must open exactly the rows that produced
// it. Membership is re-derived from the hierarchy here rather than read
// from any cached count, so the table always reconciles with the node.
use crate::region::RegionIndex;
use crate::types::{AggregateNode, Project};

/// All projects whose resolved region is `node`'s region or any of its
/// descendants. Projects with an absent or unresolvable leaf are excluded,
/// matching their exclusion from named-region rollups; for every node of
/// the same pass the returned length equals `node.total_projects`.
pub fn projects_under<'p>(
    node: &AggregateNode,
    projects: &'p [Project],
    index: &RegionIndex,
) -> Vec<&'p Project> {
    projects
        .iter()
        .filter(|project| {
            project
                .region_leaf_id
                .as_deref()
                .and_then(|id| index.region(id))
                .is_some_and(|leaf| {
                    leaf.id == node.region_id || index.is_descendant(&leaf.id, &node.region_id)
                })
        })
        .collect()
}
