// Region reference index.
//
// Built once from the full region set for the active county tenant and
// then read-only; reloading reference data means building a fresh index.
// A partial index would corrupt every downstream rollup, so any structural
// problem in the input is fatal to `build`.
use std::collections::HashMap;
use thiserror::Error;

use crate::types::{Region, RegionLevel};

/// Structural defects in the region reference data.
#[derive(Debug, Error)]
pub enum MalformedHierarchy {
    #[error("duplicate region id `{0}`")]
    DuplicateId(String),
    #[error("{level} `{id}` has no parent region")]
    MissingParent { id: String, level: RegionLevel },
    #[error("region `{id}` references unknown parent `{parent_id}`")]
    UnknownParent { id: String, parent_id: String },
    #[error(
        "{level} `{id}` has parent `{parent_id}` at {actual} level, expected {expected}"
    )]
    WrongParentLevel {
        id: String,
        level: RegionLevel,
        parent_id: String,
        actual: RegionLevel,
        expected: RegionLevel,
    },
    #[error("county `{0}` must not declare a parent")]
    CountyWithParent(String),
}

/// Adjacency structure over the county → sub-county → ward → village
/// forest. All lookups are pure reads.
#[derive(Debug, Clone)]
pub struct RegionIndex {
    // Sorted by (level, lowercased name, id) so every iteration the index
    // hands out is deterministic.
    regions: Vec<Region>,
    by_id: HashMap<String, usize>,
    children: Vec<Vec<usize>>,
}

impl RegionIndex {
    /// Validate the raw region set and build the index.
    ///
    /// Fails on duplicate ids, a county declaring a parent, a missing or
    /// unknown parent, or a parent that is not exactly one level up.
    pub fn build(mut raw: Vec<Region>) -> Result<RegionIndex, MalformedHierarchy> {
        raw.sort_by(|a, b| {
            (a.level, a.name.to_lowercase(), a.id.as_str())
                .cmp(&(b.level, b.name.to_lowercase(), b.id.as_str()))
        });

        let mut by_id: HashMap<String, usize> = HashMap::with_capacity(raw.len());
        for (idx, region) in raw.iter().enumerate() {
            if by_id.insert(region.id.clone(), idx).is_some() {
                return Err(MalformedHierarchy::DuplicateId(region.id.clone()));
            }
        }

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); raw.len()];
        for (idx, region) in raw.iter().enumerate() {
            match (&region.parent_id, region.level.parent()) {
                // Counties are roots of the forest.
                (Some(_), None) => {
                    return Err(MalformedHierarchy::CountyWithParent(region.id.clone()));
                }
                (None, Some(_)) => {
                    return Err(MalformedHierarchy::MissingParent {
                        id: region.id.clone(),
                        level: region.level,
                    });
                }
                (Some(parent_id), Some(expected)) => {
                    let Some(&parent_idx) = by_id.get(parent_id) else {
                        return Err(MalformedHierarchy::UnknownParent {
                            id: region.id.clone(),
                            parent_id: parent_id.clone(),
                        });
                    };
                    let actual = raw[parent_idx].level;
                    if actual != expected {
                        return Err(MalformedHierarchy::WrongParentLevel {
                            id: region.id.clone(),
                            level: region.level,
                            parent_id: parent_id.clone(),
                            actual,
                            expected,
                        });
                    }
                    children[parent_idx].push(idx);
                }
                (None, None) => {}
            }
        }

        Ok(RegionIndex {
            regions: raw,
            by_id,
            children,
        })
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Look up a region by id.
    pub fn region(&self, id: &str) -> Option<&Region> {
        self.by_id.get(id).map(|&idx| &self.regions[idx])
    }

    /// All regions, counties first, then each deeper level sorted by name.
    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    /// Direct children of a region; empty for leaves and unknown ids.
    pub fn children_of(&self, id: &str) -> Vec<&Region> {
        match self.by_id.get(id) {
            Some(&idx) => self.children[idx]
                .iter()
                .map(|&child| &self.regions[child])
                .collect(),
            None => Vec::new(),
        }
    }

    /// Ancestors of a region, immediate parent first, county last.
    /// Empty for counties and unknown ids.
    pub fn ancestors_of(&self, id: &str) -> Vec<&Region> {
        let mut out = Vec::new();
        let mut current = self.region(id);
        while let Some(region) = current {
            current = region
                .parent_id
                .as_deref()
                .and_then(|parent| self.region(parent));
            if let Some(parent) = current {
                out.push(parent);
            }
        }
        out
    }

    /// Whether `candidate_id` sits strictly below `ancestor_id` in the
    /// hierarchy. A region is not its own descendant; unknown ids are
    /// nobody's descendant.
    pub fn is_descendant(&self, candidate_id: &str, ancestor_id: &str) -> bool {
        if candidate_id == ancestor_id {
            return false;
        }
        self.ancestors_of(candidate_id)
            .iter()
            .any(|ancestor| ancestor.id == ancestor_id)
    }

    /// All regions at one level, sorted by name.
    pub fn regions_at(&self, level: RegionLevel) -> Vec<&Region> {
        self.regions.iter().filter(|r| r.level == level).collect()
    }

    /// Regions at `level` that sit below `ancestor_id`, sorted by name.
    pub fn descendants_at(&self, ancestor_id: &str, level: RegionLevel) -> Vec<&Region> {
        self.regions_at(level)
            .into_iter()
            .filter(|r| self.is_descendant(&r.id, ancestor_id))
            .collect()
    }
}
