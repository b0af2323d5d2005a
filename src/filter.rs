// Cascading filter resolution.
//
// One pure resolver owns the consistency of region filter selections,
// driven by the hierarchy itself instead of display-name matching. Options
// are recomputed from the current selection and index on every call; there
// are no cached option lists to invalidate.
use crate::region::RegionIndex;
use crate::status::CanonicalStatus;
use crate::types::{DateRange, FilterSelection, Region, RegionLevel};

/// A single field change coming from the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterChange {
    County(Option<String>),
    SubCounty(Option<String>),
    Ward(Option<String>),
    Village(Option<String>),
    Status(Option<CanonicalStatus>),
    Department(Option<String>),
    DateRange(Option<DateRange>),
}

/// Apply one field change and re-establish region consistency.
///
/// Changing an ancestor clears every selected descendant that no longer
/// sits under it, cascading through all four levels in this one call; a
/// county change drops an inconsistent ward even with the sub-county
/// untouched. Status, department, and date range never cascade.
pub fn apply_selection(
    current: &FilterSelection,
    change: FilterChange,
    index: &RegionIndex,
) -> FilterSelection {
    let mut next = current.clone();
    match change {
        FilterChange::County(id) => next.county_id = id,
        FilterChange::SubCounty(id) => next.sub_county_id = id,
        FilterChange::Ward(id) => next.ward_id = id,
        FilterChange::Village(id) => next.village_id = id,
        FilterChange::Status(status) => next.status = status,
        FilterChange::Department(id) => next.department_id = id,
        FilterChange::DateRange(range) => next.date_range = range,
    }
    sanitize(&next, index)
}

/// Drop region selections that do not hold up against the index.
///
/// Walks the levels top-down; a selected id survives only if it exists at
/// its level and descends from the nearest surviving ancestor. Selections
/// that never went through `apply_selection` (stale UI state) come out
/// consistent instead of causing an error.
pub fn sanitize(selection: &FilterSelection, index: &RegionIndex) -> FilterSelection {
    let mut out = FilterSelection {
        status: selection.status,
        department_id: selection.department_id.clone(),
        date_range: selection.date_range,
        ..FilterSelection::default()
    };

    let mut nearest: Option<&str> = None;
    for level in RegionLevel::ALL {
        let Some(id) = selection.region_at(level) else {
            continue;
        };
        let exists_at_level = index.region(id).is_some_and(|r| r.level == level);
        let under_ancestor = nearest.map_or(true, |a| index.is_descendant(id, a));
        if !(exists_at_level && under_ancestor) {
            continue;
        }
        match level {
            RegionLevel::County => out.county_id = Some(id.to_string()),
            RegionLevel::SubCounty => out.sub_county_id = Some(id.to_string()),
            RegionLevel::Ward => out.ward_id = Some(id.to_string()),
            RegionLevel::Village => out.village_id = Some(id.to_string()),
        }
        nearest = Some(id);
    }
    out
}

/// Candidate regions for one filter dropdown given the current selection.
///
/// The full set at `County`; below that, the regions at `level` under the
/// nearest selected ancestor, or the full level set when no ancestor is
/// selected. Pure and memoryless: the same `(selection, level)` pair
/// always yields the same options.
pub fn options_for<'i>(
    level: RegionLevel,
    selection: &FilterSelection,
    index: &'i RegionIndex,
) -> Vec<&'i Region> {
    let clean = sanitize(selection, index);

    let mut ancestor: Option<String> = None;
    let mut cursor = level.parent();
    while let Some(above) = cursor {
        if let Some(id) = clean.region_at(above) {
            ancestor = Some(id.to_string());
            break;
        }
        cursor = above.parent();
    }

    match ancestor {
        Some(id) => index.descendants_at(&id, level),
        None => index.regions_at(level),
    }
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

    fn two_county_index() -> RegionIndex {
        RegionIndex::build(vec![
            region("kitui", "Kitui", RegionLevel::County, None),
            region("machakos", "Machakos", RegionLevel::County, None),
            region("mwingi", "Mwingi", RegionLevel::SubCounty, Some("kitui")),
            region("kitui-west", "Kitui West", RegionLevel::SubCounty, Some("kitui")),
            region("mavoko", "Mavoko", RegionLevel::SubCounty, Some("machakos")),
            region("central", "Central", RegionLevel::Ward, Some("mwingi")),
            region("kyome", "Kyome", RegionLevel::Ward, Some("mwingi")),
            region("athi", "Athi River", RegionLevel::Ward, Some("mavoko")),
            region("kalundu", "Kalundu", RegionLevel::Village, Some("central")),
        ])
        .unwrap()
    }

    fn select(index: &RegionIndex, changes: Vec<FilterChange>) -> FilterSelection {
        let mut sel = FilterSelection::default();
        for change in changes {
            sel = apply_selection(&sel, change, index);
        }
        sel
    }

    #[test]
    fn county_change_clears_foreign_descendants_in_one_call() {
        let index = two_county_index();
        let sel = select(
            &index,
            vec![
                FilterChange::County(Some("kitui".into())),
                FilterChange::SubCounty(Some("mwingi".into())),
                FilterChange::Ward(Some("central".into())),
            ],
        );
        assert_eq!(sel.ward_id.as_deref(), Some("central"));

        let moved = apply_selection(&sel, FilterChange::County(Some("machakos".into())), &index);
        assert_eq!(moved.county_id.as_deref(), Some("machakos"));
        assert_eq!(moved.sub_county_id, None);
        assert_eq!(moved.ward_id, None);
    }

    #[test]
    fn ward_consistent_with_new_county_survives_via_chain() {
        let index = two_county_index();
        let sel = select(
            &index,
            vec![
                FilterChange::County(Some("kitui".into())),
                FilterChange::SubCounty(Some("mwingi".into())),
                FilterChange::Ward(Some("central".into())),
                FilterChange::Village(Some("kalundu".into())),
            ],
        );
        assert_eq!(sel.village_id.as_deref(), Some("kalundu"));

        // Re-selecting the same county keeps the whole chain.
        let same = apply_selection(&sel, FilterChange::County(Some("kitui".into())), &index);
        assert_eq!(same, sel);
    }

    #[test]
    fn sub_county_change_cascades_to_ward_and_village() {
        let index = two_county_index();
        let sel = select(
            &index,
            vec![
                FilterChange::County(Some("kitui".into())),
                FilterChange::SubCounty(Some("mwingi".into())),
                FilterChange::Ward(Some("central".into())),
                FilterChange::Village(Some("kalundu".into())),
            ],
        );
        let moved = apply_selection(
            &sel,
            FilterChange::SubCounty(Some("kitui-west".into())),
            &index,
        );
        assert_eq!(moved.sub_county_id.as_deref(), Some("kitui-west"));
        assert_eq!(moved.ward_id, None);
        assert_eq!(moved.village_id, None);
        assert_eq!(moved.county_id.as_deref(), Some("kitui"));
    }

    #[test]
    fn non_region_fields_never_cascade() {
        let index = two_county_index();
        let sel = select(
            &index,
            vec![
                FilterChange::County(Some("kitui".into())),
                FilterChange::Status(Some(CanonicalStatus::Ongoing)),
                FilterChange::Department(Some("water".into())),
            ],
        );
        let moved = apply_selection(&sel, FilterChange::County(Some("machakos".into())), &index);
        assert_eq!(moved.status, Some(CanonicalStatus::Ongoing));
        assert_eq!(moved.department_id.as_deref(), Some("water"));
    }

    #[test]
    fn options_narrow_with_ancestors_and_widen_without() {
        let index = two_county_index();

        let all_counties = options_for(RegionLevel::County, &FilterSelection::default(), &index);
        assert_eq!(all_counties.len(), 2);

        let no_ancestor_wards =
            options_for(RegionLevel::Ward, &FilterSelection::default(), &index);
        assert_eq!(no_ancestor_wards.len(), 3);

        let sel = select(&index, vec![FilterChange::County(Some("kitui".into()))]);
        let kitui_wards: Vec<&str> = options_for(RegionLevel::Ward, &sel, &index)
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        // County is the nearest selected ancestor when no sub-county is set.
        assert_eq!(kitui_wards, vec!["central", "kyome"]);

        let sel = apply_selection(&sel, FilterChange::SubCounty(Some("mwingi".into())), &index);
        let mwingi_wards: Vec<&str> = options_for(RegionLevel::Ward, &sel, &index)
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(mwingi_wards, vec!["central", "kyome"]);
    }

    #[test]
    fn inconsistent_external_state_is_treated_as_absent() {
        let index = two_county_index();
        // A selection that never went through apply_selection: the ward
        // does not belong to the county.
        let stale = FilterSelection {
            county_id: Some("machakos".into()),
            ward_id: Some("central".into()),
            ..FilterSelection::default()
        };
        let wards: Vec<&str> = options_for(RegionLevel::Ward, &stale, &index)
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(wards, vec!["athi"]);

        let clean = sanitize(&stale, &index);
        assert_eq!(clean.county_id.as_deref(), Some("machakos"));
        assert_eq!(clean.ward_id, None);
    }

    #[test]
    fn unknown_region_ids_are_dropped() {
        let index = two_county_index();
        let sel = select(&index, vec![FilterChange::County(Some("narnia".into()))]);
        assert_eq!(sel.county_id, None);
    }
}
