//! Regional project rollup core for the county monitoring dashboard.
//!
//! The pure subsystem lives in five modules: [`status`] collapses free-text
//! project statuses into the fixed taxonomy, [`region`] indexes the
//! county → sub-county → ward → village hierarchy, [`rollup`] aggregates
//! project metrics up that hierarchy, [`filter`] resolves cascading filter
//! selections, and [`drilldown`] projects the exact rows under an
//! aggregate node. [`loader`], [`reports`], and [`output`] are the CSV/CLI
//! shell around the core.

pub mod drilldown;
pub mod filter;
pub mod loader;
pub mod output;
pub mod region;
pub mod reports;
pub mod rollup;
pub mod status;
pub mod types;
pub mod util;

pub use drilldown::projects_under;
pub use filter::{apply_selection, options_for, FilterChange};
pub use region::{MalformedHierarchy, RegionIndex};
pub use rollup::{aggregate, Rollup};
pub use status::CanonicalStatus;
pub use types::{AggregateNode, FilterSelection, Project, Region, RegionLevel};
