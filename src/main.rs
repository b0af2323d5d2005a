// Entry point and high-level CLI flow.
//
// The binary is a thin shell over the rollup core:
// - Option [1] loads the region reference and project CSVs, printing
//   diagnostics about skipped/defaulted rows.
// - Option [2] runs an aggregation pass and writes the rollup reports
//   plus a JSON summary.
// - Option [3] walks a cascading county → sub-county → ward → village
//   selection and prints the exact projects under the chosen region.
use county_rollup::filter::{apply_selection, options_for, FilterChange};
use county_rollup::{drilldown, loader, output, reports, rollup};
use county_rollup::{FilterSelection, Project, RegionIndex, RegionLevel};

use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::sync::Mutex;

use county_rollup::util::format_int;

// Simple in-memory app state so we only load the CSVs once but can run
// reports and drill-downs multiple times in a single session.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { data: None }));

struct AppState {
    data: Option<(RegionIndex, Vec<Project>)>,
}

/// Read a single line of input after printing a prompt.
fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask the user whether to go back to the menu after a report run.
fn prompt_back_to_menu() -> bool {
    loop {
        match read_line("Back to menu (Y/N): ").to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Handle option [1]: load the region reference and project CSVs.
///
/// The two files stand in for the external region-reference and
/// project-query services; a malformed hierarchy is fatal here because a
/// partial index would corrupt every downstream rollup.
fn handle_load() {
    let regions_path = "county_regions.csv";
    let projects_path = "county_projects.csv";

    let (regions, region_report) = match loader::load_regions(regions_path) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Failed to load {}: {}\n", regions_path, e);
            return;
        }
    };
    let index = match RegionIndex::build(regions) {
        Ok(index) => index,
        Err(e) => {
            eprintln!("Region reference data is malformed: {}\n", e);
            return;
        }
    };
    let (projects, project_report) = match loader::load_projects(projects_path) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Failed to load {}: {}\n", projects_path, e);
            return;
        }
    };

    println!(
        "Region reference loaded ({} rows, {} regions indexed, {} skipped)",
        format_int(region_report.total_rows as i64),
        format_int(index.len() as i64),
        format_int(region_report.skipped_rows as i64)
    );
    println!(
        "Projects loaded ({} rows, {} usable, {} skipped)",
        format_int(project_report.total_rows as i64),
        format_int(project_report.loaded_rows as i64),
        format_int(project_report.skipped_rows as i64)
    );
    if project_report.defaulted_financials > 0 {
        println!(
            "Note: {} missing/negative financial fields defaulted to 0.",
            format_int(project_report.defaulted_financials as i64)
        );
    }
    if project_report.clamped_progress > 0 {
        println!(
            "Note: {} progress values clamped into 0-100.",
            format_int(project_report.clamped_progress as i64)
        );
    }
    println!();

    let mut state = APP_STATE.lock().unwrap();
    state.data = Some((index, projects));
}

/// Handle option [2]: run an aggregation pass and write the reports.
fn handle_generate_reports() {
    let data = {
        let state = APP_STATE.lock().unwrap();
        state.data.clone()
    };
    let Some((index, projects)) = data else {
        println!("Error: No data loaded. Please load the CSV files first (option 1).\n");
        return;
    };

    println!("Running rollup pass...\n");
    let rollup = rollup::aggregate(&projects, &index);

    let r1 = reports::regional_summary(&rollup);
    output::export_report(
        "Report 1: Regional Rollup Summary",
        "Counties and sub-counties; absorption rate in %",
        "rollup_regional_summary.csv",
        &r1,
        6,
    );

    let r2 = reports::status_breakdown(&rollup);
    output::export_report(
        "Report 2: Canonical Status Breakdown",
        "",
        "rollup_status_breakdown.csv",
        &r2,
        7,
    );

    let summary = reports::summary(&projects, &rollup);
    if let Err(e) = output::write_json("summary.json", &summary) {
        eprintln!("Write error: {}", e);
    }
    println!("Summary Stats (summary.json):");
    println!(
        "{{\"total_projects\": {}, \"unknown_region_projects\": {}}}\n",
        format_int(summary.total_projects as i64),
        format_int(summary.unknown_region_projects as i64)
    );
    if rollup.unknown.total_projects > 0 {
        println!(
            "Warning: {} projects have no resolvable region and are excluded from regional totals.\n",
            format_int(rollup.unknown.total_projects as i64)
        );
    }
}

/// Handle option [3]: cascading region selection followed by a drill-down
/// into the deepest selected node.
fn handle_drilldown() {
    let data = {
        let state = APP_STATE.lock().unwrap();
        state.data.clone()
    };
    let Some((index, projects)) = data else {
        println!("Error: No data loaded. Please load the CSV files first (option 1).\n");
        return;
    };

    let mut selection = FilterSelection::default();
    for level in RegionLevel::ALL {
        let options = options_for(level, &selection, &index);
        if options.is_empty() {
            break;
        }
        println!("Available {} options:", level);
        for region in &options {
            println!("  {} - {}", region.id, region.name);
        }
        let input = read_line(&format!("Select {} id (blank to stop): ", level));
        if input.is_empty() {
            break;
        }
        let change = match level {
            RegionLevel::County => FilterChange::County(Some(input.clone())),
            RegionLevel::SubCounty => FilterChange::SubCounty(Some(input.clone())),
            RegionLevel::Ward => FilterChange::Ward(Some(input.clone())),
            RegionLevel::Village => FilterChange::Village(Some(input.clone())),
        };
        selection = apply_selection(&selection, change, &index);
        if selection.region_at(level).is_none() {
            println!("`{}` is not a valid {} here; stopping.\n", input, level);
            break;
        }
        println!();
    }

    let target = RegionLevel::ALL
        .iter()
        .rev()
        .find_map(|&level| selection.region_at(level).map(str::to_string));
    let Some(target) = target else {
        println!("Nothing selected.\n");
        return;
    };

    let rollup = rollup::aggregate(&projects, &index);
    let Some(node) = rollup.node(&target) else {
        println!("No aggregate node for `{}`.\n", target);
        return;
    };
    let under = drilldown::projects_under(node, &projects, &index);
    let rows = reports::drill_rows(&under, &node.region_name);

    println!(
        "Projects under {} ({}): {} of {} rollup total",
        node.region_name,
        node.level,
        format_int(under.len() as i64),
        format_int(node.total_projects as i64)
    );
    output::preview_table_rows(&rows, 20);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    loop {
        println!("County Project Rollup:");
        println!("[1] Load county data");
        println!("[2] Generate rollup reports");
        println!("[3] Drill down by region\n");
        match read_line("Enter choice: ").as_str() {
            "1" => {
                handle_load();
            }
            "2" => {
                println!();
                handle_generate_reports();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            "3" => {
                println!();
                handle_drilldown();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1, 2, or 3.\n");
            }
        }
    }
}
