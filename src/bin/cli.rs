use std::io::{self, Write};

use tidp_engine::analysis::{ProjectAnalysis, analyze_snapshot};
use tidp_engine::config::AnalysisConfig;
use tidp_engine::graph::{DependencyGraph, find_cycle, topological_ids};
use tidp_engine::persistence::{
    export_tidps_to_csv, import_tidps_from_csv, load_project_from_json, save_project_to_json,
};
use tidp_engine::report::{
    critical_path_to_dataframe, dependency_matrix_to_dataframe, render_text_table,
    resources_to_dataframe, schedule_to_dataframe, tidp_summaries_to_dataframe,
};
use tidp_engine::tidp::ProjectSnapshot;
use tidp_engine::tidp_validation::{validate_dependencies, validate_snapshot};
use tracing::warn;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "sqlite")]
use tidp_engine::persistence::{ProjectStore, SqliteProjectStore};

const CONFIG_ENV: &str = "TIDP_ENGINE_CONFIG";

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn initial_config() -> AnalysisConfig {
    let Ok(path) = std::env::var(CONFIG_ENV) else {
        return AnalysisConfig::default();
    };
    match AnalysisConfig::from_json_file(&path) {
        Ok(config) => config,
        Err(e) => {
            warn!(%path, error = %e, "ignoring config file");
            AnalysisConfig::default()
        }
    }
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  load json <path>                   Load a project snapshot from JSON\n  load csv <path> [project_id]       Import TIDPs from CSV, grouped by team\n  load sqlite <db> <project_id>      Load a project from SQLite\n  config <path>                      Load analysis options from JSON\n  tidps                              List TIDPs with totals\n  show                               Show the full CPM schedule\n  cycle                              Report a circular dependency, if any\n  order                              Print the topological order\n  critical                           Show the critical path\n  matrix                             Show the cross-team dependency matrix\n  resources                          Show resource allocation by discipline\n  summary                            One-line analysis summary\n  validate                           Validate TIDPs and their dependencies\n  save json <path>                   Save the project as JSON\n  save csv <path>                    Export containers as CSV\n  save sqlite <db>                   Save the project to SQLite\n  quit|exit                          Exit"
    );
}

fn load(kind: Option<&str>, args: &[&str]) -> Result<ProjectSnapshot, String> {
    match (kind, args) {
        (Some("json"), [path, ..]) => load_project_from_json(path).map_err(|e| e.to_string()),
        (Some("csv"), [path, rest @ ..]) => {
            let project_id = rest.first().copied().unwrap_or("imported-project");
            let report = import_tidps_from_csv(path, project_id).map_err(|e| e.to_string())?;
            for failure in &report.failed {
                match (failure.row, &failure.team) {
                    (Some(row), _) => println!("row {row}: {}", failure.error),
                    (None, Some(team)) => println!("team {team}: {}", failure.error),
                    (None, None) => println!("{}", failure.error),
                }
            }
            println!(
                "Imported {} TIDPs from {} rows ({} failed).",
                report.tidps.len(),
                report.total_rows,
                report.failed.len()
            );
            Ok(report.into_snapshot(project_id))
        }
        #[cfg(feature = "sqlite")]
        (Some("sqlite"), [db, project_id, ..]) => {
            let store = SqliteProjectStore::new(db).map_err(|e| e.to_string())?;
            store
                .load_project(project_id)
                .map_err(|e| e.to_string())?
                .ok_or_else(|| format!("project {project_id} not found"))
        }
        _ => Err("Usage: load <json|csv|sqlite> <path> [project_id]".to_string()),
    }
}

fn save(snapshot: &ProjectSnapshot, kind: Option<&str>, path: Option<&str>) -> Result<(), String> {
    match (kind, path) {
        (Some("json"), Some(path)) => {
            save_project_to_json(snapshot, path).map_err(|e| e.to_string())
        }
        (Some("csv"), Some(path)) => export_tidps_to_csv(snapshot, path).map_err(|e| e.to_string()),
        #[cfg(feature = "sqlite")]
        (Some("sqlite"), Some(db)) => SqliteProjectStore::new(db)
            .and_then(|store| store.save_project(snapshot))
            .map_err(|e| e.to_string()),
        _ => Err("Usage: save <json|csv|sqlite> <path>".to_string()),
    }
}

fn analyze(snapshot: &ProjectSnapshot, config: &AnalysisConfig) -> Option<ProjectAnalysis> {
    match analyze_snapshot(snapshot, config) {
        Ok(analysis) => Some(analysis),
        Err(e) => {
            println!("Analysis error: {e}");
            None
        }
    }
}

fn print_table(df: polars::prelude::PolarsResult<polars::prelude::DataFrame>) {
    match df {
        Ok(df) => println!("{}", render_text_table(&df)),
        Err(e) => println!("Render error: {e}"),
    }
}

fn main() {
    init_logging();
    let mut config = initial_config();
    let mut snapshot: Option<ProjectSnapshot> = None;

    println!("TIDP Engine (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "load" => {
                let kind = parts.next();
                let args: Vec<&str> = parts.collect();
                match load(kind, &args) {
                    Ok(loaded) => {
                        println!(
                            "Loaded project {} ({} TIDPs, {} containers).",
                            loaded.project_id,
                            loaded.tidps.len(),
                            loaded.container_count()
                        );
                        snapshot = Some(loaded);
                    }
                    Err(e) => println!("Load error: {e}"),
                }
            }
            "config" => match parts.next() {
                Some(path) => match AnalysisConfig::from_json_file(path) {
                    Ok(loaded) => {
                        config = loaded;
                        println!("Config loaded.");
                    }
                    Err(e) => println!("Config error: {e}"),
                },
                None => println!("Usage: config <path>"),
            },
            "save" => {
                let Some(current) = snapshot.as_ref() else {
                    println!("No project loaded.");
                    continue;
                };
                match save(current, parts.next(), parts.next()) {
                    Ok(()) => println!("Saved."),
                    Err(e) => println!("Save error: {e}"),
                }
            }
            "tidps" | "show" | "cycle" | "order" | "critical" | "matrix" | "resources"
            | "summary" | "validate" => {
                let Some(current) = snapshot.as_ref() else {
                    println!("No project loaded.");
                    continue;
                };
                run_query(cmd, current, &config);
            }
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}

fn run_query(cmd: &str, snapshot: &ProjectSnapshot, config: &AnalysisConfig) {
    match cmd {
        "tidps" => print_table(tidp_summaries_to_dataframe(&snapshot.tidps)),
        "cycle" => {
            let graph = DependencyGraph::build_with_units(&snapshot.tidps, &config.duration_units);
            match find_cycle(&graph) {
                Some(cycle) => println!("Circular dependency detected: {}", cycle.join(" -> ")),
                None => println!("No circular dependencies."),
            }
        }
        "order" => {
            let graph = DependencyGraph::build_with_units(&snapshot.tidps, &config.duration_units);
            match topological_ids(&graph) {
                Some(ids) => println!("{}", ids.join(" -> ")),
                None => println!("Circular dependency detected"),
            }
        }
        "validate" => {
            let mut clean = true;
            if let Err(e) = validate_snapshot(snapshot) {
                println!("Invalid: {e}");
                clean = false;
            }
            for tidp in &snapshot.tidps {
                let result = validate_dependencies(tidp, &snapshot.tidps);
                for issue in &result.issues {
                    println!("{}: {issue}", tidp.id);
                }
                for warning in &result.warnings {
                    println!("{} (warning): {warning}", tidp.id);
                }
                clean &= result.is_valid;
            }
            if clean {
                println!("Valid.");
            }
        }
        _ => {
            let Some(analysis) = analyze(snapshot, config) else {
                return;
            };
            match cmd {
                "show" => print_table(schedule_to_dataframe(&analysis.critical_path)),
                "critical" => {
                    println!("Project duration: {}h", analysis.critical_path.project_duration);
                    print_table(critical_path_to_dataframe(&analysis.critical_path));
                }
                "matrix" => match &analysis.dependency_matrix {
                    Some(report) => {
                        print_table(dependency_matrix_to_dataframe(&report.matrix));
                        println!(
                            "dependencies={}, critical={}, teams={}",
                            report.summary.total_dependencies,
                            report.summary.critical_dependencies,
                            report.summary.teams_involved
                        );
                    }
                    None => println!("Dependency matrix disabled by config."),
                },
                "resources" => match &analysis.resource_allocation {
                    Some(allocation) => {
                        print_table(resources_to_dataframe(allocation));
                        println!("Total: {}h", allocation.total_resources);
                        if let Some(period) = &allocation.peak_utilization.period {
                            println!(
                                "Peak: {period} ({}h)",
                                allocation.peak_utilization.resources
                            );
                        }
                    }
                    None => println!("Resource allocation disabled by config."),
                },
                _ => println!("Analysis ({})", analysis.summary().to_cli_summary()),
            }
        }
    }
}
