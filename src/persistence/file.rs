use super::PersistenceResult;
use crate::tidp::{Container, ProjectSnapshot, Tidp};
use crate::tidp_validation::{validate_snapshot, validate_tidp};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

const DEFAULT_TEAM: &str = "Imported Team";
const DEFAULT_DISCIPLINE: &str = "general";
const DEFAULT_ESTIMATE: &str = "1 week";
const DEFAULT_STATUS: &str = "Planned";
const UNKNOWN: &str = "TBD";

pub fn save_project_to_json<P: AsRef<Path>>(
    snapshot: &ProjectSnapshot,
    path: P,
) -> PersistenceResult<()> {
    validate_snapshot(snapshot)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, snapshot)?;
    Ok(())
}

pub fn load_project_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<ProjectSnapshot> {
    let file = File::open(path)?;
    let snapshot: ProjectSnapshot = serde_json::from_reader(file)?;
    validate_snapshot(&snapshot)?;
    Ok(snapshot)
}

/// One container row, with its team columns repeated.
#[derive(Serialize, Deserialize)]
struct ContainerCsvRecord {
    #[serde(rename = "TIDP ID")]
    tidp_id: String,
    #[serde(rename = "Team Name")]
    team_name: String,
    #[serde(rename = "Discipline")]
    discipline: String,
    #[serde(rename = "Leader")]
    leader: String,
    #[serde(rename = "Company")]
    company: String,
    #[serde(rename = "TIDP Version")]
    tidp_version: String,
    #[serde(rename = "TIDP Status")]
    tidp_status: String,
    #[serde(rename = "Information Container ID")]
    container_id: String,
    #[serde(rename = "Information Container Name/Title")]
    container_name: String,
    #[serde(rename = "Dependencies/Predecessors")]
    dependencies: String,
    #[serde(rename = "Estimated Production Time")]
    estimated_time: String,
    #[serde(rename = "Delivery Milestone")]
    milestone: String,
    #[serde(rename = "Due Date")]
    due_date: String,
    #[serde(rename = "Status")]
    status: String,
    #[serde(rename = "Format/Type")]
    format: String,
    #[serde(rename = "Description")]
    description: String,
    #[serde(rename = "Review and Authorization Process")]
    suitability: String,
}

impl ContainerCsvRecord {
    fn new(tidp: &Tidp, container: &Container) -> Self {
        Self {
            tidp_id: tidp.id.clone(),
            team_name: tidp.team_name.clone(),
            discipline: tidp.discipline.clone(),
            leader: tidp.leader.clone().unwrap_or_default(),
            company: tidp.company.clone().unwrap_or_default(),
            tidp_version: tidp.version.clone(),
            tidp_status: tidp.status.clone(),
            container_id: container.id.clone(),
            container_name: container.name.clone(),
            dependencies: container.dependencies.join(";"),
            estimated_time: container.estimated_time.clone(),
            milestone: container.delivery_milestone.clone().unwrap_or_default(),
            due_date: format_date(container.due_date),
            status: container.status.clone().unwrap_or_default(),
            format: container.format.clone().unwrap_or_default(),
            description: container.description.clone().unwrap_or_default(),
            suitability: container.suitability.clone().unwrap_or_default(),
        }
    }
}

/// Writes one row per container. TIDPs without containers produce no rows.
/// A missing leader or company is written blank and reads back as "TBD".
pub fn export_tidps_to_csv<P: AsRef<Path>>(
    snapshot: &ProjectSnapshot,
    path: P,
) -> PersistenceResult<()> {
    validate_snapshot(snapshot)?;
    let file = File::create(path)?;
    export_tidps_to_writer(snapshot, file)
}

pub fn export_tidps_to_writer<W: io::Write>(
    snapshot: &ProjectSnapshot,
    writer: W,
) -> PersistenceResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for (tidp, container) in snapshot.containers() {
        writer.serialize(ContainerCsvRecord::new(tidp, container))?;
    }
    writer.flush()?;
    Ok(())
}

/// A row or team that could not be imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportFailure {
    /// 1-based spreadsheet row, counting the header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub tidps: Vec<Tidp>,
    pub failed: Vec<ImportFailure>,
    pub total_rows: usize,
}

impl ImportReport {
    pub fn into_snapshot(self, project_id: impl Into<String>) -> ProjectSnapshot {
        ProjectSnapshot::new(project_id, self.tidps)
    }
}

pub fn import_tidps_from_csv<P: AsRef<Path>>(
    path: P,
    project_id: &str,
) -> PersistenceResult<ImportReport> {
    let file = File::open(path)?;
    import_tidps_from_reader(file, project_id)
}

/// Groups rows by team into one TIDP per team, in first-seen order. Rows
/// without a container name are skipped; teams left without containers are
/// dropped.
pub fn import_tidps_from_reader<R: io::Read>(
    reader: R,
    project_id: &str,
) -> PersistenceResult<ImportReport> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut report = ImportReport::default();
    let mut teams: Vec<Tidp> = Vec::new();
    let mut team_index: HashMap<String, usize> = HashMap::new();

    for (idx, record) in reader.deserialize::<HashMap<String, String>>().enumerate() {
        let row_number = idx + 2;
        report.total_rows += 1;

        let row = match record {
            Ok(row) => row,
            Err(err) => {
                report.failed.push(ImportFailure {
                    row: Some(row_number),
                    team: None,
                    error: err.to_string(),
                });
                continue;
            }
        };

        let team_name = field(&row, &["Team Name", "teamName", "Responsible Task Team/Party"])
            .unwrap_or(DEFAULT_TEAM)
            .to_string();
        let slot = *team_index.entry(team_name.clone()).or_insert_with(|| {
            teams.push(team_from_row(&row, &team_name, teams.len() + 1, project_id));
            teams.len() - 1
        });

        match container_from_row(&row, row_number) {
            Ok(Some(container)) => teams[slot].containers.push(container),
            Ok(None) => debug!(row = row_number, "skipping row without a container name"),
            Err(error) => {
                warn!(row = row_number, %error, "rejected csv row");
                report.failed.push(ImportFailure {
                    row: Some(row_number),
                    team: Some(team_name),
                    error,
                });
            }
        }
    }

    for tidp in teams.into_iter().filter(|t| !t.containers.is_empty()) {
        match validate_tidp(&tidp) {
            Ok(()) => report.tidps.push(tidp),
            Err(err) => report.failed.push(ImportFailure {
                row: None,
                team: Some(tidp.team_name.clone()),
                error: err.to_string(),
            }),
        }
    }

    debug!(
        imported = report.tidps.len(),
        failed = report.failed.len(),
        total_rows = report.total_rows,
        "csv import finished"
    );
    Ok(report)
}

fn team_from_row(
    row: &HashMap<String, String>,
    team_name: &str,
    ordinal: usize,
    project_id: &str,
) -> Tidp {
    let id = field(row, &["TIDP ID", "tidpId"])
        .map(str::to_string)
        .unwrap_or_else(|| format!("tidp-{ordinal}"));
    let discipline = field(row, &["Discipline", "discipline"]).unwrap_or(DEFAULT_DISCIPLINE);
    let mut tidp = Tidp::new(id, team_name, discipline);
    tidp.leader = Some(field(row, &["Leader", "leader", "Team Leader"]).unwrap_or(UNKNOWN).into());
    tidp.company = Some(field(row, &["Company", "company"]).unwrap_or(UNKNOWN).into());
    if let Some(version) = field(row, &["TIDP Version", "version"]) {
        tidp.version = version.to_string();
    }
    if let Some(status) = field(row, &["TIDP Status", "tidpStatus"]) {
        tidp.status = status.to_string();
    }
    tidp.project_id = Some(project_id.to_string());
    tidp
}

fn container_from_row(
    row: &HashMap<String, String>,
    row_number: usize,
) -> Result<Option<Container>, String> {
    let Some(name) = field(
        row,
        &[
            "Information Container Name/Title",
            "Container Name",
            "Deliverable",
            "containerName",
            "Information Container ID",
        ],
    ) else {
        return Ok(None);
    };

    let id = field(row, &["Information Container ID", "containerId"])
        .map(str::to_string)
        .unwrap_or_else(|| format!("IC-{row_number}"));
    let estimate = field(
        row,
        &["Estimated Production Time", "Est. Time", "estimatedTime"],
    )
    .unwrap_or(DEFAULT_ESTIMATE);

    let mut container = Container::new(id, name, estimate);
    if let Some(deps) = field(row, &["Dependencies/Predecessors", "dependencies"]) {
        container.dependencies = split_dependencies(deps);
    }
    if let Some(due) = field(row, &["Due Date", "dueDate"]) {
        let date = NaiveDate::parse_from_str(due, "%Y-%m-%d")
            .map_err(|e| format!("invalid due date '{due}': {e}"))?;
        container.due_date = Some(date);
    }
    container.delivery_milestone =
        field(row, &["Delivery Milestone", "Milestone", "milestone"]).map(str::to_string);
    container.status = Some(
        field(row, &["Status", "status"])
            .unwrap_or(DEFAULT_STATUS)
            .to_string(),
    );
    container.format =
        field(row, &["Format/Type", "Format", "format", "Type", "type"]).map(str::to_string);
    container.description = field(row, &["Description", "description"]).map(str::to_string);
    container.suitability =
        field(row, &["Review and Authorization Process", "reviewProcess"]).map(str::to_string);
    Ok(Some(container))
}

/// First non-empty value among `keys`.
fn field<'a>(row: &'a HashMap<String, String>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| row.get(*key))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
}

fn split_dependencies(input: &str) -> Vec<String> {
    input
        .split([',', ';'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}
