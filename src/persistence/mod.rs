use crate::tidp::ProjectSnapshot;
use crate::tidp_validation::{TidpValidationError, validate_snapshot};
use parking_lot::Mutex;
use serde_json::Error as SerdeJsonError;
use std::collections::HashMap;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum PersistenceError {
    Serialization(SerdeJsonError),
    Io(io::Error),
    #[cfg(feature = "sqlite")]
    Sqlite(rusqlite::Error),
    Csv(csv::Error),
    InvalidData(String),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::Serialization(err) => write!(f, "serialization error: {err}"),
            PersistenceError::Io(err) => write!(f, "io error: {err}"),
            #[cfg(feature = "sqlite")]
            PersistenceError::Sqlite(err) => write!(f, "sqlite error: {err}"),
            PersistenceError::Csv(err) => write!(f, "csv error: {err}"),
            PersistenceError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<SerdeJsonError> for PersistenceError {
    fn from(value: SerdeJsonError) -> Self {
        Self::Serialization(value)
    }
}

impl From<io::Error> for PersistenceError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<csv::Error> for PersistenceError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<TidpValidationError> for PersistenceError {
    fn from(value: TidpValidationError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Source of project snapshots for the analysis layer.
pub trait ProjectStore {
    fn save_project(&self, snapshot: &ProjectSnapshot) -> PersistenceResult<()>;
    fn load_project(&self, project_id: &str) -> PersistenceResult<Option<ProjectSnapshot>>;
}

#[derive(Debug, Default)]
pub struct InMemoryProjectStore {
    projects: Mutex<HashMap<String, ProjectSnapshot>>,
}

impl InMemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.projects.lock().keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl ProjectStore for InMemoryProjectStore {
    fn save_project(&self, snapshot: &ProjectSnapshot) -> PersistenceResult<()> {
        validate_snapshot(snapshot)?;
        self.projects
            .lock()
            .insert(snapshot.project_id.clone(), snapshot.clone());
        Ok(())
    }

    fn load_project(&self, project_id: &str) -> PersistenceResult<Option<ProjectSnapshot>> {
        Ok(self.projects.lock().get(project_id).cloned())
    }
}

#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod file;

pub use file::{
    ImportFailure, ImportReport, export_tidps_to_csv, export_tidps_to_writer, import_tidps_from_csv,
    import_tidps_from_reader, load_project_from_json, save_project_to_json,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteProjectStore;
