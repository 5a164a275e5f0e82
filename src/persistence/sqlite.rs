use super::{PersistenceResult, ProjectStore};
use crate::tidp::{ProjectSnapshot, Tidp};
use crate::tidp_validation::validate_snapshot;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};

/// Stores each TIDP as a JSON document, keyed by project.
pub struct SqliteProjectStore {
    connection: Mutex<Connection>,
}

impl SqliteProjectStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::from_connection(connection)
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(connection: Connection) -> PersistenceResult<Self> {
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS projects (
                id TEXT PRIMARY KEY
            );
            CREATE TABLE IF NOT EXISTS tidps (
                project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                position INTEGER NOT NULL,
                id TEXT NOT NULL,
                tidp_json TEXT NOT NULL,
                PRIMARY KEY (project_id, id)
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn save_tidps(
        &self,
        tx: &rusqlite::Transaction,
        snapshot: &ProjectSnapshot,
    ) -> PersistenceResult<()> {
        tx.execute(
            "DELETE FROM tidps WHERE project_id = ?1",
            params![snapshot.project_id],
        )?;
        let mut stmt = tx.prepare(
            "INSERT INTO tidps (project_id, position, id, tidp_json) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for (position, tidp) in snapshot.tidps.iter().enumerate() {
            let json = serde_json::to_string(tidp)?;
            stmt.execute(params![snapshot.project_id, position as i64, tidp.id, json])?;
        }
        Ok(())
    }

    pub fn project_ids(&self) -> PersistenceResult<Vec<String>> {
        let conn = self.connection.lock();
        let mut stmt = conn.prepare("SELECT id FROM projects ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut ids = Vec::new();
        for id in rows {
            ids.push(id?);
        }
        Ok(ids)
    }
}

impl ProjectStore for SqliteProjectStore {
    fn save_project(&self, snapshot: &ProjectSnapshot) -> PersistenceResult<()> {
        validate_snapshot(snapshot)?;
        let mut conn = self.connection.lock();
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT OR IGNORE INTO projects (id) VALUES (?1)",
            params![snapshot.project_id],
        )?;
        self.save_tidps(&tx, snapshot)?;
        tx.commit()?;
        Ok(())
    }

    fn load_project(&self, project_id: &str) -> PersistenceResult<Option<ProjectSnapshot>> {
        let conn = self.connection.lock();

        let exists: Option<String> = conn
            .query_row(
                "SELECT id FROM projects WHERE id = ?1",
                params![project_id],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            return Ok(None);
        }

        let mut stmt = conn.prepare(
            "SELECT tidp_json FROM tidps WHERE project_id = ?1 ORDER BY position ASC",
        )?;
        let rows = stmt.query_map(params![project_id], |row| row.get::<_, String>(0))?;

        let mut tidps = Vec::new();
        for json in rows {
            let tidp: Tidp = serde_json::from_str(&json?)?;
            tidps.push(tidp);
        }

        let snapshot = ProjectSnapshot::new(project_id, tidps);
        validate_snapshot(&snapshot)?;
        Ok(Some(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tidp::Container;

    #[test]
    fn keeps_projects_apart() {
        let store = SqliteProjectStore::in_memory().unwrap();
        let a = ProjectSnapshot::new(
            "a",
            vec![Tidp::new("t1", "Civils", "civil")
                .with_containers(vec![Container::new("c1", "Survey", "1 week")])],
        );
        let b = ProjectSnapshot::new("b", vec![Tidp::new("t1", "MEP", "mep")]);
        store.save_project(&a).unwrap();
        store.save_project(&b).unwrap();

        assert_eq!(store.load_project("a").unwrap(), Some(a));
        assert_eq!(store.load_project("b").unwrap(), Some(b));
        assert_eq!(store.project_ids().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn empty_project_loads_as_empty_snapshot() {
        let store = SqliteProjectStore::in_memory().unwrap();
        store.save_project(&ProjectSnapshot::new("p", Vec::new())).unwrap();
        assert_eq!(
            store.load_project("p").unwrap(),
            Some(ProjectSnapshot::new("p", Vec::new()))
        );
        assert_eq!(store.load_project("missing").unwrap(), None);
    }
}
