use crate::app_dirs::AppDirs;
use crate::error::Result;
use crate::record::{ProblemResult, Timestamp};
use crate::training::{TrainingGoal, TrainingType};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use tracing::debug;

const TRAINING_GOAL_KEY: &str = "trainingGoal";
const TRAINING_TYPE_KEY: &str = "trainingType";

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS results (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        problem TEXT NOT NULL,
        time_ms REAL NOT NULL,
        timestamp TEXT NOT NULL,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP
    );
    CREATE TABLE IF NOT EXISTS kv (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
"#;

/// Stored training goal: the legacy key plus its structured form
#[derive(Debug, Clone, PartialEq)]
pub struct StoredGoal {
    pub key: String,
    pub training_type: TrainingType,
}

impl StoredGoal {
    pub fn goal(&self) -> TrainingGoal {
        self.training_type.goal()
    }
}

impl From<&TrainingGoal> for StoredGoal {
    fn from(goal: &TrainingGoal) -> Self {
        Self {
            key: goal.key(),
            training_type: goal.training_type(),
        }
    }
}

/// SQLite-backed result log and training goal slot
#[derive(Debug)]
pub struct ResultStore {
    conn: Connection,
}

impl ResultStore {
    /// Open the store at the default location
    pub fn new() -> Result<Self> {
        let db_path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("zetamac_results.db"));
        Self::open(db_path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        debug!("opening result store at {}", path.display());
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(ResultStore { conn })
    }

    pub fn record_result(&self, result: &ProblemResult) -> Result<()> {
        self.conn.execute(
            "INSERT INTO results (problem, time_ms, timestamp) VALUES (?1, ?2, ?3)",
            params![
                result.problem,
                result.time,
                serde_json::to_string(&result.timestamp)?
            ],
        )?;
        Ok(())
    }

    /// Record many results in one transaction
    pub fn record_results_batch(&mut self, results: &[ProblemResult]) -> Result<()> {
        let tx = self.conn.transaction()?;

        for result in results {
            tx.execute(
                "INSERT INTO results (problem, time_ms, timestamp) VALUES (?1, ?2, ?3)",
                params![
                    result.problem,
                    result.time,
                    serde_json::to_string(&result.timestamp)?
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// All results, oldest first
    pub fn load_results(&self) -> Result<Vec<ProblemResult>> {
        let mut stmt = self
            .conn
            .prepare("SELECT problem, time_ms, timestamp FROM results ORDER BY id ASC")?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, f64>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut results = Vec::new();
        for row in rows {
            let (problem, time, timestamp) = row?;
            let timestamp: Timestamp = serde_json::from_str(&timestamp)?;
            results.push(ProblemResult {
                problem,
                time,
                timestamp,
            });
        }

        Ok(results)
    }

    pub fn result_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM results", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn clear_results(&self) -> Result<()> {
        self.conn.execute("DELETE FROM results", [])?;
        Ok(())
    }

    fn get_value(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn put_value(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    /// Persist both the goal key and its training type
    pub fn save_training_goal(&mut self, goal: &TrainingGoal) -> Result<()> {
        let stored = StoredGoal::from(goal);
        let training_type = serde_json::to_string(&stored.training_type)?;

        let tx = self.conn.transaction()?;
        Self::put_value(&tx, TRAINING_GOAL_KEY, &stored.key)?;
        Self::put_value(&tx, TRAINING_TYPE_KEY, &training_type)?;
        tx.commit()?;

        debug!("saved training goal {}", stored.key);
        Ok(())
    }

    /// The stored goal, left in place. Both halves must be present.
    pub fn training_goal(&self) -> Result<Option<StoredGoal>> {
        let (Some(key), Some(training_type)) = (
            self.get_value(TRAINING_GOAL_KEY)?,
            self.get_value(TRAINING_TYPE_KEY)?,
        ) else {
            return Ok(None);
        };

        Ok(Some(StoredGoal {
            key,
            training_type: serde_json::from_str(&training_type)?,
        }))
    }

    /// Read the stored goal and remove it so it is applied only once
    pub fn take_training_goal(&self) -> Result<Option<StoredGoal>> {
        let goal = self.training_goal()?;
        if goal.is_some() {
            self.clear_training_goal()?;
        }
        Ok(goal)
    }

    pub fn clear_training_goal(&self) -> Result<()> {
        self.conn.execute(
            "DELETE FROM kv WHERE key IN (?1, ?2)",
            params![TRAINING_GOAL_KEY, TRAINING_TYPE_KEY],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::Operator;
    use tempfile::tempdir;

    fn create_test_store() -> ResultStore {
        ResultStore::open_in_memory().unwrap()
    }

    #[test]
    fn test_record_and_load_in_order() {
        let store = create_test_store();

        store
            .record_result(&ProblemResult::new("5 × 7", 1200.0, Timestamp::Millis(1)))
            .unwrap();
        store
            .record_result(&ProblemResult::new("12 ÷ 3", 900.5, Timestamp::Text("b".into())))
            .unwrap();

        let results = store.load_results().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].problem, "5 × 7");
        assert_eq!(results[0].timestamp, Timestamp::Millis(1));
        assert_eq!(results[1].time, 900.5);
        assert_eq!(results[1].timestamp, Timestamp::Text("b".into()));
        assert_eq!(store.result_count().unwrap(), 2);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut store = create_test_store();
        let r = ProblemResult::new("2 + 2", 100.0, Timestamp::Millis(5));

        store.record_results_batch(&[r.clone(), r.clone(), r]).unwrap();
        assert_eq!(store.result_count().unwrap(), 3);
    }

    #[test]
    fn test_clear_results() {
        let store = create_test_store();
        store.record_result(&ProblemResult::now("2 + 2", 100.0)).unwrap();

        store.clear_results().unwrap();
        assert!(store.load_results().unwrap().is_empty());
    }

    #[test]
    fn test_training_goal_roundtrip_and_take() {
        let mut store = create_test_store();
        assert_eq!(store.training_goal().unwrap(), None);

        store
            .save_training_goal(&TrainingGoal::MultiplicationFact(7))
            .unwrap();

        let stored = store.training_goal().unwrap().unwrap();
        assert_eq!(stored.key, "*_7");
        assert_eq!(stored.goal(), TrainingGoal::MultiplicationFact(7));

        let taken = store.take_training_goal().unwrap().unwrap();
        assert_eq!(taken, stored);
        assert_eq!(store.take_training_goal().unwrap(), None);
    }

    #[test]
    fn test_saving_goal_overwrites_previous() {
        let mut store = create_test_store();
        store.save_training_goal(&TrainingGoal::Borrow).unwrap();
        store
            .save_training_goal(&TrainingGoal::General(Operator::Divide))
            .unwrap();

        let stored = store.training_goal().unwrap().unwrap();
        assert_eq!(stored.key, "/");
        assert_eq!(stored.training_type, TrainingType::General { operation: Operator::Divide });
    }

    #[test]
    fn test_goal_key_without_type_is_ignored() {
        let store = create_test_store();
        // older popups only wrote the key
        ResultStore::put_value(&store.conn, TRAINING_GOAL_KEY, "sub_borrow").unwrap();

        assert_eq!(store.take_training_goal().unwrap(), None);
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("results.db");

        {
            let store = ResultStore::open(&path).unwrap();
            store.record_result(&ProblemResult::now("3 + 4", 250.0)).unwrap();
        }

        let reopened = ResultStore::open(&path).unwrap();
        assert_eq!(reopened.result_count().unwrap(), 1);
    }
}
