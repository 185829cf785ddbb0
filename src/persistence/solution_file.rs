use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;

use crate::domain::solution::SolutionRecord;
use crate::persistence::error::PersistenceError;

/// `solution-{map}-{timestamp}-{score}.json`
pub fn solution_file_name(map_name: &str, timestamp: &str, score: f64) -> String {
    format!("solution-{}-{}-{:.2}.json", map_name, timestamp, score)
}

/// Write the record as pretty JSON into `dir`, creating it if needed.
pub fn write_solution(
    dir: &Path,
    record: &SolutionRecord,
    score: f64,
) -> Result<PathBuf, PersistenceError> {
    fs::create_dir_all(dir).map_err(|source| PersistenceError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let timestamp = Utc::now().format("%Y%m%d-%H%M%S").to_string();
    let path = dir.join(solution_file_name(&record.map_name, &timestamp, score));

    let json = serde_json::to_string_pretty(record).map_err(|source| PersistenceError::Json {
        path: path.clone(),
        source,
    })?;
    fs::write(&path, json).map_err(|source| PersistenceError::Io {
        path: path.clone(),
        source,
    })?;

    info!("Saved solution to {}", path.display());
    Ok(path)
}

pub fn read_solution(path: &Path) -> Result<SolutionRecord, PersistenceError> {
    let text = fs::read_to_string(path).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| PersistenceError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::solution::SolutionEntry;

    #[test]
    fn file_name_carries_map_and_score() {
        assert_eq!(
            solution_file_name("uppsala", "20240101-120000", 1234.567),
            "solution-uppsala-20240101-120000-1234.57.json"
        );
    }

    #[test]
    fn stored_solution_reads_back() {
        let dir = std::env::temp_dir().join(format!("refill-solutions-{}", std::process::id()));
        let record = SolutionRecord {
            game_id: "abc".to_string(),
            map_name: "uppsala".to_string(),
            locations: vec![SolutionEntry {
                location_name: "location1".to_string(),
                freestyle3100_count: 1,
                freestyle9100_count: 0,
            }],
        };

        let path = write_solution(&dir, &record, 42.0).unwrap();
        let back = read_solution(&path).unwrap();
        fs::remove_dir_all(&dir).ok();

        assert_eq!(back, record);
    }

    #[test]
    fn unreadable_file_is_an_io_error() {
        let missing = std::env::temp_dir().join("refill-no-such-solution.json");
        assert!(matches!(
            read_solution(&missing),
            Err(PersistenceError::Io { .. })
        ));
    }
}
