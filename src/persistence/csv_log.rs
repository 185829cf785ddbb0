use std::path::Path;

use csv::Writer;
use tracing::info;

use crate::domain::types::GenerationLog;
use crate::persistence::error::PersistenceError;

pub const LOG_HEADER: [&str; 5] = [
    "generation",
    "best_solution",
    "worst_solution",
    "average_score",
    "diversity",
];

pub fn write_generation_log(path: &Path, log: &[GenerationLog]) -> Result<(), PersistenceError> {
    let mut wtr = Writer::from_path(path)?;

    wtr.write_record(LOG_HEADER)?;
    for entry in log {
        wtr.write_record([
            entry.generation.to_string(),
            entry.best_solution.to_string(),
            entry.worst_solution.to_string(),
            entry.average_score.to_string(),
            entry.diversity.to_string(),
        ])?;
    }

    wtr.flush().map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Wrote {} generation records to {}", log.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_and_rows_in_order() {
        let path = std::env::temp_dir().join(format!("refill-log-{}.csv", std::process::id()));
        let log = vec![
            GenerationLog {
                generation: 0,
                best_solution: 12.5,
                worst_solution: 0.0,
                average_score: 4.25,
                diversity: 0.9,
            },
            GenerationLog {
                generation: 1,
                best_solution: 13.0,
                worst_solution: 1.0,
                average_score: 5.0,
                diversity: 0.5,
            },
        ];

        write_generation_log(&path, &log).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "generation,best_solution,worst_solution,average_score,diversity",
                "0,12.5,0,4.25,0.9",
                "1,13,1,5,0.5",
            ]
        );
    }
}
