//! Logger that keeps its records in memory

use parking_lot::Mutex;

use super::traits::{LogLevel, Logger};

/// Records every message, for asserting on warnings in tests
#[derive(Debug, Default)]
pub struct MemoryLogger {
    records: Mutex<Vec<(LogLevel, String)>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records, oldest first
    pub fn records(&self) -> Vec<(LogLevel, String)> {
        self.records.lock().clone()
    }

    /// Messages logged at exactly `level`
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, level: LogLevel, message: &str) {
        self.records.lock().push((level, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_by_level() {
        let logger = MemoryLogger::new();
        logger.info("[Test] started");
        logger.warn("[Test] careful");
        crate::log_warn!(logger, "[Test] {} dropped", 2);

        assert_eq!(logger.records().len(), 3);
        assert_eq!(
            logger.messages(LogLevel::Warn),
            vec!["[Test] careful".to_string(), "[Test] 2 dropped".to_string()]
        );
        assert!(logger.messages(LogLevel::Error).is_empty());
    }
}
