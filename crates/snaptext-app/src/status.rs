use std::time::SystemTime;

use snaptext_types::CycleReport;
use tokio::sync::RwLock;

/// Running totals over all capture cycles.
#[derive(Clone, Debug, Default)]
pub struct CycleStats {
    pub last_capture_time: Option<SystemTime>,
    pub cycle_count: u64,
    pub error_count: u64,
    pub copied_count: u64,
    pub last_status: String,
}

impl CycleStats {
    pub fn record(&mut self, report: &CycleReport) {
        self.cycle_count += 1;
        if report.dialog.is_some() {
            self.error_count += 1;
        }
        if report.copied {
            self.copied_count += 1;
        }
        self.last_capture_time = Some(SystemTime::now());
        self.last_status = report.status.clone();
    }
}

/// Application status
pub struct AppStatus {
    pub cycles: RwLock<CycleStats>,
}

impl AppStatus {
    pub fn new() -> Self {
        Self {
            cycles: RwLock::new(CycleStats::default()),
        }
    }
}

impl Default for AppStatus {
    fn default() -> Self {
        Self::new()
    }
}
