use std::io::{self, Write};

/// Prints percentage updates for a single transfer to stdout.
pub struct ConsoleProgressReporter {
    label: String,
    total_bytes: u64,
    step_bytes: u64,
    next_report: u64,
}

impl ConsoleProgressReporter {
    pub fn new(label: impl Into<String>, total_bytes: u64, step_bytes: u64) -> Self {
        let step_bytes = step_bytes.max(1);
        Self {
            label: label.into(),
            total_bytes,
            step_bytes,
            next_report: step_bytes,
        }
    }

    /// Print progress once `processed_bytes` crosses the next step.
    pub fn maybe_report(&mut self, processed_bytes: u64) {
        if self.total_bytes == 0 || processed_bytes < self.next_report {
            return;
        }
        while self.next_report <= processed_bytes {
            self.next_report += self.step_bytes;
        }
        print!("\r {}: {}%", self.label, self.percent(processed_bytes));
        let _ = io::stdout().flush();
    }

    /// Whether any intermediate update was printed.
    pub fn reported(&self) -> bool {
        self.next_report > self.step_bytes
    }

    fn percent(&self, processed_bytes: u64) -> u64 {
        (processed_bytes.min(self.total_bytes) * 100) / self.total_bytes
    }
}
