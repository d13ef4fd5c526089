// Progress bar and live failure reporting for batches

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use fleet_core::{BatchObserver, BatchReport, OperationKind, OperationOutcome, OutcomeStatus};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::fmt::MakeWriter;

/// Create a progress bar for a batch of known length
fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        .unwrap_or_else(|e| {
            eprintln!("Failed to create progress bar template: {}", e);
            ProgressStyle::default_bar()
        })
        .progress_chars("=>-");
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}

/// The bar currently drawn on stderr, shared with the log writer
///
/// Log lines written while a bar is active are printed above it instead of
/// through it.
#[derive(Clone, Default)]
pub struct ActiveBar(Arc<Mutex<Option<ProgressBar>>>);

impl ActiveBar {
    fn set(&self, bar: Option<ProgressBar>) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = bar;
    }

    fn get(&self) -> Option<ProgressBar> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// Stderr writer that suspends the active bar around each write
pub struct StderrAboveBar {
    bar: Option<ProgressBar>,
}

impl Write for StderrAboveBar {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &self.bar {
            Some(bar) => bar.suspend(|| io::stderr().write(buf)),
            None => io::stderr().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

impl<'a> MakeWriter<'a> for ActiveBar {
    type Writer = StderrAboveBar;

    fn make_writer(&'a self) -> Self::Writer {
        StderrAboveBar { bar: self.get() }
    }
}

/// Shows batch progress on stderr and prints each failure as it happens
pub struct ProgressObserver {
    active: ActiveBar,
    bar: Option<ProgressBar>,
}

impl ProgressObserver {
    pub fn new(active: ActiveBar) -> Self {
        Self { active, bar: None }
    }

    fn print_above(&self, line: &str) {
        match &self.bar {
            Some(bar) => bar.suspend(|| eprintln!("{}", line)),
            None => eprintln!("{}", line),
        }
    }
}

impl BatchObserver for ProgressObserver {
    fn on_start(&mut self, operation: OperationKind, total: usize) {
        if total > 0 {
            let bar = create_progress_bar(total as u64, operation.name());
            self.active.set(Some(bar.clone()));
            self.bar = Some(bar);
        }
    }

    fn on_outcome(&mut self, outcome: &OperationOutcome) {
        if let OutcomeStatus::Failed { error } = &outcome.status {
            self.print_above(&format!("An error occurred for {}: {}", outcome.id, error));
        }

        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    fn on_finish(&mut self, _report: &BatchReport) {
        self.active.set(None);
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_core::MemberId;

    fn report() -> BatchReport {
        BatchReport {
            operation: OperationKind::Pull,
            dry_run: false,
            outcomes: Vec::new(),
        }
    }

    #[test]
    fn test_observer_without_start_does_not_panic() {
        let mut observer = ProgressObserver::new(ActiveBar::default());
        observer.on_outcome(&OperationOutcome::failed(MemberId::from("001"), "boom"));
        assert!(observer.bar.is_none());
    }

    #[test]
    fn test_bar_counts_outcomes() {
        let mut observer = ProgressObserver::new(ActiveBar::default());
        observer.on_start(OperationKind::Pull, 2);
        observer.on_outcome(&OperationOutcome::succeeded(MemberId::from("001")));
        observer.on_outcome(&OperationOutcome::failed(MemberId::from("002"), "boom"));

        assert_eq!(observer.bar.as_ref().map(|b| b.position()), Some(2));

        observer.on_finish(&report());
        assert!(observer.bar.is_none());
    }

    #[test]
    fn test_log_writer_follows_active_bar() {
        let active = ActiveBar::default();
        let mut observer = ProgressObserver::new(active.clone());
        assert!(active.make_writer().bar.is_none());

        observer.on_start(OperationKind::Clone, 3);
        let mut writer = active.make_writer();
        assert!(writer.bar.is_some());
        writer.write_all(b"").unwrap();

        observer.on_finish(&report());
        assert!(active.make_writer().bar.is_none());
    }

    #[test]
    fn test_empty_batch_leaves_no_active_bar() {
        let active = ActiveBar::default();
        let mut observer = ProgressObserver::new(active.clone());

        observer.on_start(OperationKind::Pull, 0);
        assert!(active.make_writer().bar.is_none());
        observer.on_finish(&report());
    }
}
