//! Prints `ask`/chat replies as they stream in

use colored::Colorize;
use gaia_application::ResponseProgressNotifier;
use gaia_domain::DetectionResult;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::Duration;

struct PrinterState {
    out: Box<dyn Write + Send>,
    spinner: Option<ProgressBar>,
    printed: bool,
    ends_with_newline: bool,
}

/// Writes each chunk to stdout immediately. A spinner runs until the
/// first chunk arrives.
pub struct StreamingPrinter {
    state: Mutex<PrinterState>,
    show_role: bool,
}

impl StreamingPrinter {
    pub fn new() -> Self {
        Self::with_writer(Box::new(io::stdout()))
    }

    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self {
            state: Mutex::new(PrinterState {
                out,
                spinner: None,
                printed: false,
                ends_with_newline: true,
            }),
            show_role: false,
        }
    }

    /// Print the detected role to stderr before the reply.
    pub fn with_role_trace(mut self, show: bool) -> Self {
        self.show_role = show;
        self
    }

    pub fn start_spinner(&self) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Thinking...");
        pb.enable_steady_tick(Duration::from_millis(100));
        self.lock().spinner = Some(pb);
    }

    /// Stop the spinner and end the reply with a newline.
    /// Returns whether anything was printed.
    pub fn finish(&self) -> bool {
        let mut state = self.lock();
        if let Some(pb) = state.spinner.take() {
            pb.finish_and_clear();
        }
        if state.printed && !state.ends_with_newline {
            // Nothing useful to do if stdout is gone
            let _ = writeln!(state.out);
            state.ends_with_newline = true;
        }
        let _ = state.out.flush();
        state.printed
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PrinterState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for StreamingPrinter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseProgressNotifier for StreamingPrinter {
    fn on_role_detected(&self, result: &DetectionResult) {
        if self.show_role {
            eprintln!("{}", crate::ConsoleFormatter::detection(result).dimmed());
        }
    }

    fn on_chunk(&self, chunk: &str) {
        if chunk.is_empty() {
            return;
        }
        let mut state = self.lock();
        if let Some(pb) = state.spinner.take() {
            pb.finish_and_clear();
        }
        let _ = state.out.write_all(chunk.as_bytes());
        let _ = state.out.flush();
        state.printed = true;
        state.ends_with_newline = chunk.ends_with('\n');
    }
}
