use std::io::{self, Write};
use std::sync::Mutex;
use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use probr_common::macros::PRINT_TARGET;
use tracing::Metadata;
use tracing_subscriber::fmt::MakeWriter;

/// The spinner currently on screen, if any. Log output suspends it while writing.
static ACTIVE: Mutex<Option<ProgressBar>> = Mutex::new(None);

pub struct DiscoverySpinner {
    spinner: ProgressBar,
    total: usize,
}

impl DiscoverySpinner {
    pub fn start(total: usize) -> Self {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&[
                "▁▁▁▁▁",
                "▁▂▂▂▁",
                "▁▄▂▄▁",
                "▂▄▆▄▂",
                "▄▆█▆▄",
                "▂▄▆▄▂",
                "▁▄▂▄▁",
                "▁▂▂▂▁",
            ]);

        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut active) = ACTIVE.lock() {
            *active = Some(pb.clone());
        }

        let spinner = Self { spinner: pb, total };
        spinner.report_progress(0);
        spinner
    }

    pub fn report_progress(&self, done: usize) {
        self.spinner.set_message(format!(
            "Probed {}/{} targets...",
            done.to_string().green().bold(),
            self.total
        ));
    }
}

impl Drop for DiscoverySpinner {
    fn drop(&mut self) {
        if let Ok(mut active) = ACTIVE.lock() {
            *active = None;
        }
        self.spinner.finish_and_clear();
    }
}

/// Sends printed results to stdout and everything else to stderr, hiding the
/// spinner for the duration of each write.
pub struct TerminalWriter;

impl<'a> MakeWriter<'a> for TerminalWriter {
    type Writer = LineWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LineWriter { stdout: false }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        LineWriter {
            stdout: meta.target() == PRINT_TARGET,
        }
    }
}

pub struct LineWriter {
    stdout: bool,
}

impl LineWriter {
    fn write_through(&self, buf: &[u8]) -> io::Result<()> {
        if self.stdout {
            io::stdout().lock().write_all(buf)
        } else {
            io::stderr().lock().write_all(buf)
        }
    }
}

impl Write for LineWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let active = ACTIVE.lock().ok().and_then(|guard| guard.clone());
        match active {
            Some(pb) => pb.suspend(|| self.write_through(buf))?,
            None => self.write_through(buf)?,
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.stdout {
            io::stdout().flush()
        } else {
            io::stderr().flush()
        }
    }
}
