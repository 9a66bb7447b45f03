//! Output management and formatting.
//!
//! [`OutputManager`] writes results to stdout. [`StepProgress`] is the
//! core `Progress` port: it draws one spinner per generator step on stderr
//! and reports rollbacks, from whichever thread triggers them.

use std::io::{self, IsTerminal};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use console::Term;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use serde::Serialize;

use railgen_core::{application::ports::Progress, error::RailgenError};

use crate::cli::global::{GlobalArgs, OutputFormat};
use crate::config::AppConfig;

/// Manages CLI output based on configuration.
pub struct OutputManager {
    resolved_format: OutputFormat,
    quiet: bool,
    no_color: bool,
    term: Term,
}

impl OutputManager {
    /// Build an `OutputManager` from parsed CLI flags and loaded config.
    pub fn new(args: &GlobalArgs, config: &AppConfig) -> Self {
        // Resolve Auto → Human (TTY) or Plain (piped/redirected).
        let resolved_format = if args.output_format == OutputFormat::Auto {
            if io::stdout().is_terminal() {
                OutputFormat::Human
            } else {
                OutputFormat::Plain
            }
        } else {
            args.output_format
        };

        Self {
            resolved_format,
            quiet: args.quiet,
            no_color: args.no_color
                || config.output.no_color
                || resolved_format != OutputFormat::Human,
            term: Term::stdout(),
        }
    }

    // ── Public write methods ───────────────────────────────────────────────

    /// Generic message; suppressed in quiet and JSON mode.
    pub fn print(&self, msg: &str) -> io::Result<()> {
        if self.silent() {
            return Ok(());
        }
        self.term.write_line(msg)
    }

    /// Success indicator: `✓ <msg>`.
    pub fn success(&self, msg: &str) -> io::Result<()> {
        if self.silent() {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{2713} {msg}") // ✓
        } else {
            format!("{} {}", "\u{2713}".green().bold(), msg.green())
        };
        self.term.write_line(&line)
    }

    /// Warning indicator: `⚠ <msg>`.
    pub fn warning(&self, msg: &str) -> io::Result<()> {
        if self.silent() {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{26a0} {msg}") // ⚠
        } else {
            format!("{} {}", "\u{26a0}".yellow().bold(), msg.yellow())
        };
        self.term.write_line(&line)
    }

    /// Informational indicator: `ℹ <msg>`.
    pub fn info(&self, msg: &str) -> io::Result<()> {
        if self.silent() {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{2139} {msg}") // ℹ
        } else {
            format!("{} {}", "\u{2139}".blue().bold(), msg.blue())
        };
        self.term.write_line(&line)
    }

    /// Bold cyan header line.
    pub fn header(&self, text: &str) -> io::Result<()> {
        if self.silent() {
            return Ok(());
        }
        let line = if self.no_color {
            text.to_owned()
        } else {
            text.cyan().bold().to_string()
        };
        self.term.write_line(&line)
    }

    /// Key/value rows with the keys padded to a common width.
    pub fn table(&self, rows: &[(&str, String)]) -> io::Result<()> {
        let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        for (key, value) in rows {
            let key = format!("{key:<width$}");
            let line = if self.no_color {
                format!("  {key}  {value}")
            } else {
                format!("  {}  {value}", key.dimmed())
            };
            self.print(&line)?;
        }
        Ok(())
    }

    /// Numbered list.
    pub fn list(&self, items: &[String]) -> io::Result<()> {
        for (i, item) in items.iter().enumerate() {
            self.print(&format!("  {}. {item}", i + 1))?;
        }
        Ok(())
    }

    /// Pretty JSON document; only written in JSON mode.
    pub fn json<T: Serialize>(&self, value: &T) -> io::Result<()> {
        if self.resolved_format != OutputFormat::Json {
            return Ok(());
        }
        let text = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        self.term.write_line(&text)
    }

    /// Progress reporter for a run; see [`StepProgress::set_total`].
    pub fn progress(&self) -> StepProgress {
        let mode = if self.silent() {
            ProgressMode::Silent
        } else if self.resolved_format == OutputFormat::Human && io::stderr().is_terminal() {
            ProgressMode::Spinner
        } else {
            ProgressMode::Lines
        };
        StepProgress::new(mode, self.no_color)
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// The resolved (non-Auto) output format.
    pub fn format(&self) -> OutputFormat {
        self.resolved_format
    }

    fn silent(&self) -> bool {
        self.quiet || self.resolved_format == OutputFormat::Json
    }
}

// ── Progress ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressMode {
    /// Animated spinner per step.
    Spinner,
    /// One line per finished step, for logs and pipes.
    Lines,
    Silent,
}

#[derive(Default)]
struct Current {
    bar: Option<ProgressBar>,
    description: String,
    index: usize,
}

/// Step-by-step progress on stderr.
pub struct StepProgress {
    mode: ProgressMode,
    total: AtomicUsize,
    no_color: bool,
    term: Term,
    current: Mutex<Current>,
}

impl StepProgress {
    pub fn new(mode: ProgressMode, no_color: bool) -> Self {
        Self {
            mode,
            total: AtomicUsize::new(0),
            no_color,
            term: Term::stderr(),
            current: Mutex::new(Current::default()),
        }
    }

    /// Number of steps shown in the `[n/total]` prefix.
    pub fn set_total(&self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
    }

    fn lock(&self) -> MutexGuard<'_, Current> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn spinner(&self, prefix: String, description: &str) -> ProgressBar {
        let template = if self.no_color {
            "{spinner} [{prefix}] {msg}"
        } else {
            "{spinner:.cyan} [{prefix:.dim}] {msg}"
        };
        let style = ProgressStyle::with_template(template)
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        let bar = ProgressBar::new_spinner()
            .with_style(style)
            .with_prefix(prefix)
            .with_message(format!("{description}..."));
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    }

    fn line(&self, mark: &str, text: &str) {
        if self.mode == ProgressMode::Silent {
            return;
        }
        let _ = self.term.write_line(&format!("{mark} {text}"));
    }

    fn mark(&self, ok: bool) -> String {
        match (ok, self.no_color) {
            (true, true) => "\u{2713}".to_string(),
            (false, true) => "\u{2717}".to_string(),
            (true, false) => "\u{2713}".green().bold().to_string(),
            (false, false) => "\u{2717}".red().bold().to_string(),
        }
    }
}

impl Progress for StepProgress {
    fn step_started(&self, _name: &str, description: &str) {
        let mut current = self.lock();
        current.index += 1;
        current.description = description.to_string();
        if self.mode == ProgressMode::Spinner {
            let prefix = format!("{}/{}", current.index, self.total.load(Ordering::Relaxed));
            current.bar = Some(self.spinner(prefix, description));
        }
    }

    fn step_finished(&self, _name: &str) {
        let mut current = self.lock();
        let text = current.description.clone();
        match current.bar.take() {
            Some(bar) => bar.finish_with_message(format!("{} {text}", self.mark(true))),
            None => self.line(&self.mark(true), &text),
        }
    }

    fn step_failed(&self, _name: &str, error: &RailgenError) {
        let mut current = self.lock();
        let text = format!("{}: {error}", current.description);
        match current.bar.take() {
            Some(bar) => bar.abandon_with_message(format!("{} {text}", self.mark(false))),
            None => self.line(&self.mark(false), &text),
        }
    }

    fn rollback_started(&self) {
        if let Some(bar) = self.lock().bar.take() {
            bar.abandon();
        }
        self.line("\u{21ba}", "Rolling back changes..."); // ↺
    }

    fn rollback_finished(&self, succeeded: bool) {
        if succeeded {
            self.line(&self.mark(true), "Rollback complete, previous state restored");
        } else {
            self.line(&self.mark(false), "Rollback incomplete, see the error below");
        }
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────
