//! Terminal output shared by every build in a run.
//!
//! Human mode writes `{status:>12} {message}` lines to stderr and may show a
//! progress bar over the builds. JSON mode writes one event per line to
//! stdout and nothing else.
//!
//! All methods take `&self`. A line is always written with one call, so a
//! single Shell can serve builds on several threads without tearing lines.

use std::fmt::Display;
use std::io::{self, IsTerminal, Write};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::core::events::BuildEvent;

/// Human or JSON output. The two never mix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellMode {
    Human {
        verbosity: Verbosity,
        color: ColorChoice,
    },
    Json,
}

impl Default for ShellMode {
    fn default() -> Self {
        ShellMode::Human {
            verbosity: Verbosity::Normal,
            color: ColorChoice::Auto,
        }
    }
}

/// How much a human-mode shell prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only
    Quiet,
    /// Status lines and a progress bar
    #[default]
    Normal,
    /// Status lines, no progress bar
    Verbose,
}

/// When to use ANSI colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("auto") {
            Ok(ColorChoice::Auto)
        } else if s.eq_ignore_ascii_case("always") {
            Ok(ColorChoice::Always)
        } else if s.eq_ignore_ascii_case("never") {
            Ok(ColorChoice::Never)
        } else {
            Err(format!("invalid color `{s}`; expected auto, always or never"))
        }
    }
}

/// The word shown in front of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Preparing,
    Building,
    Finished,
    Validated,
    Skipped,
    Error,
}

impl Status {
    const WIDTH: usize = 12;

    /// Label and ANSI color.
    fn style(self) -> (&'static str, &'static str) {
        match self {
            Status::Preparing => ("Preparing", "\x1b[1;36m"),
            Status::Building => ("Building", "\x1b[1;36m"),
            Status::Finished => ("Finished", "\x1b[1;32m"),
            Status::Validated => ("Validated", "\x1b[1;32m"),
            Status::Skipped => ("Skipped", "\x1b[1;33m"),
            Status::Error => ("error", "\x1b[1;31m"),
        }
    }
}

/// Owner of all user-facing output for one command.
#[derive(Debug)]
pub struct Shell {
    mode: ShellMode,
    color: bool,
    /// JSON lines written so far, in output order
    json_lines: Mutex<Vec<String>>,
    /// Progress bar currently on screen, if any
    bar: Mutex<Option<ProgressBar>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Shell {
    pub fn new(mode: ShellMode) -> Self {
        let color = match &mode {
            ShellMode::Json => false,
            ShellMode::Human { color, .. } => match color {
                ColorChoice::Auto => io::stderr().is_terminal(),
                ColorChoice::Always => true,
                ColorChoice::Never => false,
            },
        };

        Shell {
            mode,
            color,
            json_lines: Mutex::new(Vec::new()),
            bar: Mutex::new(None),
        }
    }

    /// Shell for the global CLI flags. `json` wins over `quiet`/`verbose`.
    pub fn from_flags(quiet: bool, verbose: bool, color: ColorChoice, json: bool) -> Self {
        if json {
            return Shell::new(ShellMode::Json);
        }

        let verbosity = match (quiet, verbose) {
            (true, _) => Verbosity::Quiet,
            (false, true) => Verbosity::Verbose,
            (false, false) => Verbosity::Normal,
        };
        Shell::new(ShellMode::Human { verbosity, color })
    }

    fn verbosity(&self) -> Option<Verbosity> {
        match self.mode {
            ShellMode::Human { verbosity, .. } => Some(verbosity),
            ShellMode::Json => None,
        }
    }

    pub fn is_quiet(&self) -> bool {
        self.verbosity() == Some(Verbosity::Quiet)
    }

    pub fn is_verbose(&self) -> bool {
        self.verbosity() == Some(Verbosity::Verbose)
    }

    pub fn is_json(&self) -> bool {
        self.mode == ShellMode::Json
    }

    /// Print a status line. Quiet mode keeps only errors; JSON mode drops
    /// everything.
    pub fn status(&self, status: Status, msg: impl Display) {
        if self.is_json() || (self.is_quiet() && status != Status::Error) {
            return;
        }

        let line = format!("{} {}", self.format_status(status), msg);
        match lock(&self.bar).as_ref() {
            Some(bar) => bar.suspend(|| eprintln!("{line}")),
            None => eprintln!("{line}"),
        }
    }

    /// Print an error. JSON mode turns it into an `error` event.
    pub fn error(&self, msg: impl Display) {
        if self.is_json() {
            self.write_json(&serde_json::json!({
                "reason": "error",
                "message": msg.to_string(),
            }));
        } else {
            self.status(Status::Error, msg);
        }
    }

    /// Emit a build event. Human mode ignores events.
    pub fn emit(&self, event: &BuildEvent) {
        if self.is_json() {
            self.write_json(&event.to_json());
        }
    }

    fn write_json(&self, value: &serde_json::Value) {
        let line = serde_json::to_string(value).unwrap_or_default();

        // The buffer lock orders stdout too.
        let mut lines = lock(&self.json_lines);
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{line}");
        let _ = stdout.flush();
        lines.push(line);
    }

    /// Every JSON line written so far.
    pub fn json_lines(&self) -> Vec<String> {
        lock(&self.json_lines).clone()
    }

    fn format_status(&self, status: Status) -> String {
        let (label, color) = status.style();
        if self.color {
            format!("{color}{label:>width$}\x1b[0m", width = Status::WIDTH)
        } else {
            format!("{label:>width$}", width = Status::WIDTH)
        }
    }

    /// Whether a progress bar is on screen. Status lines print above it.
    pub fn has_progress_bar(&self) -> bool {
        lock(&self.bar).is_some()
    }

    /// Track `total` builds.
    ///
    /// A bar is drawn only in normal human mode with more than one build.
    /// JSON mode emits `build-progress` events instead.
    pub fn progress(self: &Arc<Self>, total: u64, msg: impl Display) -> Progress {
        let message = msg.to_string();
        let pb = (self.verbosity() == Some(Verbosity::Normal) && total > 1).then(|| {
            let pb = ProgressBar::new(total);
            if let Ok(style) =
                ProgressStyle::default_bar().template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len}")
            {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb.set_message(message.clone());
            pb
        });
        *lock(&self.bar) = pb.clone();

        Progress {
            shell: Arc::clone(self),
            pb,
            total,
            done: 0,
            message,
        }
    }
}

impl Default for Shell {
    fn default() -> Self {
        Shell::new(ShellMode::default())
    }
}

/// Count of finished builds, shown as a bar or as JSON events.
pub struct Progress {
    shell: Arc<Shell>,
    pb: Option<ProgressBar>,
    total: u64,
    done: u64,
    message: String,
}

impl Progress {
    pub fn inc(&mut self, delta: u64) {
        self.done += delta;

        if let Some(pb) = &self.pb {
            pb.inc(delta);
        }

        if self.shell.is_json() {
            self.shell.write_json(&serde_json::json!({
                "reason": "build-progress",
                "current": self.done,
                "total": self.total,
                "unit": "builds",
                "message": self.message,
            }));
        }
    }

    /// Clear the bar. Later status lines print normally.
    pub fn finish(&self) {
        if let Some(pb) = &self.pb {
            pb.finish_and_clear();
            *lock(&self.shell.bar) = None;
        }
    }

    pub fn position(&self) -> u64 {
        self.done
    }
}

/// `0.50s` under a minute, `1.5m` above.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 60.0 {
        format!("{secs:.2}s")
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}
