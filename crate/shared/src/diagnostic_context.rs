use crate::location::Location;
use colored::Colorize;
use kasm_error::Severity;
use parking_lot::Mutex;

/// A single finding recorded by a pipeline stage.
///
/// Severity, phase, location, and message are fixed at recording time; only
/// the optional snippet and hint may be attached afterwards through the
/// [`EntryHandle`] returned by [`DiagnosticContext::record`].
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticEntry {
    pub severity: Severity,
    /// Name of the pipeline phase that recorded the entry
    pub phase: String,
    pub location: Location,
    pub message: String,
    pub snippet: Option<String>,
    pub hint: Option<String>,
}

#[derive(Debug, Default)]
struct Inner {
    phase: String,
    entries: Vec<DiagnosticEntry>,
}

/// Thread-safe, append-only sink for pipeline findings.
///
/// The context outlives every stage and collects from each; writers may
/// append from any thread. Entries keep their global insertion order. A
/// single mutex guards the entry list and the phase tag; readers receive
/// snapshots, never references into the guarded state.
pub struct DiagnosticContext {
    primary_path: String,
    inner: Mutex<Inner>,
}

impl DiagnosticContext {
    /// Creates a context for the given primary source file, with an empty
    /// phase tag and no entries.
    pub fn new(primary_path: impl Into<String>) -> Self {
        DiagnosticContext {
            primary_path: primary_path.into(),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Path of the primary source file this context was created for
    pub fn primary_path(&self) -> &str {
        &self.primary_path
    }

    /// Atomically replaces the phase tag applied to subsequent entries
    pub fn set_phase(&self, name: impl Into<String>) {
        self.inner.lock().phase = name.into();
    }

    /// The phase tag currently applied to new entries
    pub fn current_phase(&self) -> String {
        self.inner.lock().phase.clone()
    }

    /// Appends a new entry tagged with the current phase.
    ///
    /// ### Arguments
    /// * `severity` - Severity class of the finding
    /// * `location` - Where the finding points into the source
    /// * `message` - Human-readable description
    ///
    /// ### Returns
    /// A handle that can attach a snippet and a hint to the entry
    pub fn record(
        &self,
        severity: Severity,
        location: Location,
        message: impl Into<String>,
    ) -> EntryHandle<'_> {
        let index = {
            let mut inner = self.inner.lock();
            let entry = DiagnosticEntry {
                severity,
                phase: inner.phase.clone(),
                location,
                message: message.into(),
                snippet: None,
                hint: None,
            };
            inner.entries.push(entry);
            inner.entries.len() - 1
        };
        EntryHandle {
            context: self,
            index,
        }
    }

    /// Location factory using the primary source path
    pub fn loc(&self, line: usize, column: usize) -> Location {
        Location::new(self.primary_path.clone(), line, column)
    }

    /// Location factory for included files
    pub fn loc_in(&self, path: impl Into<String>, line: usize, column: usize) -> Location {
        Location::new(path, line, column)
    }

    /// Returns a snapshot of the recorded entries in insertion order.
    /// Mutating the returned vector does not affect the context.
    pub fn entries(&self) -> Vec<DiagnosticEntry> {
        self.inner.lock().entries.clone()
    }

    /// Snapshot of the error entries only
    pub fn errors(&self) -> Vec<DiagnosticEntry> {
        self.filtered(Severity::Error)
    }

    /// Snapshot of the warning entries only
    pub fn warnings(&self) -> Vec<DiagnosticEntry> {
        self.filtered(Severity::Warning)
    }

    fn filtered(&self, severity: Severity) -> Vec<DiagnosticEntry> {
        self.inner
            .lock()
            .entries
            .iter()
            .filter(|e| e.severity == severity)
            .cloned()
            .collect()
    }

    pub fn has_errors(&self) -> bool {
        self.inner
            .lock()
            .entries
            .iter()
            .any(|e| e.severity == Severity::Error)
    }

    /// Total number of recorded entries
    pub fn count(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn error_count(&self) -> usize {
        self.severity_count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.severity_count(Severity::Warning)
    }

    fn severity_count(&self, severity: Severity) -> usize {
        self.inner
            .lock()
            .entries
            .iter()
            .filter(|e| e.severity == severity)
            .count()
    }

    /// Renders every entry to stderr in insertion order, followed by a
    /// summary line when errors or warnings were recorded. Trace entries are
    /// skipped unless `verbose` is set.
    pub fn report_all(&self, verbose: bool) {
        let entries = self.entries();
        for entry in &entries {
            if entry.severity == Severity::Trace && !verbose {
                continue;
            }
            report_entry(entry);
        }

        let errors = entries
            .iter()
            .filter(|e| e.severity == Severity::Error)
            .count();
        let warnings = entries
            .iter()
            .filter(|e| e.severity == Severity::Warning)
            .count();
        if errors > 0 || warnings > 0 {
            report_summary(errors, warnings);
        }
    }
}

fn report_entry(entry: &DiagnosticEntry) {
    let severity_str = match entry.severity {
        Severity::Error => "error".red().bold(),
        Severity::Warning => "warning".yellow().bold(),
        Severity::Info => "info".blue().bold(),
        Severity::Trace => "trace".dimmed(),
    };

    if entry.phase.is_empty() {
        eprintln!("{}: {}", severity_str, entry.message);
    } else {
        eprintln!("{} [{}]: {}", severity_str, entry.phase, entry.message);
    }
    eprintln!("  {} {}", "-->".yellow(), entry.location);

    if let Some(snippet) = &entry.snippet {
        let pipe = "|".yellow();
        eprintln!("   {}", pipe);
        eprintln!("   {} {}", pipe, snippet);
        eprintln!("   {}", pipe);
    }
    if let Some(hint) = &entry.hint {
        eprintln!("   {}: {}", "help".green().bold(), hint);
    }
    eprintln!();
}

fn report_summary(errors: usize, warnings: usize) {
    let mut parts = Vec::new();

    if errors > 0 {
        parts.push(
            format!("{} {}", errors, if errors == 1 { "error" } else { "errors" })
                .red()
                .to_string(),
        );
    }
    if warnings > 0 {
        parts.push(
            format!(
                "{} {}",
                warnings,
                if warnings == 1 { "warning" } else { "warnings" }
            )
            .yellow()
            .to_string(),
        );
    }

    eprintln!("Assembly finished with {}", parts.join(", "));
}

/// Handle to a freshly recorded entry, allowing the optional snippet and
/// hint to be attached before the handle is dropped. The core fields of the
/// entry stay immutable.
pub struct EntryHandle<'a> {
    context: &'a DiagnosticContext,
    index: usize,
}

impl<'a> EntryHandle<'a> {
    /// Attaches the offending source line to the entry
    pub fn with_snippet(self, snippet: impl Into<String>) -> Self {
        self.context.inner.lock().entries[self.index].snippet = Some(snippet.into());
        self
    }

    /// Attaches a remediation hint to the entry
    pub fn with_hint(self, hint: impl Into<String>) -> Self {
        self.context.inner.lock().entries[self.index].hint = Some(hint.into());
        self
    }
}
