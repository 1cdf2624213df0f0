//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde_json::Value;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print an informational message (suppressed in quiet and JSON modes)
    pub fn message(&self, message: &str) {
        if matches!(self.format, OutputFormat::Human) {
            println!("{}", message);
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json | OutputFormat::Quiet => {}
        }
    }

    /// Print a raw server payload
    pub fn print_value(&self, value: &Value) {
        match self.format {
            OutputFormat::Human | OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a list payload as one line per row using the given columns
    pub fn print_rows(&self, rows: &Value, columns: &[&str]) {
        match self.format {
            OutputFormat::Human => {
                let Some(rows) = rows.as_array() else {
                    self.print_value(rows);
                    return;
                };
                if rows.is_empty() {
                    println!("No results.");
                    return;
                }
                for row in rows {
                    let cells: Vec<String> = columns
                        .iter()
                        .map(|col| display_cell(&row[*col]))
                        .collect();
                    println!("{}", cells.join(" | "));
                }
                println!("\n{} row(s)", rows.len());
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(rows).unwrap_or_default());
            }
            OutputFormat::Quiet => {
                if let Some(rows) = rows.as_array() {
                    for row in rows {
                        println!("{}", display_cell(&row["id"]));
                    }
                }
            }
        }
    }
}

/// Render one JSON cell without quotes around strings
fn display_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}
