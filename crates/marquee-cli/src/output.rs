use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Table};
use owo_colors::OwoColorize;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    #[value(name = "json-pretty")]
    JsonPretty,
}

pub struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Human => println!("{} {}", "✓".green(), msg.as_ref()),
            _ => self.print_json(&json!({ "type": "success", "message": msg.as_ref() })),
        }
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        // Errors are shown even in quiet mode
        match self.format {
            OutputFormat::Human => eprintln!("{} {}", "✗".red(), msg.as_ref()),
            _ => self.print_json(&json!({ "type": "error", "message": msg.as_ref() })),
        }
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Human => println!("{}", msg.as_ref()),
            _ => self.print_json(&json!({ "type": "info", "message": msg.as_ref() })),
        }
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Human => println!("{} {}", "⚠".yellow(), msg.as_ref()),
            _ => self.print_json(&json!({ "type": "warning", "message": msg.as_ref() })),
        }
    }

    /// Tabular data: a table for humans, the raw value otherwise.
    pub fn table<S: Into<String>>(
        &self,
        headers: Vec<&str>,
        rows: Vec<Vec<S>>,
        json_value: &serde_json::Value,
    ) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Human => {
                let mut table = Table::new();
                table.load_preset(UTF8_FULL_CONDENSED).set_header(headers);
                for row in rows {
                    table.add_row(row.into_iter().map(Into::into).collect::<Vec<String>>());
                }
                println!("{table}");
            }
            _ => self.print_json(json_value),
        }
    }

    pub fn json(&self, data: &serde_json::Value) {
        if self.quiet {
            return;
        }
        self.print_json(data);
    }

    fn print_json(&self, data: &serde_json::Value) {
        match self.format {
            OutputFormat::JsonPretty => {
                println!("{}", serde_json::to_string_pretty(data).unwrap_or_default())
            }
            _ => println!("{}", serde_json::to_string(data).unwrap_or_default()),
        }
    }
}
