use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{Attribute, Cell, Color as TableColor, Table};
use serde_json::Value;

use lexdesk::errors::FieldError;

use crate::theme::{ICONS, THEME};

#[derive(Clone, Debug, ValueEnum, Default, PartialEq)]
pub enum OutputFormat {
    /// Formatted table output (default)
    #[default]
    Table,
    /// JSON output for scripting
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct GlobalOptions {
    pub output_format: OutputFormat,
    pub quiet: bool,
    pub no_color: bool,
}

pub struct OutputManager {
    pub options: GlobalOptions,
}

impl OutputManager {
    pub fn new(options: GlobalOptions) -> Self {
        Self { options }
    }

    /// Prints a JSON object as a field/value table, or as pretty JSON.
    pub fn document(&self, document: &Value) -> Result<()> {
        if self.options.quiet {
            return Ok(());
        }
        match (&self.options.output_format, document) {
            (OutputFormat::Table, Value::Object(fields)) => {
                let mut table = self.create_table();
                self.add_table_header(&mut table, &["Field", "Value"]);
                for (key, value) in fields {
                    table.add_row(vec![Cell::new(key), Cell::new(render_value(value))]);
                }
                println!("{table}");
            }
            _ => println!("{}", serde_json::to_string_pretty(document)?),
        }
        Ok(())
    }

    pub fn field_errors(&self, errors: &[FieldError]) -> Result<()> {
        if errors.is_empty() {
            return Ok(());
        }
        match self.options.output_format {
            OutputFormat::Json => {
                let rendered: Vec<Value> = errors
                    .iter()
                    .map(|error| {
                        serde_json::json!({
                            "field": error.field,
                            "kind": error.kind.as_str(),
                            "message": error.message,
                            "input": error.input,
                        })
                    })
                    .collect();
                eprintln!("{}", serde_json::to_string_pretty(&rendered)?);
            }
            OutputFormat::Table => {
                let mut table = self.create_table();
                self.add_table_header(&mut table, &["Field", "Kind", "Message", "Input"]);
                for error in errors {
                    let input = error.input.as_ref().map(render_value).unwrap_or_default();
                    table.add_row(vec![
                        Cell::new(&error.field),
                        Cell::new(error.kind.as_str()),
                        Cell::new(&error.message),
                        Cell::new(input),
                    ]);
                }
                eprintln!("{table}");
            }
        }
        Ok(())
    }

    pub fn success(&self, message: &str) {
        if !self.options.quiet {
            println!("{}", self.paint(ICONS.success, message, THEME.success));
        }
    }

    pub fn error(&self, message: &str) {
        eprintln!("{}", self.paint(ICONS.error, message, THEME.error));
    }

    pub fn warning(&self, message: &str) {
        if !self.options.quiet {
            eprintln!("{}", self.paint(ICONS.warning, message, THEME.warning));
        }
    }

    pub fn info(&self, message: &str) {
        if !self.options.quiet {
            println!("{}", self.paint(ICONS.info, message, THEME.info));
        }
    }

    pub fn heading(&self, text: &str) {
        if !self.options.quiet {
            if self.options.no_color {
                println!("\n{text}\n{}", "=".repeat(text.chars().count()));
            } else {
                println!("\n{}", text.color(THEME.primary).bold());
            }
        }
    }

    pub fn key_value(&self, key: &str, value: &str) {
        if !self.options.quiet {
            if self.options.no_color {
                println!("{key}: {value}");
            } else {
                println!("{}: {}", key.color(THEME.key).bold(), value.color(THEME.value));
            }
        }
    }

    pub fn bullet(&self, text: &str) {
        if !self.options.quiet {
            if self.options.no_color {
                println!("  {} {text}", ICONS.bullet);
            } else {
                println!("  {} {text}", ICONS.bullet.color(THEME.muted));
            }
        }
    }

    fn paint(&self, icon: &str, message: &str, color: colored::Color) -> String {
        if self.options.no_color {
            format!("{icon} {message}")
        } else {
            format!("{} {}", icon.color(color), message.color(color))
        }
    }

    fn create_table(&self) -> Table {
        let mut table = Table::new();
        if self.options.no_color {
            table.load_preset(comfy_table::presets::ASCII_FULL);
        } else {
            table.load_preset(comfy_table::presets::UTF8_FULL_CONDENSED);
        }
        table
    }

    fn add_table_header(&self, table: &mut Table, headers: &[&str]) {
        let cells: Vec<Cell> = headers
            .iter()
            .map(|header| {
                let cell = Cell::new(header).add_attribute(Attribute::Bold);
                if self.options.no_color { cell } else { cell.fg(TableColor::Cyan) }
            })
            .collect();
        table.set_header(cells);
    }
}

/// Strings print bare; everything else as compact JSON.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
