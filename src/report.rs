//! Match record formatting

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Line printed after each text record
pub const SEPARATOR: &str = "--------------------------------------------------";

/// A HID device whose immediate parent is a USB node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRecord {
    pub instance_id: String,
    pub manufacturer: String,
    pub description: String,
    pub parent_id: String,
    pub interface_path: String,
}

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable blocks
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// How records are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub format: OutputFormat,
    /// Print the parent line ahead of each text block
    pub show_parent: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            show_parent: true,
        }
    }
}

/// Render one record, newline terminated
pub fn format_record(record: &MatchRecord, options: &ReportOptions) -> String {
    match options.format {
        OutputFormat::Text => format_text(record, options.show_parent),
        OutputFormat::Json => {
            // String-only fields cannot fail to serialize
            let mut line = serde_json::to_string(record).unwrap_or_default();
            line.push('\n');
            line
        }
    }
}

fn format_text(record: &MatchRecord, show_parent: bool) -> String {
    let mut out = String::new();
    if show_parent {
        out.push_str(&format!("  Parent Device: {}\n", record.parent_id));
    }
    out.push_str(&format!("  HID Device   : {}\n", record.instance_id));
    out.push_str(&format!("  Manufacturer : {}\n", record.manufacturer));
    out.push_str(&format!("  Device Name  : {}\n", record.description));
    out.push_str(SEPARATOR);
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> MatchRecord {
        MatchRecord {
            instance_id: "HID\\A".into(),
            manufacturer: "Acme".into(),
            description: "Acme Keyboard".into(),
            parent_id: "USB\\ROOT_HUB".into(),
            interface_path: "\\\\?\\hid#a".into(),
        }
    }

    #[test]
    fn test_text_block_order() {
        let text = format_record(&record(), &ReportOptions::default());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "  Parent Device: USB\\ROOT_HUB",
                "  HID Device   : HID\\A",
                "  Manufacturer : Acme",
                "  Device Name  : Acme Keyboard",
                SEPARATOR,
            ]
        );
    }

    #[test]
    fn test_text_block_without_parent() {
        let options = ReportOptions {
            show_parent: false,
            ..ReportOptions::default()
        };
        let text = format_record(&record(), &options);
        assert!(text.starts_with("  HID Device   : HID\\A\n"));
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn test_empty_manufacturer_still_printed() {
        let rec = MatchRecord {
            manufacturer: String::new(),
            ..record()
        };
        let text = format_record(&rec, &ReportOptions::default());
        assert!(text.contains("  Manufacturer : \n"));
    }

    #[test]
    fn test_json_line() {
        let options = ReportOptions {
            format: OutputFormat::Json,
            show_parent: true,
        };
        let line = format_record(&record(), &options);
        assert!(line.ends_with('\n'));
        let value: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(value["instance_id"], "HID\\A");
        assert_eq!(value["manufacturer"], "Acme");
        assert_eq!(value["description"], "Acme Keyboard");
        assert_eq!(value["parent_id"], "USB\\ROOT_HUB");
    }
}
