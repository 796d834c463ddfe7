//! Output formatting for CLI operations.

use serde_json::json;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use zipvfs::FileAttributes;

/// One row of a directory listing.
pub struct Listed {
    pub path: String,
    pub is_dir: bool,
    pub size: u64,
    pub modified: SystemTime,
}

/// One segment of an archive.
pub struct SegmentRow {
    pub path: PathBuf,
    pub len: u64,
}

/// Trait for output formatting
pub trait OutputFormatter {
    /// Formats the children of one directory
    fn format_listing(&self, entries: &[Listed], long: bool) -> String;

    /// Formats a recursive listing
    fn format_tree(&self, root: &str, entries: &[Listed]) -> String;

    /// Formats the attributes of one path
    fn format_attributes(&self, path: &str, attrs: &FileAttributes) -> String;

    /// Formats the segment list
    fn format_segments(&self, segments: &[SegmentRow]) -> String;
}

/// Human-readable output formatter
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn format_listing(&self, entries: &[Listed], long: bool) -> String {
        let mut output = String::new();

        for entry in entries {
            let name = display_name(&entry.path, entry.is_dir);
            if long {
                let size_str = if entry.is_dir {
                    String::new()
                } else {
                    humanize_bytes(entry.size)
                };
                output.push_str(&format!(
                    "{:>12} {:>19} {}\n",
                    size_str,
                    format_timestamp(entry.modified),
                    name
                ));
            } else {
                output.push_str(&name);
                output.push('\n');
            }
        }

        if long {
            let files: Vec<_> = entries.iter().filter(|e| !e.is_dir).collect();
            let total: u64 = files.iter().map(|e| e.size).sum();
            output.push_str(&format!(
                "{} files, {} directories, {} total\n",
                files.len(),
                entries.len() - files.len(),
                humanize_bytes(total)
            ));
        }

        output
    }

    fn format_tree(&self, root: &str, entries: &[Listed]) -> String {
        let root_depth = depth(root);
        let mut output = format!("/{}\n", root.trim_matches('/'));
        for entry in entries {
            let indent = depth(&entry.path).saturating_sub(root_depth + 1);
            output.push_str(&"  ".repeat(indent + 1));
            output.push_str(&display_name(&entry.path, entry.is_dir));
            output.push('\n');
        }
        output
    }

    fn format_attributes(&self, path: &str, attrs: &FileAttributes) -> String {
        let mut output = String::new();
        let kind = if attrs.is_directory {
            "directory"
        } else {
            "file"
        };

        output.push_str(&format!("  Path:        /{}\n", path.trim_matches('/')));
        output.push_str(&format!("  Type:        {}\n", kind));
        output.push_str(&format!(
            "  Size:        {} ({} bytes)\n",
            humanize_bytes(attrs.size),
            attrs.size
        ));
        output.push_str(&format!(
            "  Packed:      {}\n",
            humanize_bytes(attrs.compressed_size)
        ));
        if let Some(method) = attrs.method {
            output.push_str(&format!("  Method:      {}\n", method));
        }
        if let Some(mode) = attrs.unix_mode {
            output.push_str(&format!("  Mode:        {:o}\n", mode & 0o7777));
        }
        output.push_str(&format!(
            "  Modified:    {}\n",
            format_timestamp(attrs.modified)
        ));
        output.push_str(&format!(
            "  Accessed:    {}\n",
            format_timestamp(attrs.accessed)
        ));
        output.push_str(&format!(
            "  Created:     {}\n",
            format_timestamp(attrs.created)
        ));

        output
    }

    fn format_segments(&self, segments: &[SegmentRow]) -> String {
        let mut output = String::new();
        for segment in segments {
            output.push_str(&format!(
                "{:>12} {}\n",
                humanize_bytes(segment.len),
                segment.path.display()
            ));
        }
        let total: u64 = segments.iter().map(|s| s.len).sum();
        output.push_str(&format!(
            "{} segment(s), {} total\n",
            segments.len(),
            humanize_bytes(total)
        ));
        output
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_listing(&self, entries: &[Listed], _long: bool) -> String {
        let items: Vec<_> = entries.iter().map(listed_json).collect();
        serde_json::to_string_pretty(&items).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_tree(&self, _root: &str, entries: &[Listed]) -> String {
        self.format_listing(entries, true)
    }

    fn format_attributes(&self, path: &str, attrs: &FileAttributes) -> String {
        let obj = json!({
            "path": format!("/{}", path.trim_matches('/')),
            "is_directory": attrs.is_directory,
            "is_regular_file": attrs.is_regular_file,
            "size": attrs.size,
            "compressed_size": attrs.compressed_size,
            "method": attrs.method.map(|m| m.to_string()),
            "unix_mode": attrs.unix_mode,
            "modified": unix_secs(attrs.modified),
            "accessed": unix_secs(attrs.accessed),
            "created": unix_secs(attrs.created),
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_segments(&self, segments: &[SegmentRow]) -> String {
        let items: Vec<_> = segments
            .iter()
            .map(|s| json!({"path": s.path.display().to_string(), "size": s.len}))
            .collect();
        serde_json::to_string_pretty(&items).unwrap_or_else(|_| "[]".to_string())
    }
}

fn listed_json(entry: &Listed) -> serde_json::Value {
    json!({
        "path": format!("/{}", entry.path),
        "is_directory": entry.is_dir,
        "size": entry.size,
        "modified": unix_secs(entry.modified),
    })
}

/// Creates the appropriate formatter based on output format
pub fn create_formatter(format: super::OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        super::OutputFormat::Human => Box::new(HumanFormatter),
        super::OutputFormat::Json => Box::new(JsonFormatter),
    }
}

fn display_name(path: &str, is_dir: bool) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    if is_dir {
        format!("{}/", name)
    } else {
        name.to_string()
    }
}

fn depth(path: &str) -> usize {
    path.split('/').filter(|s| !s.is_empty()).count()
}

fn unix_secs(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Converts bytes to a human-readable string
pub fn humanize_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.1} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Formats a SystemTime as a UTC datetime string
pub fn format_timestamp(time: SystemTime) -> String {
    let Ok(duration) = time.duration_since(UNIX_EPOCH) else {
        return "-".to_string();
    };
    let secs = duration.as_secs();
    let (year, month, day) = civil_from_days((secs / 86_400) as i64);
    let time_of_day = secs % 86_400;

    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        year,
        month,
        day,
        time_of_day / 3600,
        (time_of_day % 3600) / 60,
        time_of_day % 60
    )
}

/// Converts days since 1970-01-01 to a proleptic Gregorian date.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}
