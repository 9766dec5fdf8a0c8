//! Output formatting for query results
//!
//! Supports multiple output formats:
//! - Pipe: `nation|revenue`, the result file format (default)
//! - Table: Pretty-printed ASCII table
//! - CSV: Comma-separated values with a header
//! - JSON: JSON array of objects
//!
//! Revenue is always rendered with exactly two decimals, and rows follow
//! the ascending nation-name order of the result map.

use crate::error::Result;
use crate::physical::RevenueByNation;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use tempfile::NamedTempFile;
use tracing::info;

/// Output format for query results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `nation|revenue` lines
    #[default]
    Pipe,
    /// Pretty-printed ASCII table
    Table,
    /// Comma-separated values
    Csv,
    /// JSON array of objects
    Json,
}

impl OutputFormat {
    /// Get all format names for help text
    pub fn all_names() -> &'static [&'static str] {
        &["pipe", "table", "csv", "json"]
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pipe" | "p" => Ok(Self::Pipe),
            "table" | "t" => Ok(Self::Table),
            "csv" | "c" => Ok(Self::Csv),
            "json" | "j" => Ok(Self::Json),
            other => Err(format!(
                "unknown output format '{}', expected one of: {}",
                other,
                Self::all_names().join(", ")
            )),
        }
    }
}

/// Formatter for outputting query results in various formats
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    /// Create a new formatter with the given format
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Get the current format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format results and write to stdout
    pub fn print(&self, results: &RevenueByNation) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        self.write(&mut stdout, results)
    }

    /// Format results and write to the given writer
    pub fn write<W: Write>(&self, writer: &mut W, results: &RevenueByNation) -> io::Result<()> {
        match self.format {
            OutputFormat::Pipe => write_pipe(writer, results),
            OutputFormat::Table => write_table(writer, results),
            OutputFormat::Csv => write_csv(writer, results),
            OutputFormat::Json => write_json(writer, results),
        }
    }

    /// Format as string
    pub fn format_to_string(&self, results: &RevenueByNation) -> String {
        let mut buffer = Vec::new();
        let _ = self.write(&mut buffer, results);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

fn write_pipe<W: Write>(writer: &mut W, results: &RevenueByNation) -> io::Result<()> {
    for (nation, revenue) in results {
        writeln!(writer, "{}|{:.2}", nation, revenue)?;
    }
    Ok(())
}

fn write_table<W: Write>(writer: &mut W, results: &RevenueByNation) -> io::Result<()> {
    const HEADERS: [&str; 2] = ["n_name", "revenue"];

    let rows: Vec<(&str, String)> = results
        .iter()
        .map(|(nation, revenue)| (nation.as_str(), format!("{:.2}", revenue)))
        .collect();
    let name_width = rows
        .iter()
        .map(|(n, _)| n.len())
        .chain([HEADERS[0].len()])
        .max()
        .unwrap_or(0);
    let value_width = rows
        .iter()
        .map(|(_, v)| v.len())
        .chain([HEADERS[1].len()])
        .max()
        .unwrap_or(0);

    let border = format!(
        "+{}+{}+",
        "-".repeat(name_width + 2),
        "-".repeat(value_width + 2)
    );
    writeln!(writer, "{}", border)?;
    writeln!(
        writer,
        "| {:<nw$} | {:<vw$} |",
        HEADERS[0],
        HEADERS[1],
        nw = name_width,
        vw = value_width
    )?;
    writeln!(writer, "{}", border)?;
    for (nation, revenue) in &rows {
        writeln!(
            writer,
            "| {:<nw$} | {:>vw$} |",
            nation,
            revenue,
            nw = name_width,
            vw = value_width
        )?;
    }
    writeln!(writer, "{}", border)
}

fn write_csv<W: Write>(writer: &mut W, results: &RevenueByNation) -> io::Result<()> {
    writeln!(writer, "n_name,revenue")?;
    for (nation, revenue) in results {
        // Quote if contains comma, quote, or newline
        if nation.contains(',') || nation.contains('"') || nation.contains('\n') {
            writeln!(writer, "\"{}\",{:.2}", nation.replace('"', "\"\""), revenue)?;
        } else {
            writeln!(writer, "{},{:.2}", nation, revenue)?;
        }
    }
    Ok(())
}

fn write_json<W: Write>(writer: &mut W, results: &RevenueByNation) -> io::Result<()> {
    if results.is_empty() {
        return writeln!(writer, "[]");
    }

    writeln!(writer, "[")?;
    for (i, (nation, revenue)) in results.iter().enumerate() {
        if i > 0 {
            writeln!(writer, ",")?;
        }
        write!(
            writer,
            "  {{\"n_name\": \"{}\", \"revenue\": {:.2}}}",
            nation.replace('\\', "\\\\").replace('"', "\\\""),
            revenue
        )?;
    }
    writeln!(writer, "\n]")
}

/// Write results in pipe format to `path`
///
/// The file is rendered into a uniquely named temporary file in the same
/// directory and then renamed over `path`, so readers see either the
/// complete file or none. The temporary file is removed on failure.
pub fn write_result_file(path: impl AsRef<Path>, results: &RevenueByNation) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        write_pipe(&mut writer, results)?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    info!(path = %path.display(), rows = results.len(), "wrote result file");
    Ok(())
}
