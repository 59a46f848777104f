use crate::error::Result;
use crate::record::ProblemResult;
use chrono::{DateTime, Local};
use std::io::{Read, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

/// `zetamac-data-<rfc3339>.<ext>` in the current directory
pub fn default_export_path(format: ExportFormat, now: DateTime<Local>) -> PathBuf {
    PathBuf::from(format!(
        "zetamac-data-{}.{}",
        now.to_rfc3339_opts(chrono::SecondsFormat::Millis, false),
        format.extension()
    ))
}

/// Pretty-printed array of results
pub fn write_json<W: Write>(results: &[ProblemResult], writer: &mut W) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, results)?;
    writeln!(writer)?;
    Ok(())
}

/// `Problem,Time(ms),Timestamp` header, then one row per result with the
/// problem quoted and the time rounded to whole milliseconds
pub fn write_csv<W: Write>(results: &[ProblemResult], writer: &mut W) -> Result<()> {
    writeln!(writer, "Problem,Time(ms),Timestamp")?;
    for r in results {
        writeln!(
            writer,
            "\"{}\",{},{}",
            r.problem.replace('"', "\"\""),
            r.time.round(),
            r.timestamp
        )?;
    }
    Ok(())
}

pub fn export<W: Write>(
    results: &[ProblemResult],
    format: ExportFormat,
    writer: &mut W,
) -> Result<()> {
    match format {
        ExportFormat::Json => write_json(results, writer),
        ExportFormat::Csv => write_csv(results, writer),
    }
}

/// Read a JSON export back into results
pub fn read_json<R: Read>(reader: R) -> Result<Vec<ProblemResult>> {
    Ok(serde_json::from_reader(reader)?)
}
