// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    disciplines::Report,
    runtime::fail::Fail,
};
use ::std::{
    fs::{
        self,
        File,
    },
    io::{
        BufWriter,
        Write,
    },
    path::{
        Path,
        PathBuf,
    },
};

//======================================================================================================================
// Traits
//======================================================================================================================

/// Destination for discipline results.
pub trait ResultSink {
    /// Stores `rows` under `name`, preceded by `header`.
    fn write_table(&mut self, name: &str, header: &[&str], rows: &[Vec<String>]) -> Result<(), Fail>;

    fn write_report(&mut self, report: &dyn Report) -> Result<(), Fail> {
        self.write_table(report.name(), report.header(), &report.rows())
    }
}

//======================================================================================================================
// Structures
//======================================================================================================================

/// Writes each table to `<dir>/<name>.csv`, replacing any previous file.
pub struct CsvSink {
    dir: PathBuf,
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl CsvSink {
    /// Creates a sink writing into `dir`. The directory is created if needed.
    pub fn new(dir: &Path) -> Result<Self, Fail> {
        fs::create_dir_all(dir)?;
        Ok(Self { dir: dir.to_path_buf() })
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", name))
    }

    fn write_record<W: Write>(out: &mut W, cells: &[&str]) -> Result<(), Fail> {
        let escaped: Vec<String> = cells.iter().map(|cell| Self::escape(cell)).collect();
        writeln!(out, "{}", escaped.join(","))?;
        Ok(())
    }

    /// Quotes a cell if it contains a separator, a quote or a line break.
    fn escape(cell: &str) -> String {
        if cell.contains(|c: char| c == ',' || c == '"' || c == '\n' || c == '\r') {
            format!("\"{}\"", cell.replace('"', "\"\""))
        } else {
            cell.to_string()
        }
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl ResultSink for CsvSink {
    fn write_table(&mut self, name: &str, header: &[&str], rows: &[Vec<String>]) -> Result<(), Fail> {
        let path: PathBuf = self.path_of(name);
        let mut out: BufWriter<File> = BufWriter::new(File::create(&path)?);
        Self::write_record(&mut out, header)?;
        for row in rows {
            let cells: Vec<&str> = row.iter().map(String::as_str).collect();
            Self::write_record(&mut out, &cells)?;
        }
        out.flush()?;
        info!("results saved to {}", path.display());
        Ok(())
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
