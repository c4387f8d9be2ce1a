// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Single pass over a simulation log, building the [`InstructionTable`].

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::classifier::LineClassifier;
use crate::table::InstructionTable;

/// Counts gathered while reading a log.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ReadStats {
    /// Total number of lines read.
    pub lines: usize,

    /// Lines starting with the trace marker (including malformed ones).
    pub trace_lines: usize,

    /// Lines without the trace marker.
    pub ignored: usize,
}

/// Read every line of `reader` into a new [`InstructionTable`].
///
/// Lines are not required to be valid UTF-8; invalid sequences are replaced
/// before classification. Only I/O errors are returned, all problems with
/// the content are recorded as anomalies in the table.
pub fn read_log<R: BufRead>(
    reader: R,
    classifier: &LineClassifier,
) -> io::Result<(InstructionTable, ReadStats)> {
    let mut table = InstructionTable::new();
    let mut stats = ReadStats::default();

    for (idx, bytes) in reader.split(b'\n').enumerate() {
        let bytes = bytes?;
        let line = String::from_utf8_lossy(&bytes);
        let line_num = idx + 1;
        stats.lines += 1;

        match classifier.classify(&line) {
            Ok(Some(trace_line)) => {
                stats.trace_lines += 1;
                table.apply(line_num, trace_line);
            }
            Ok(None) => stats.ignored += 1,
            Err(e) => {
                stats.trace_lines += 1;
                table.record_malformed(line_num, e);
            }
        }
    }

    Ok((table, stats))
}

/// Read a log file from `path`, or standard input when `path` is `None` or
/// `-`.
pub fn read_log_from(
    path: Option<&Path>,
    classifier: &LineClassifier,
) -> io::Result<(InstructionTable, ReadStats)> {
    match path {
        Some(path) if path != Path::new("-") => {
            let file = File::open(path).map_err(|e| {
                io::Error::new(e.kind(), format!("unable to open {}: {e}", path.display()))
            })?;
            read_log(BufReader::new(file), classifier)
        }
        _ => read_log(io::stdin().lock(), classifier),
    }
}
