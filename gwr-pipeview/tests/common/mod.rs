// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

#![allow(dead_code)]

use gwr_pipeview::classifier::LineClassifier;
use gwr_pipeview::emitter::{EmitOptions, emit};
use gwr_pipeview::reader::{ReadStats, read_log};
use gwr_pipeview::table::InstructionTable;

/// Build a table from log text using a cycle time of 1.
#[must_use]
pub fn read_unscaled(log: &str) -> (InstructionTable, ReadStats) {
    read_log(log.as_bytes(), &LineClassifier::new(1)).expect("reading from memory cannot fail")
}

#[must_use]
pub fn emit_to_string(table: &InstructionTable, options: &EmitOptions) -> String {
    let mut out = Vec::new();
    emit(table, options, &mut out).expect("writing to memory cannot fail");
    String::from_utf8(out).expect("trace should be valid UTF-8")
}

/// The seven lines written for one uop.
#[must_use]
pub fn uop(fetch: i64, pc: u64, index: usize, seq: u64, label: &str, stages: [i64; 3]) -> String {
    let [dispatch, issue, retire] = stages;
    format!(
        "O3PipeView:fetch:{fetch}:0x{pc:x}:{index}:{seq}:{label}\n\
         O3PipeView:decode:0\n\
         O3PipeView:rename:0\n\
         O3PipeView:dispatch:{dispatch}\n\
         O3PipeView:issue:{issue}\n\
         O3PipeView:complete:0\n\
         O3PipeView:retire:{retire}\n"
    )
}
