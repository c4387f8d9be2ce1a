// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Write the instruction table as an o3-pipeview trace.
//!
//! Each element group of a multi-cycle vector instruction is rendered as a
//! separate uop. "Retirement" of a uop is the first writeback of its element
//! group, which is the earliest point at which chaining could begin. For
//! loads the issue cycle is when the request leaves the memory interface.
//!
//! The fetch cycle is not present in the simulation log, so it is always
//! placed one time unit before dispatch.

use std::fmt;
use std::io::{self, Write};

use itertools::{Itertools, Position};

use crate::table::InstructionTable;
use crate::types::{Cycle, Instruction, KindSet, SeqNum};

/// Prefix of every line in the output trace.
pub const OUTPUT_MARKER: &str = "O3PipeView";

pub const START_GLYPH: &str = "┏ ";
pub const CONTINUATION_GLYPH: &str = "┣ ";
pub const END_GLYPH: &str = "┗ ";

/// Which instructions to emit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EmitOptions {
    pub select: KindSet,

    /// Emit a placeholder uop for instructions that dispatched but never
    /// issued.
    pub unretired: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            select: KindSet::ALL,
            unretired: false,
        }
    }
}

/// One uop in the output trace.
///
/// The decode, rename and complete stages are not tracked and are always
/// written as 0. An `issue` or `retire` of 0 means the stage was not reached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageRecord {
    pub fetch: Cycle,
    pub pc: u64,

    /// Position of this uop within its instruction.
    pub index: usize,
    pub seq: SeqNum,

    /// Disassembly, including any glyph prefix.
    pub label: String,
    pub dispatch: Cycle,
    pub issue: Cycle,
    pub retire: Cycle,
}

impl fmt::Display for StageRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "{OUTPUT_MARKER}:fetch:{}:0x{:x}:{}:{}:{}",
            self.fetch, self.pc, self.index, self.seq, self.label
        )?;
        writeln!(f, "{OUTPUT_MARKER}:decode:0")?;
        writeln!(f, "{OUTPUT_MARKER}:rename:0")?;
        writeln!(f, "{OUTPUT_MARKER}:dispatch:{}", self.dispatch)?;
        writeln!(f, "{OUTPUT_MARKER}:issue:{}", self.issue)?;
        writeln!(f, "{OUTPUT_MARKER}:complete:0")?;
        writeln!(f, "{OUTPUT_MARKER}:retire:{}", self.retire)
    }
}

/// Approximate fetch cycle for an instruction.
#[must_use]
pub fn fetch_cycle(insn: &Instruction) -> Cycle {
    insn.dispatch_cycle.saturating_sub(1)
}

/// Glyph used to join the uops of a multi-uop instruction.
#[must_use]
pub fn glyph_prefix(position: Position) -> &'static str {
    match position {
        Position::Only => "",
        Position::First => START_GLYPH,
        Position::Middle => CONTINUATION_GLYPH,
        Position::Last => END_GLYPH,
    }
}

/// Build the uops for a single instruction.
#[must_use]
pub fn records_for(seq: SeqNum, insn: &Instruction, options: &EmitOptions) -> Vec<StageRecord> {
    if !options.select.contains(insn.kind) {
        return Vec::new();
    }

    let fetch = fetch_cycle(insn);

    if insn.issue_events.is_empty() {
        if !options.unretired {
            return Vec::new();
        }
        return vec![StageRecord {
            fetch,
            pc: insn.pc,
            index: 0,
            seq,
            label: insn.dasm.clone(),
            dispatch: insn.dispatch_cycle,
            issue: 0,
            retire: 0,
        }];
    }

    insn.issue_events
        .iter()
        .with_position()
        .enumerate()
        .map(|(index, (position, issue))| StageRecord {
            fetch,
            pc: insn.pc,
            index,
            seq,
            label: format!("{}{}", glyph_prefix(position), insn.dasm),
            dispatch: insn.dispatch_cycle,
            issue: issue.cycle,
            retire: insn.first_retire_for(issue.segment).unwrap_or(0),
        })
        .collect()
}

/// Build every uop in the table in first-dispatch order.
#[must_use]
pub fn stage_records(table: &InstructionTable, options: &EmitOptions) -> Vec<StageRecord> {
    table
        .iter()
        .flat_map(|(seq, insn)| records_for(seq, insn, options))
        .collect()
}

/// Write the trace for the whole table, returning the number of uops written.
pub fn emit<W: Write>(
    table: &InstructionTable,
    options: &EmitOptions,
    writer: &mut W,
) -> io::Result<usize> {
    let mut num_uops = 0;
    for (seq, insn) in table.iter() {
        for record in records_for(seq, insn, options) {
            write!(writer, "{record}")?;
            num_uops += 1;
        }
    }
    writer.flush()?;
    Ok(num_uops)
}
