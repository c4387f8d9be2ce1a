// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! The instruction table.
//!
//! Owns every [`Instruction`] seen in the log, keyed by sequence number and
//! kept in first-dispatch order so that emission order is deterministic.
//! Events for sequence numbers that have not been dispatched are dropped and
//! recorded as an [`Anomaly`].

use std::fmt;

use indexmap::IndexMap;
use log::{debug, error, warn};

use crate::classifier::{Effect, TraceLine};
use crate::types::{Cycle, Event, InsnKind, Instruction, PipeViewError, SeqNum};

/// Something unexpected found in the log. None of these stop processing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnomalyKind {
    /// A trace line that could not be decoded.
    Malformed(PipeViewError),

    /// An issue or retire event for a sequence number never dispatched.
    UnknownSequence(SeqNum),

    /// A second dispatch for an existing sequence number.
    DuplicateDispatch(SeqNum),

    /// An event implying a different memory kind to the one already assigned.
    KindConflict {
        seq: SeqNum,
        kind: InsnKind,
        implied: InsnKind,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Anomaly {
    /// Line number (1-based) in the input log.
    pub line: usize,
    pub kind: AnomalyKind,
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let line = self.line;
        match &self.kind {
            AnomalyKind::Malformed(e) => {
                write!(f, "malformed trace line (line {line}): {}", e.0)
            }
            AnomalyKind::UnknownSequence(seq) => {
                write!(f, "unknown sequence number {seq} (line {line})")
            }
            AnomalyKind::DuplicateDispatch(seq) => {
                write!(f, "duplicate dispatch of sequence number {seq} (line {line})")
            }
            AnomalyKind::KindConflict { seq, kind, implied } => {
                write!(
                    f,
                    "sequence number {seq} already classified as {kind}, ignoring {implied} (line {line})"
                )
            }
        }
    }
}

/// Ordered mapping from sequence number to [`Instruction`].
#[derive(Debug, Default)]
pub struct InstructionTable {
    insns: IndexMap<SeqNum, Instruction>,
    anomalies: Vec<Anomaly>,
}

impl InstructionTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a classified trace line read from input line `line`.
    pub fn apply(&mut self, line: usize, trace_line: TraceLine) {
        match trace_line {
            TraceLine::Dispatch {
                seq,
                cycle,
                pc,
                dasm,
            } => self.record_dispatch(line, seq, pc, &dasm, cycle),
            TraceLine::Event {
                seq,
                effect: Effect::Issue,
                event,
                implies,
            } => {
                self.record_issue(line, seq, event.cycle, event.segment, implies);
            }
            TraceLine::Event {
                seq,
                effect: Effect::Retire,
                event,
                implies,
            } => {
                self.record_retire(line, seq, event.cycle, event.segment, implies);
            }
            TraceLine::Unhandled { seq, label } => {
                debug!("ignoring label '{label}' for sequence number {seq} (line {line})");
            }
        }
    }

    /// Record a trace line that failed to decode.
    pub fn record_malformed(&mut self, line: usize, err: PipeViewError) {
        self.push_anomaly(line, AnomalyKind::Malformed(err));
    }

    /// Create the instruction for `seq` dispatched on input line `line`.
    ///
    /// A repeated dispatch replaces the existing record but keeps its place in
    /// the emission order.
    pub fn record_dispatch(
        &mut self,
        line: usize,
        seq: SeqNum,
        pc: u64,
        dasm: &str,
        cycle: Cycle,
    ) {
        let insn = Instruction::new(pc, dasm, cycle);
        if self.insns.insert(seq, insn).is_some() {
            self.push_anomaly(line, AnomalyKind::DuplicateDispatch(seq));
        }
    }

    /// Append an issue event to `seq`, read from input line `line`.
    ///
    /// Returns `false` if the sequence number is unknown and the event was
    /// dropped.
    pub fn record_issue(
        &mut self,
        line: usize,
        seq: SeqNum,
        cycle: Cycle,
        segment: u64,
        implies: Option<InsnKind>,
    ) -> bool {
        self.record_event(line, seq, Effect::Issue, Event::new(cycle, segment), implies)
    }

    /// Append a retire event to `seq`, read from input line `line`.
    ///
    /// Returns `false` if the sequence number is unknown and the event was
    /// dropped.
    pub fn record_retire(
        &mut self,
        line: usize,
        seq: SeqNum,
        cycle: Cycle,
        segment: u64,
        implies: Option<InsnKind>,
    ) -> bool {
        self.record_event(line, seq, Effect::Retire, Event::new(cycle, segment), implies)
    }

    fn record_event(
        &mut self,
        line: usize,
        seq: SeqNum,
        effect: Effect,
        event: Event,
        implies: Option<InsnKind>,
    ) -> bool {
        let Some(insn) = self.insns.get_mut(&seq) else {
            self.push_anomaly(line, AnomalyKind::UnknownSequence(seq));
            return false;
        };

        match effect {
            Effect::Issue => insn.issue_events.push(event),
            Effect::Retire => insn.retire_events.push(event),
        }

        let conflict = match implies {
            Some(implied) if insn.kind == InsnKind::Compute => {
                insn.kind = implied;
                None
            }
            Some(implied) if insn.kind != implied => Some(AnomalyKind::KindConflict {
                seq,
                kind: insn.kind,
                implied,
            }),
            _ => None,
        };
        if let Some(conflict) = conflict {
            self.push_anomaly(line, conflict);
        }
        true
    }

    fn push_anomaly(&mut self, line: usize, kind: AnomalyKind) {
        let anomaly = Anomaly { line, kind };
        match &anomaly.kind {
            AnomalyKind::Malformed(_) => error!("{anomaly}"),
            _ => warn!("{anomaly}"),
        }
        self.anomalies.push(anomaly);
    }

    #[must_use]
    pub fn get(&self, seq: SeqNum) -> Option<&Instruction> {
        self.insns.get(&seq)
    }

    #[must_use]
    pub fn contains(&self, seq: SeqNum) -> bool {
        self.insns.contains_key(&seq)
    }

    /// Iterate over instructions in first-dispatch order.
    pub fn iter(&self) -> impl Iterator<Item = (SeqNum, &Instruction)> {
        self.insns.iter().map(|(seq, insn)| (*seq, insn))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.insns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.insns.is_empty()
    }

    #[must_use]
    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }
}
