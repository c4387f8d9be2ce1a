// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Decode raw simulation log lines into typed trace lines.
//!
//! Trace lines start with [`MARKER`] and are colon-separated:
//!
//! ```text
//! PipeView:<seq>:<label>:<cycle>[:<label specific fields>]
//! ```
//!
//! The `dispatch` label carries the program counter in field 4 and the
//! disassembly in field 7. All other labels are looked up in
//! [`LABEL_TABLE`], which says whether the line is an issue or a retire event,
//! what it implies about the instruction kind and which field holds the
//! element group (segment) index.

use crate::pipeview_error;
use crate::types::{Cycle, Event, InsnKind, PipeViewError, PipeViewResult, SeqNum};

/// Prefix that identifies a trace line.
pub const MARKER: &str = "PipeView:";

const DISPATCH_LABEL: &str = "dispatch";

const SEQ_FIELD: usize = 1;
const LABEL_FIELD: usize = 2;
const CYCLE_FIELD: usize = 3;
const PC_FIELD: usize = 4;
const DASM_FIELD: usize = 7;

/// The default number of output time units per simulator cycle.
pub const DEFAULT_CYCLE_TIME: Cycle = 1000;

/// Which list of an instruction an event is appended to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    Issue,
    Retire,
}

/// How a label in the log is matched.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LabelMatch {
    Exact(&'static str),
    Prefix(&'static str),
}

impl LabelMatch {
    #[must_use]
    pub fn matches(&self, label: &str) -> bool {
        match self {
            LabelMatch::Exact(l) => label == *l,
            LabelMatch::Prefix(p) => label.starts_with(p),
        }
    }
}

/// One row of the label lookup table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LabelRule {
    pub label: LabelMatch,
    pub effect: Effect,

    /// Kind the instruction becomes when this label is seen (`None` leaves it
    /// unchanged).
    pub implies: Option<InsnKind>,

    /// Index of the field holding the segment index.
    pub segment_field: usize,
}

/// Mapping from event labels to the operation they perform on an instruction.
pub const LABEL_TABLE: &[LabelRule] = &[
    // Vector compute issue
    LabelRule {
        label: LabelMatch::Exact("vxsop"),
        effect: Effect::Issue,
        implies: None,
        segment_field: 4,
    },
    // Vector store data issue
    LabelRule {
        label: LabelMatch::Exact("vssop"),
        effect: Effect::Issue,
        implies: Some(InsnKind::Store),
        segment_field: 4,
    },
    // Vector load address issue
    LabelRule {
        label: LabelMatch::Exact("lasop"),
        effect: Effect::Issue,
        implies: Some(InsnKind::Load),
        segment_field: 5,
    },
    // Vector store address retire
    LabelRule {
        label: LabelMatch::Exact("sasop"),
        effect: Effect::Retire,
        implies: Some(InsnKind::Store),
        segment_field: 5,
    },
    // Register file writeback
    LabelRule {
        label: LabelMatch::Prefix("write."),
        effect: Effect::Retire,
        implies: None,
        segment_field: 4,
    },
];

/// Find the rule for an event label.
#[must_use]
pub fn lookup_label(label: &str) -> Option<&'static LabelRule> {
    LABEL_TABLE.iter().find(|rule| rule.label.matches(label))
}

/// A decoded trace line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TraceLine {
    Dispatch {
        seq: SeqNum,
        cycle: Cycle,
        pc: u64,
        dasm: String,
    },
    Event {
        seq: SeqNum,
        effect: Effect,
        event: Event,
        implies: Option<InsnKind>,
    },
    /// A trace line with a label that has no effect on the table.
    Unhandled { seq: SeqNum, label: String },
}

/// Turns log lines into [`TraceLine`]s, scaling cycles as it goes.
#[derive(Copy, Clone, Debug)]
pub struct LineClassifier {
    cycle_time: Cycle,
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_CYCLE_TIME)
    }
}

impl LineClassifier {
    #[must_use]
    pub fn new(cycle_time: Cycle) -> Self {
        Self { cycle_time }
    }

    /// Classify a single line.
    ///
    /// Returns `Ok(None)` for lines that are not trace lines and an error for
    /// trace lines that are missing fields or hold unparsable values.
    pub fn classify(&self, line: &str) -> PipeViewResult<Option<TraceLine>> {
        if !line.starts_with(MARKER) {
            return Ok(None);
        }

        let fields: Vec<&str> = line.trim_end().split(':').collect();
        require_fields(&fields, CYCLE_FIELD + 1, "trace")?;

        let seq = parse_decimal::<SeqNum>(fields[SEQ_FIELD], "sequence number")?;
        let label = fields[LABEL_FIELD];
        let cycle = self.scale(parse_decimal::<Cycle>(fields[CYCLE_FIELD], "cycle")?)?;

        if label == DISPATCH_LABEL {
            require_fields(&fields, DASM_FIELD + 1, label)?;
            let pc = parse_hex(fields[PC_FIELD])?;
            return Ok(Some(TraceLine::Dispatch {
                seq,
                cycle,
                pc,
                dasm: fields[DASM_FIELD].to_owned(),
            }));
        }

        let Some(rule) = lookup_label(label) else {
            return Ok(Some(TraceLine::Unhandled {
                seq,
                label: label.to_owned(),
            }));
        };

        require_fields(&fields, rule.segment_field + 1, label)?;
        let segment = parse_decimal::<u64>(fields[rule.segment_field], "segment index")?;

        Ok(Some(TraceLine::Event {
            seq,
            effect: rule.effect,
            event: Event::new(cycle, segment),
            implies: rule.implies,
        }))
    }

    fn scale(&self, raw: Cycle) -> PipeViewResult<Cycle> {
        match raw.checked_mul(self.cycle_time) {
            Some(cycle) => Ok(cycle),
            None => pipeview_error!(
                "cycle {raw} overflows when scaled by cycle time {}",
                self.cycle_time
            ),
        }
    }
}

fn require_fields(fields: &[&str], required: usize, what: &str) -> PipeViewResult<()> {
    if fields.len() < required {
        return pipeview_error!(
            "{what} line has {} fields, expected at least {required}",
            fields.len()
        );
    }
    Ok(())
}

fn parse_decimal<T: std::str::FromStr>(field: &str, what: &str) -> PipeViewResult<T> {
    match field.trim().parse::<T>() {
        Ok(value) => Ok(value),
        Err(_) => pipeview_error!("invalid {what} '{field}'"),
    }
}

fn parse_hex(field: &str) -> PipeViewResult<u64> {
    let digits = field.trim();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(digits);
    u64::from_str_radix(digits, 16)
        .map_err(|e| PipeViewError(format!("invalid program counter '{field}': {e}")))
}
