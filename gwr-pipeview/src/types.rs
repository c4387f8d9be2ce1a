// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Shared types.

use std::error::Error;
use std::fmt;

/// Time in the units written to the output trace (simulator cycles scaled by
/// the cycle time).
pub type Cycle = i64;

/// Sequence number assigned to an instruction by the simulator.
pub type SeqNum = u64;

#[macro_export]
/// Build a [PipeViewError] from a message (with optional format arguments)
macro_rules! pipeview_error {
    ($($arg:tt)+) => {
        Err($crate::types::PipeViewError(format!($($arg)+)))
    };
}

/// The `PipeViewError` is returned when a line or configuration cannot be
/// used
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipeViewError(pub String);

impl fmt::Display for PipeViewError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Error: {}", self.0)
    }
}

impl Error for PipeViewError {}

pub type PipeViewResult<T> = Result<T, PipeViewError>;

/// A point-in-time occurrence for one element group of an instruction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Event {
    pub cycle: Cycle,

    /// The element group (segment) this event belongs to.
    pub segment: u64,
}

impl Event {
    #[must_use]
    pub fn new(cycle: Cycle, segment: u64) -> Self {
        Self { cycle, segment }
    }
}

/// Classification of an instruction.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum InsnKind {
    #[default]
    Compute,
    Load,
    Store,
}

impl InsnKind {
    pub const ALL: [InsnKind; 3] = [InsnKind::Compute, InsnKind::Load, InsnKind::Store];

    const fn bit(self) -> u8 {
        match self {
            InsnKind::Compute => 0b001,
            InsnKind::Load => 0b010,
            InsnKind::Store => 0b100,
        }
    }
}

impl fmt::Display for InsnKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InsnKind::Compute => {
                write!(f, "compute")
            }
            InsnKind::Load => {
                write!(f, "load")
            }
            InsnKind::Store => {
                write!(f, "store")
            }
        }
    }
}

/// A set of [`InsnKind`]s stored as a bitmask.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KindSet(u8);

impl KindSet {
    pub const EMPTY: KindSet = KindSet(0);
    pub const ALL: KindSet =
        KindSet(InsnKind::Compute.bit() | InsnKind::Load.bit() | InsnKind::Store.bit());

    #[must_use]
    pub const fn only(kind: InsnKind) -> Self {
        KindSet(kind.bit())
    }

    #[must_use]
    pub const fn with(self, kind: InsnKind) -> Self {
        KindSet(self.0 | kind.bit())
    }

    #[must_use]
    pub const fn contains(self, kind: InsnKind) -> bool {
        self.0 & kind.bit() != 0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl Default for KindSet {
    fn default() -> Self {
        KindSet::ALL
    }
}

impl FromIterator<InsnKind> for KindSet {
    fn from_iter<T: IntoIterator<Item = InsnKind>>(iter: T) -> Self {
        iter.into_iter().fold(KindSet::EMPTY, KindSet::with)
    }
}

impl fmt::Display for KindSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let names: Vec<String> = InsnKind::ALL
            .iter()
            .filter(|k| self.contains(**k))
            .map(ToString::to_string)
            .collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

/// Everything known about one simulated instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub dasm: String,
    pub pc: u64,
    pub dispatch_cycle: Cycle,

    /// One event per element group that left the issue/memory interface, in
    /// arrival order.
    pub issue_events: Vec<Event>,

    /// One event per element group written back (or store acknowledged), in
    /// arrival order.
    pub retire_events: Vec<Event>,

    pub kind: InsnKind,
}

impl Instruction {
    #[must_use]
    pub fn new(pc: u64, dasm: &str, dispatch_cycle: Cycle) -> Self {
        Self {
            dasm: dasm.to_owned(),
            pc,
            dispatch_cycle,
            issue_events: Vec::new(),
            retire_events: Vec::new(),
            kind: InsnKind::Compute,
        }
    }

    /// Cycle of the first retire event for `segment`, if there is one.
    #[must_use]
    pub fn first_retire_for(&self, segment: u64) -> Option<Cycle> {
        self.retire_events
            .iter()
            .find(|e| e.segment == segment)
            .map(|e| e.cycle)
    }
}
