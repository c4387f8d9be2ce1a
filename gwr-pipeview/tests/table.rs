// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

mod common;

use common::read_unscaled;
use gwr_pipeview::table::{Anomaly, AnomalyKind, InstructionTable};
use gwr_pipeview::types::{Event, InsnKind, PipeViewError};

#[test]
fn dispatch_creates_instruction() {
    let mut table = InstructionTable::new();
    table.record_dispatch(1, 5, 0x1000, "vadd.vv", 10);

    let insn = table.get(5).unwrap();
    assert_eq!(insn.pc, 0x1000);
    assert_eq!(insn.dasm, "vadd.vv");
    assert_eq!(insn.dispatch_cycle, 10);
    assert_eq!(insn.kind, InsnKind::Compute);
    assert!(insn.issue_events.is_empty());
    assert!(insn.retire_events.is_empty());
    assert!(table.anomalies().is_empty());
}

#[test]
fn events_append_in_arrival_order() {
    let mut table = InstructionTable::new();
    table.record_dispatch(1, 1, 0, "vadd.vv", 0);
    assert!(table.record_issue(2, 1, 5, 1, None));
    assert!(table.record_issue(3, 1, 4, 0, None));
    assert!(table.record_issue(4, 1, 6, 1, None));
    assert!(table.record_retire(5, 1, 9, 0, None));

    let insn = table.get(1).unwrap();
    assert_eq!(
        insn.issue_events,
        vec![Event::new(5, 1), Event::new(4, 0), Event::new(6, 1)]
    );
    assert_eq!(insn.retire_events, vec![Event::new(9, 0)]);
}

#[test]
fn unknown_sequence_number_is_dropped() {
    let mut table = InstructionTable::new();
    assert!(!table.record_issue(3, 99, 12, 0, None));
    assert!(!table.record_retire(4, 99, 15, 0, None));

    assert!(!table.contains(99));
    assert!(table.is_empty());
    assert_eq!(
        table.anomalies(),
        &[
            Anomaly {
                line: 3,
                kind: AnomalyKind::UnknownSequence(99),
            },
            Anomaly {
                line: 4,
                kind: AnomalyKind::UnknownSequence(99),
            },
        ]
    );
    assert_eq!(
        table.anomalies()[0].to_string(),
        "unknown sequence number 99 (line 3)"
    );
}

#[test]
fn kind_becomes_load_or_store_once() {
    let mut table = InstructionTable::new();
    table.record_dispatch(1, 1, 0, "vle32.v", 0);
    table.record_dispatch(2, 2, 4, "vse32.v", 0);
    table.record_dispatch(3, 3, 8, "vse32.v", 0);

    table.record_issue(4, 1, 1, 0, Some(InsnKind::Load));
    table.record_issue(5, 1, 2, 1, None);
    table.record_issue(6, 2, 1, 0, Some(InsnKind::Store));
    table.record_retire(7, 3, 1, 0, Some(InsnKind::Store));
    table.record_retire(8, 3, 2, 1, Some(InsnKind::Store));

    assert_eq!(table.get(1).unwrap().kind, InsnKind::Load);
    assert_eq!(table.get(2).unwrap().kind, InsnKind::Store);
    assert_eq!(table.get(3).unwrap().kind, InsnKind::Store);
    assert!(table.anomalies().is_empty());
}

#[test]
fn kind_never_reverts() {
    let mut table = InstructionTable::new();
    table.record_dispatch(5, 1, 0, "vle32.v", 0);
    table.record_issue(6, 1, 1, 0, Some(InsnKind::Load));
    table.record_retire(7, 1, 2, 0, Some(InsnKind::Store));

    let insn = table.get(1).unwrap();
    assert_eq!(insn.kind, InsnKind::Load);
    // The event is still kept
    assert_eq!(insn.retire_events, vec![Event::new(2, 0)]);
    assert_eq!(
        table.anomalies(),
        &[Anomaly {
            line: 7,
            kind: AnomalyKind::KindConflict {
                seq: 1,
                kind: InsnKind::Load,
                implied: InsnKind::Store,
            },
        }]
    );
}

#[test]
fn duplicate_dispatch_keeps_position() {
    let (table, _) = read_unscaled(
        "PipeView:1:dispatch:1:100:0:0:vadd.vv
PipeView:2:dispatch:2:104:0:0:vsub.vv
PipeView:1:vxsop:3:0
PipeView:1:dispatch:4:108:0:0:vmul.vv
",
    );

    let order: Vec<u64> = table.iter().map(|(seq, _)| seq).collect();
    assert_eq!(order, vec![1, 2]);

    let insn = table.get(1).unwrap();
    assert_eq!(insn.dasm, "vmul.vv");
    assert_eq!(insn.pc, 0x108);
    assert_eq!(insn.dispatch_cycle, 4);
    assert!(insn.issue_events.is_empty());

    assert_eq!(
        table.anomalies(),
        &[Anomaly {
            line: 4,
            kind: AnomalyKind::DuplicateDispatch(1),
        }]
    );
}

#[test]
fn order_is_dispatch_order_not_numeric() {
    let (table, _) = read_unscaled(
        "PipeView:30:dispatch:1:100:0:0:a
PipeView:10:dispatch:2:104:0:0:b
PipeView:20:dispatch:3:108:0:0:c
",
    );
    let order: Vec<u64> = table.iter().map(|(seq, _)| seq).collect();
    assert_eq!(order, vec![30, 10, 20]);
}

#[test]
fn malformed_lines_are_recorded() {
    let (table, stats) = read_unscaled(
        "PipeView:1:dispatch:1:100:0:0:vadd.vv
PipeView:1:vxsop:2
PipeView:1:vxsop:3:0
",
    );

    assert_eq!(stats.lines, 3);
    assert_eq!(stats.trace_lines, 3);
    assert_eq!(table.get(1).unwrap().issue_events, vec![Event::new(3, 0)]);
    assert_eq!(
        table.anomalies(),
        &[Anomaly {
            line: 2,
            kind: AnomalyKind::Malformed(PipeViewError(
                "vxsop line has 4 fields, expected at least 5".to_string()
            )),
        }]
    );
}

#[test]
fn anomalies_report_the_line_they_came_from() {
    let mut table = InstructionTable::new();
    table.record_dispatch(2, 1, 0, "vadd.vv", 0);
    table.record_malformed(3, PipeViewError("bad".to_string()));
    // An anomaly after a malformed line must not reuse its line number
    assert!(!table.record_issue(9, 42, 1, 0, None));
    table.record_dispatch(12, 1, 4, "vmul.vv", 1);

    let lines: Vec<usize> = table.anomalies().iter().map(|a| a.line).collect();
    assert_eq!(lines, vec![3, 9, 12]);
    assert_eq!(
        table.anomalies()[2].to_string(),
        "duplicate dispatch of sequence number 1 (line 12)"
    );
}
