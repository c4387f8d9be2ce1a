// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Convert a Saturn vector unit simulation log into a trace for the gem5
//! `o3-pipeview.py` visualizer.
//!
//! The conversion is a single pass:
//!  - the [classifier] decodes `PipeView:` lines into typed trace lines
//!  - the [table] correlates them by sequence number into instructions
//!  - once the log is exhausted the [emitter] writes one uop per element
//!    group of each instruction
//!
//! ```
//! use gwr_pipeview::classifier::LineClassifier;
//! use gwr_pipeview::emitter::{EmitOptions, emit};
//! use gwr_pipeview::reader::read_log;
//!
//! let log = "PipeView:5:dispatch:10:1000:0:0:vadd.vv\n\
//!            PipeView:5:vxsop:12:0\n\
//!            PipeView:5:write.vrf:15:0\n";
//! let (table, _stats) = read_log(log.as_bytes(), &LineClassifier::new(1)).unwrap();
//!
//! let mut out = Vec::new();
//! emit(&table, &EmitOptions::default(), &mut out).unwrap();
//! assert!(String::from_utf8(out).unwrap().starts_with(
//!     "O3PipeView:fetch:9:0x1000:0:5:vadd.vv\n"
//! ));
//! ```

pub mod classifier;
pub mod config;
pub mod emitter;
pub mod reader;
pub mod table;
pub mod types;
