// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Library surface of status-time-report: the status-timeline and business-calendar engine plus its ingest/report layers
// role: module/aggregation
// outputs: Public modules; the binary in main.rs is a thin wrapper over cli + processor
// invariants: Engine modules (calendar, timeline, summarize, aggregate, rollup, report) perform no I/O
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod aggregate;
pub mod calendar;
pub mod catalog;
pub mod cli;
pub mod ext;
pub mod ingest;
pub mod manifest;
pub mod model;
pub mod params;
pub mod processor;
pub mod report;
pub mod rollup;
pub mod summarize;
pub mod timeline;
pub mod util;
