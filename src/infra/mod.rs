// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns shared by both pipelines:
//
//   checkpoint.rs — model weights and run-config persistence
//                   (Burn CompactRecorder + JSON)
//   metrics.rs    — per-epoch CSV logging and the error
//                   statistics behind the fine-tune report
//   plot.rs       — minimal SVG line charts for loss curves and
//                   per-sample diagnostics

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Metrics CSV logger and error statistics
pub mod metrics;

/// SVG line-chart rendering
pub mod plot;
