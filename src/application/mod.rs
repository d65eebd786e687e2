// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// One use case per pipeline. This layer coordinates the data,
// ml, and infra layers; it holds no model math and does no
// argument parsing.

// The blend-weight training workflow (repeat runs)
pub mod blend_use_case;

// The fine-tune-and-report workflow
pub mod finetune_use_case;
