//! Policy and redaction engines.
//!
//! Everything in here is pure: rule compilation, command classification,
//! redaction and usage estimation. No I/O happens below this module
//! except loading a rule set file.

pub mod evaluator;
pub mod pattern_matcher;
pub mod redactor;
pub mod rules;
pub mod usage;
