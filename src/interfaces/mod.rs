//! Input/output adapters: the JSON options document and the run report.

pub mod json;
