//! Output module
//!
//! Progress reporting on stdout and the optional JSON run report.

mod report;
mod reporter;

pub use report::RunReport;
pub use reporter::Reporter;
