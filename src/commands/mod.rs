pub mod classify;
pub mod plan_input;
pub mod report;

pub use classify::ClassifyCommand;
pub use report::{ReportCommand, ReportRequest};
