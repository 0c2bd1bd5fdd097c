pub mod report;
pub mod scale;
