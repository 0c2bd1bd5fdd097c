pub mod check;
pub mod scale;
