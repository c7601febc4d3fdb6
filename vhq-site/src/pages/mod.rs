pub mod analyze;
pub mod smart;
