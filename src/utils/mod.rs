pub mod filters;
pub mod format;
