pub mod collect;

pub use collect::{PartialWindow, collect_window, fetch_window, fetch_window_partial};
