//! UI layer for the desktop form: app shell, screens, and the coordinate map.

pub mod app;
pub mod map;

pub use app::CollectPointApp;
