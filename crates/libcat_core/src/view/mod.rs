//! Presentation-side state for catalog windows.
//!
//! # Responsibility
//! - Mirror the rows of one window in memory (`ViewCache`).
//! - Couple each window to its repository and lifecycle (`Window`).

pub mod cache;
pub mod window;

pub use cache::{CacheError, CachedRow, ViewCache};
pub use window::{
    AssignmentWindow, EntityWindow, Window, WindowError, WindowResult, WindowSource, WindowState,
};
