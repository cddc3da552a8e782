//! Demo scene
//!
//! A small host scene and a screen wired through two containers, used by the
//! `scenedi` binary and as an end-to-end exercise of the library.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`scene`] | Node arena implementing `ComponentLocator` |
//! | [`screen`] | Widgets, palette, controller and their registrations |
//! | [`runner`] | Scripted run returning a [`DemoSummary`] |

pub mod runner;
pub mod scene;
pub mod screen;

pub use runner::{DemoSummary, run_demo};
pub use scene::{NodeId, Scene};
pub use screen::{Color, Image, Palette, ScreenController, ViewImg};
