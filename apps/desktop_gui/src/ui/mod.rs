//! UI layer for the desktop workbench: app shell and panels.

pub mod app;

pub use app::WorkbenchApp;
