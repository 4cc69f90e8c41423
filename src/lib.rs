// Library surface for the binary, headless integration tests and reuse.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod history;
pub mod logging;
pub mod passage;
pub mod runtime;
pub mod scorer;
pub mod session;
pub mod ui;
