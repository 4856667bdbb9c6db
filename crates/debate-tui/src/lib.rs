// Library root: exposes the app loop, protocol, print mode and TUI so the
// binary and integration tests share one API.

pub mod app;
pub mod print;
pub mod protocol;
pub mod tui;
