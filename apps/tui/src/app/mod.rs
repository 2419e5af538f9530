// App module for ipgeo_tui
// Holds the terminal-side state around the shared dashboard and its I/O

pub mod actions;
pub mod clipboard;
pub mod input;
pub mod source;
pub mod state;

pub use actions::AppActions;
pub use input::handle_input;
pub use source::RecordSource;
pub use state::App;
