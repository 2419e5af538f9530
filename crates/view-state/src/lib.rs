//! Platform-free core of the IP geolocation dashboard.
//!
//! The [`controller::ViewController`] owns which record is on screen, the
//! [`dashboard::Dashboard`] turns user commands into controller calls and
//! side effects, and [`projection`] renders a record into display values.
//! Terminal and browser front ends drive the same dashboard.

pub mod address;
pub mod api;
pub mod controller;
pub mod controls;
pub mod dashboard;
pub mod error;
pub mod projection;
pub mod record;
pub mod refresh;
pub mod viewport;

pub use address::{AddressFamily, QueriedAddress};
pub use controller::{ViewController, ViewMode};
pub use dashboard::{Command, Dashboard, Effect, Key};
pub use error::ViewError;
pub use projection::{project, Field, MapMarker, MapView, Projection};
pub use record::IpRecord;
pub use refresh::{Completion, Debouncer, RefreshCycle, RefreshPolicy, RefreshTick};
pub use viewport::Viewport;
