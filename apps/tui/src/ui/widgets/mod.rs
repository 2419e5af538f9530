pub mod map;
pub mod popup;
