pub mod menu;
pub mod setup;
pub mod ui;
