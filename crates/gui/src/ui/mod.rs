pub mod control_panel;
pub mod properties;
pub mod status_bar;
