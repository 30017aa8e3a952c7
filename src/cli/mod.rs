pub mod picker;
pub mod render;
pub mod sweep;
pub mod update;
