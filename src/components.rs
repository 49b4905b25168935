pub mod canvas;
pub mod theme;
