pub mod canvas;
pub mod image_surface;
