pub mod surface;
pub mod surface_pool;
pub mod visual_filter;
