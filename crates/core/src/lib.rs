pub mod detection;
pub mod mosaic;
pub mod pipeline;
pub mod shared;
pub mod surfaces;
pub mod video;
