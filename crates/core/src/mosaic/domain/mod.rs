pub mod crop_bounds;
pub mod mosaic_layout;
pub mod region_extractor;
