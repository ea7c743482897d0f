pub mod classify;
pub mod composite;
pub mod decontaminate;
pub mod erode;
pub mod feather;
pub mod micro_feather;
pub mod pipeline;
pub mod resolution;
pub mod segmentation;
pub mod smooth;
pub mod upscale;
