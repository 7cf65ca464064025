pub mod alpha_premultiply;
pub mod apply_alpha_mask;
pub mod clean_mask;
pub mod erode;
pub mod fit_canvas;
pub mod nlmeans;
pub mod padding;
pub mod smooth_edges;
pub mod transparency;
