pub mod animation;
pub mod bodies;
pub mod controls;
pub mod graph;
pub mod particles;
