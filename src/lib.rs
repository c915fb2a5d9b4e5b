pub mod app;
pub mod chest;
pub mod config;
pub mod fusion;
pub mod geometry;
pub mod measure;
pub mod projection;
pub mod render;
pub mod sensor;
pub mod skeleton;
