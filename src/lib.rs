pub mod args;
pub mod camera;
pub mod capture_loop;
pub mod config;
pub mod frame;
pub mod inference;
pub mod output;
pub mod overlay;
pub mod pipeline;
pub mod processor;
pub mod types;
