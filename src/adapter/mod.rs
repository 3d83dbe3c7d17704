pub mod loader;
pub mod sink;
pub mod transform;
