pub mod camera;
pub mod hit;

pub use camera::OrthoCamera;
