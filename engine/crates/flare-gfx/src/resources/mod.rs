pub mod buffer;
pub mod vertex;
