pub mod normal;
pub mod ridge;
