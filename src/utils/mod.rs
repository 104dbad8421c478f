pub mod image;
pub mod time;
