pub mod image_io;

pub use image_io::{load_sample_image, save_codes_png};
