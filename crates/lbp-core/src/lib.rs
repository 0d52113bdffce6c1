pub mod consts;
pub mod error;
pub mod io;
pub mod lbp;
pub mod sample;
