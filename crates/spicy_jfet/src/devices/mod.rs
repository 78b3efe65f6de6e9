pub mod jfet;
pub mod limit;
pub mod stamp;
