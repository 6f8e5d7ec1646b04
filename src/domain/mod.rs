pub mod point;
pub mod ports;
