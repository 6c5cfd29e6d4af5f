//! Fixed-point arithmetic and lookup tables shared by the EQ engines and the
//! gain compositor.

pub mod fixed;
pub mod tables;
