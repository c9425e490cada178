//! Literature-service clients

pub mod ads;
pub mod traits;

pub use ads::*;
pub use traits::*;
