mod rejection;
mod plummer;

pub use rejection::*;
pub use plummer::*;
