mod aggregate;
mod record;

pub use aggregate::*;
pub use record::*;
