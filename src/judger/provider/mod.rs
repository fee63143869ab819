mod definition;
mod provider;

pub use definition::*;
pub use provider::*;
