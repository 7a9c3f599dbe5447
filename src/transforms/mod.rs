mod identity;
pub use identity::Identity;
mod linear;
pub use linear::Linear;
mod sequence;
pub use sequence::{Sequence, SequenceBuilder};
