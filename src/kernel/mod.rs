//! Self-contained arbitrary-precision numeric kernel: `Z`, `Q`, `C`, and
//! the transcendental functions built on top of them.
//!
//! Nothing above this module may reach past it into a bignum limb; every
//! other layer interacts with numbers only through [`Z`], [`Q`] and [`C`].

pub mod complex;
pub mod integer;
pub mod rational;
pub mod transcendental;

pub use complex::C;
pub use integer::{RoundingMode, Z};
pub use rational::Q;
pub use transcendental::TranscendentalCache;
