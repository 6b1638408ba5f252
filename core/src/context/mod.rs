mod interner;

pub use interner::{IStr, empty_istr, intern, interner, resolve};
