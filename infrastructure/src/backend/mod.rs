//! Generative backend adapters

mod stub;

pub use stub::StubBackend;
