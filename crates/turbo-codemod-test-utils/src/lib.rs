pub mod sandbox;

pub use sandbox::{RunOutput, Sandbox};
