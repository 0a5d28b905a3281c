pub mod fingerprint;
pub mod import;
pub mod probe;
pub mod registry;
pub mod resilience;
pub mod scanner;
pub mod simulate;
