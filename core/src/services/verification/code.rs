//! Confirmation code generation

use rand::{rngs::OsRng, Rng};

/// Code length used when none is configured
pub const DEFAULT_CODE_LENGTH: usize = 4;

/// Source of confirmation codes
pub trait CodeGenerator: Send + Sync {
    /// Produce `length` decimal digits
    fn generate(&self, length: usize) -> String;
}

/// Uniform random digits drawn from the OS CSPRNG
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self, length: usize) -> String {
        let mut rng = OsRng;
        (0..length)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect()
    }
}
