// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use ::rand::{
    rngs::SmallRng,
    RngCore,
    SeedableRng,
};

//======================================================================================================================
// Structures
//======================================================================================================================

/// Source of probe payloads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PayloadGenerator {
    /// Fresh random bytes of the requested size.
    Random,
    /// The same bytes every time, whatever size is requested.
    Fixed(Vec<u8>),
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl PayloadGenerator {
    pub fn generate(&self, size: usize) -> Vec<u8> {
        match self {
            PayloadGenerator::Random => Self::random(size),
            PayloadGenerator::Fixed(bytes) => bytes.clone(),
        }
    }

    /// Returns `size` random bytes.
    pub fn random(size: usize) -> Vec<u8> {
        let mut rng: SmallRng = SmallRng::from_entropy();
        let mut bytes: Vec<u8> = vec![0; size];
        rng.fill_bytes(&mut bytes);
        bytes
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================

#[cfg(test)]
mod tests {
    use super::PayloadGenerator;

    #[test]
    fn test_random_payload_has_requested_size() {
        assert_eq!(PayloadGenerator::Random.generate(100).len(), 100);
        assert!(PayloadGenerator::Random.generate(0).is_empty());
    }

    #[test]
    fn test_fixed_payload_ignores_size() {
        let generator: PayloadGenerator = PayloadGenerator::Fixed(b"Hello".to_vec());
        assert_eq!(generator.generate(100), b"Hello");
    }
}
