//! Code generation and one-way hashing
//!
//! Codes are drawn uniformly from the OS CSPRNG and stored only as bcrypt
//! hashes. bcrypt is deliberately slow, so hashing and comparison run on
//! the blocking thread pool.

use rand::{rngs::OsRng, Rng};

use crate::errors::{DomainError, DomainResult};

/// bcrypt wrapper with a fixed cost factor
#[derive(Debug, Clone, Copy)]
pub struct CodeHasher {
    cost: u32,
}

impl CodeHasher {
    /// Create a hasher with the given bcrypt cost
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// bcrypt cost factor
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Generate a uniformly random numeric code of `length` digits
    ///
    /// Leading zeros are kept (`length` 6 yields values `000000` to `999999`).
    pub fn generate_code(length: usize) -> String {
        let upper = 10u64.pow(length as u32);
        let value = OsRng.gen_range(0..upper);
        format!("{:0width$}", value, width = length)
    }

    /// Check that a candidate has the shape of a generated code
    pub fn is_well_formed(candidate: &str, length: usize) -> bool {
        candidate.len() == length && candidate.bytes().all(|b| b.is_ascii_digit())
    }

    /// Hash a code
    pub async fn hash(&self, code: &str) -> DomainResult<String> {
        let code = code.to_string();
        let cost = self.cost;

        tokio::task::spawn_blocking(move || bcrypt::hash(code, cost))
            .await
            .map_err(|e| DomainError::Hashing {
                message: format!("hashing task failed: {}", e),
            })?
            .map_err(|e| DomainError::Hashing {
                message: format!("failed to hash code: {}", e),
            })
    }

    /// Compare a candidate code against a stored hash
    pub async fn verify(&self, candidate: &str, code_hash: &str) -> DomainResult<bool> {
        let candidate = candidate.to_string();
        let code_hash = code_hash.to_string();

        tokio::task::spawn_blocking(move || bcrypt::verify(candidate, &code_hash))
            .await
            .map_err(|e| DomainError::Hashing {
                message: format!("verification task failed: {}", e),
            })?
            .map_err(|e| DomainError::Hashing {
                message: format!("failed to verify code: {}", e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_code_shape() {
        for _ in 0..200 {
            let code = CodeHasher::generate_code(6);
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));

            let num: u32 = code.parse().unwrap();
            assert!(num < 1_000_000);
        }
    }

    #[test]
    fn test_generate_code_other_lengths() {
        assert_eq!(CodeHasher::generate_code(4).len(), 4);
        assert_eq!(CodeHasher::generate_code(9).len(), 9);
    }

    #[test]
    fn test_is_well_formed() {
        assert!(CodeHasher::is_well_formed("012345", 6));
        assert!(!CodeHasher::is_well_formed("12345", 6));
        assert!(!CodeHasher::is_well_formed("12345a", 6));
        assert!(!CodeHasher::is_well_formed("１２３４５６", 6));
    }

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hasher = CodeHasher::new(4);
        let hash = hasher.hash("042917").await.unwrap();

        assert!(hash.starts_with("$2"));
        assert_ne!(hash, "042917");
        assert!(hasher.verify("042917", &hash).await.unwrap());
        assert!(!hasher.verify("042918", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_against_invalid_hash_is_an_error() {
        let hasher = CodeHasher::new(4);
        let result = hasher.verify("123456", "not-a-hash").await;
        assert!(matches!(result, Err(DomainError::Hashing { .. })));
    }
}
