//! StructureHasher trait definition.

/// Digest function over a normalized page outline.
///
/// Implementations live in semantest-infra (e.g., `Sha256StructureHasher`).
/// Hashing is synchronous and infallible: any outline, including the empty
/// one, produces a digest.
pub trait StructureHasher: Send + Sync {
    /// Digest the outline into a stable, lowercase-hex string.
    fn hash_structure(&self, outline: &str) -> String;
}
