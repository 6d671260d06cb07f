//! External-id synthesis strategies
//!
//! An explicit strategy object threaded through mock generation, never a
//! process-wide mutable hook. Three strategies, each in a full-length and
//! a 7-character shortened form. Shortened ids are derived by truncation
//! and trade readability for collision probability: the hash-based short
//! form is only safe for small batches.

use rand::rngs::StdRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// How identifiers are synthesized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdStrategy {
    /// UUID v4 drawn from the (seeded) generator rng
    RandomUuid,
    /// SHA256 over the domain name and record content; stable for
    /// identical input
    ContentHash,
    /// Process-local incrementing counter, prefixed with the domain name
    Incrementing,
}

/// Identifier factory for synthesized records
#[derive(Debug, Clone)]
pub struct ExternalIdFactory {
    strategy: IdStrategy,
    short: bool,
    counter: u64,
}

impl ExternalIdFactory {
    pub fn new(strategy: IdStrategy) -> Self {
        Self {
            strategy,
            short: false,
            counter: 0,
        }
    }

    /// Same strategy, truncated to the last 7 characters
    pub fn shortened(strategy: IdStrategy) -> Self {
        Self {
            strategy,
            short: true,
            counter: 0,
        }
    }

    /// Synthesize one identifier.
    ///
    /// `domain` is the record's class stem ("person"); `content` is the
    /// record's canonical JSON, used only by the content-hash strategy.
    pub fn make_id(
        &mut self,
        rng: &mut StdRng,
        domain: &str,
        content: &serde_json::Value,
    ) -> String {
        let full = match self.strategy {
            IdStrategy::RandomUuid => uuid_v4(rng),
            IdStrategy::ContentHash => {
                let mut hasher = Sha256::new();
                hasher.update(domain.as_bytes());
                hasher.update(content.to_string().as_bytes());
                format!("{}:{:x}", domain, hasher.finalize())
            }
            IdStrategy::Incrementing => {
                self.counter += 1;
                format!("{}:{}", domain, self.counter)
            }
        };

        if self.short {
            shorten(&full)
        } else {
            full
        }
    }
}

impl Default for ExternalIdFactory {
    fn default() -> Self {
        Self::new(IdStrategy::Incrementing)
    }
}

fn shorten(id: &str) -> String {
    let chars: Vec<char> = id.chars().collect();
    let start = chars.len().saturating_sub(7);
    chars[start..].iter().collect()
}

/// Format 16 rng bytes as a version-4 UUID
fn uuid_v4(rng: &mut StdRng) -> String {
    let mut bytes = [0u8; 16];
    rng.fill_bytes(&mut bytes);
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    format!(
        "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3],
        bytes[4], bytes[5],
        bytes[6], bytes[7],
        bytes[8], bytes[9],
        bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_incrementing_counts_up() {
        let mut factory = ExternalIdFactory::new(IdStrategy::Incrementing);
        let mut r = rng();
        assert_eq!(factory.make_id(&mut r, "person", &serde_json::json!({})), "person:1");
        assert_eq!(factory.make_id(&mut r, "person", &serde_json::json!({})), "person:2");
    }

    #[test]
    fn test_content_hash_is_stable() {
        let mut a = ExternalIdFactory::new(IdStrategy::ContentHash);
        let mut b = ExternalIdFactory::new(IdStrategy::ContentHash);
        let mut r = rng();
        let content = serde_json::json!({"name": "Quentin"});
        assert_eq!(
            a.make_id(&mut r, "person", &content),
            b.make_id(&mut r, "person", &content)
        );
    }

    #[test]
    fn test_uuid_is_deterministic_per_seed() {
        let mut factory = ExternalIdFactory::new(IdStrategy::RandomUuid);
        let first = factory.make_id(&mut rng(), "person", &serde_json::json!({}));
        let second = factory.make_id(&mut rng(), "person", &serde_json::json!({}));
        assert_eq!(first, second);
        // v4 marker
        assert_eq!(&first[14..15], "4");
    }

    #[test]
    fn test_short_form_is_seven_chars() {
        let mut factory = ExternalIdFactory::shortened(IdStrategy::ContentHash);
        let id = factory.make_id(&mut rng(), "person", &serde_json::json!({"a": 1}));
        assert_eq!(id.chars().count(), 7);
    }
}
