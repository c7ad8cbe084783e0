//! Stable content hashes over an item's descriptive fields.
//!
//! Bulk inserts return generated ids in an order Postgres does not promise to
//! match the `VALUES` list, so imports key list-entry metadata by this hash
//! and look it up again for every returned row.

use std::fmt;

use reelshelf_model::{BookFields, MovieFields};
use sha2::{Digest, Sha256};

/// SHA-256 digest of an item's semantic fields. Never persisted.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", &self.to_hex()[..12])
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Items that can be fingerprinted independently of id and submitter.
pub trait ContentHashed {
    fn content_hash(&self) -> ContentHash;
}

/// Field encoder that keeps `("ab", "c")` and `("a", "bc")` apart and
/// distinguishes an absent field from an empty one.
struct FieldHasher {
    digest: Sha256,
}

impl FieldHasher {
    fn new(kind: &'static str) -> Self {
        let mut hasher = Self {
            digest: Sha256::new(),
        };
        hasher.text(kind);
        hasher
    }

    fn text(&mut self, value: &str) -> &mut Self {
        self.digest.update((value.len() as u64).to_be_bytes());
        self.digest.update(value.as_bytes());
        self
    }

    fn opt_text(&mut self, value: Option<&str>) -> &mut Self {
        match value {
            Some(value) => {
                self.digest.update([1u8]);
                self.text(value)
            }
            None => {
                self.digest.update([0u8]);
                self
            }
        }
    }

    fn opt_int(&mut self, value: Option<i32>) -> &mut Self {
        match value {
            Some(value) => {
                self.digest.update([1u8]);
                self.digest.update(value.to_be_bytes());
            }
            None => self.digest.update([0u8]),
        }
        self
    }

    fn finish(self) -> ContentHash {
        ContentHash(self.digest.finalize().into())
    }
}

impl ContentHashed for BookFields {
    fn content_hash(&self) -> ContentHash {
        let mut hasher = FieldHasher::new("book");
        hasher
            .text(&self.title)
            .opt_text(self.author.as_deref())
            .opt_text(self.publisher.as_deref())
            .opt_text(self.isbn.as_deref())
            .opt_int(self.pages)
            .opt_int(self.year);
        hasher.finish()
    }
}

impl ContentHashed for MovieFields {
    fn content_hash(&self) -> ContentHash {
        let mut hasher = FieldHasher::new("movie");
        hasher
            .text(&self.title)
            .opt_text(self.studio.as_deref())
            .opt_text(self.director.as_deref())
            .opt_text(self.writer.as_deref())
            .opt_int(self.duration)
            .opt_int(self.year);
        hasher.finish()
    }
}
