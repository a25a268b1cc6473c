use sha2::{
    Digest,
    Sha256,
};
use uuid::Builder;

// The alphabet Kubernetes uses for generated name suffixes and pod-template hashes (no vowels, so
// it can't accidentally spell anything, and no characters that are easily confused)
const SAFE_ALPHABET: &[u8] = b"bcdfghjklmnpqrstvwxz2456789";

// Every "random-looking" identifier in a fixture comes from hashing the seed together with a label
// describing what the identifier is for.  SHA-256 (rather than std's DefaultHasher) keeps the
// output identical across toolchain versions, not just across runs.
#[derive(Clone, Debug)]
pub(crate) struct SeedIds {
    seed: String,
}

impl SeedIds {
    pub(crate) fn new(seed: &str) -> SeedIds {
        SeedIds { seed: seed.into() }
    }

    fn digest(&self, purpose: &str) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.seed.as_bytes());
        hasher.update([0u8]);
        hasher.update(purpose.as_bytes());
        hasher.finalize().into()
    }

    pub(crate) fn hex(&self, purpose: &str) -> String {
        format!("{:x}", Sha256::digest(self.digest(purpose)))
    }

    pub(crate) fn uid(&self, purpose: &str) -> String {
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&self.digest(purpose)[..16]);
        Builder::from_random_bytes(bytes).into_uuid().hyphenated().to_string()
    }

    pub(crate) fn number(&self, purpose: &str) -> u64 {
        let d = self.digest(purpose);
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&d[..8]);
        u64::from_be_bytes(bytes)
    }

    pub(crate) fn safe_string(&self, purpose: &str, len: usize) -> String {
        self.digest(purpose)
            .iter()
            .cycle()
            .take(len)
            .map(|b| SAFE_ALPHABET[*b as usize % SAFE_ALPHABET.len()] as char)
            .collect()
    }
}
