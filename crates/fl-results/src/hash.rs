//! Content-based hashing for cache entry ids.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Id of a parsed table: the file contents, the parser that read them and
/// the settings it ran with.
pub fn compute_entry_id<S: Serialize>(contents: &[u8], kind: &str, settings: &S) -> String {
    let mut hasher = Sha256::new();

    hasher.update(contents);
    hasher.update(kind.as_bytes());

    let settings_json = serde_json::to_string(settings).unwrap_or_default();
    hasher.update(settings_json.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Opts {
        skip: usize,
    }

    #[test]
    fn hash_stability() {
        let a = compute_entry_id(b"1 2 3\n", "report", &Opts { skip: 0 });
        let b = compute_entry_id(b"1 2 3\n", "report", &Opts { skip: 0 });
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn hash_differs_for_different_inputs() {
        let base = compute_entry_id(b"1 2 3\n", "report", &Opts { skip: 0 });
        assert_ne!(base, compute_entry_id(b"1 2 4\n", "report", &Opts { skip: 0 }));
        assert_ne!(base, compute_entry_id(b"1 2 3\n", "solution", &Opts { skip: 0 }));
        assert_ne!(base, compute_entry_id(b"1 2 3\n", "report", &Opts { skip: 1 }));
    }
}
