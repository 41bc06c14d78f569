use anyhow::{Result, bail};
use sha2::{Digest, Sha256};
use std::collections::HashSet;

const DEFAULT_SEED: u64 = 1337;

/// Seed resolved from a CLI token, keeping the token for reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedInfo {
    pub seed: u64,
    pub phrase: Option<String>,
}

impl SeedInfo {
    #[must_use]
    pub const fn from_numeric(seed: u64) -> Self {
        Self { seed, phrase: None }
    }

    /// Seed derived from the SHA-256 of a classroom phrase, so a teacher can
    /// hand out "TIGER-12" instead of a number.
    #[must_use]
    pub fn from_phrase(phrase: &str) -> Self {
        let normalized = phrase.trim().to_uppercase();
        let digest = Sha256::digest(normalized.as_bytes());
        let mut bytes = [0_u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        Self {
            seed: u64::from_be_bytes(bytes),
            phrase: Some(normalized),
        }
    }

    #[must_use]
    pub fn label(&self) -> String {
        self.phrase
            .as_ref()
            .map_or_else(|| self.seed.to_string(), |p| format!("{p} ({})", self.seed))
    }
}

/// Resolve CLI seed tokens: decimal integers, `0x` hex, or phrases.
///
/// Duplicates are dropped in order; no tokens yields the default seed.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<SeedInfo>> {
    let mut resolved = Vec::new();
    let mut seen = HashSet::new();

    for token in tokens {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let info = parse_seed_token(token)?;
        if seen.insert(info.seed) {
            resolved.push(info);
        }
    }

    if resolved.is_empty() {
        resolved.push(SeedInfo::from_numeric(DEFAULT_SEED));
    }
    Ok(resolved)
}

fn parse_seed_token(token: &str) -> Result<SeedInfo> {
    if let Ok(value) = token.parse::<u64>() {
        return Ok(SeedInfo::from_numeric(value));
    }
    if let Ok(value) = token.parse::<i64>() {
        return Ok(SeedInfo::from_numeric(value.unsigned_abs()));
    }
    if let Some(hex) = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        return match u64::from_str_radix(hex, 16) {
            Ok(value) => Ok(SeedInfo::from_numeric(value)),
            Err(err) => bail!("invalid hex seed {token}: {err}"),
        };
    }
    if token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Ok(SeedInfo::from_phrase(token));
    }
    bail!("Unrecognized seed token: {token}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn resolves_numbers_hex_and_phrases() {
        let seeds = resolve_seed_inputs(&tokens(&["42", "-7", "0xff", "tiger-12"])).unwrap();
        assert_eq!(seeds[0], SeedInfo::from_numeric(42));
        assert_eq!(seeds[1], SeedInfo::from_numeric(7));
        assert_eq!(seeds[2], SeedInfo::from_numeric(255));
        assert_eq!(seeds[3].phrase.as_deref(), Some("TIGER-12"));
        assert_eq!(seeds[3].seed, SeedInfo::from_phrase("TIGER-12").seed);
    }

    #[test]
    fn duplicates_are_dropped_and_default_applies() {
        let seeds = resolve_seed_inputs(&tokens(&["5", "5", "0x5"])).unwrap();
        assert_eq!(seeds.len(), 1);
        let seeds = resolve_seed_inputs(&tokens(&["", "  "])).unwrap();
        assert_eq!(seeds, vec![SeedInfo::from_numeric(DEFAULT_SEED)]);
    }

    #[test]
    fn rejects_garbage() {
        assert!(resolve_seed_inputs(&tokens(&["0xzz"])).is_err());
        assert!(resolve_seed_inputs(&tokens(&["two words"])).is_err());
    }

    #[test]
    fn labels_show_phrase_and_value() {
        assert_eq!(SeedInfo::from_numeric(9).label(), "9");
        let phrase = SeedInfo::from_phrase("owl");
        assert_eq!(phrase.label(), format!("OWL ({})", phrase.seed));
    }
}
