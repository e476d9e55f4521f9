// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::str::FromStr;

use nouns_reasons_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tiny_keccak::{Hasher, Keccak};

pub const ADDRESS_HEX_LEN: usize = 40;
const ENS_NAME_MAX_LEN: usize = 255;
const PROPOSAL_ID_MAX_LEN: usize = 20;

#[must_use]
pub fn keccak256(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut out = [0_u8; 32];
    hasher.update(bytes);
    hasher.finalize(&mut out);
    out
}

/// An account address, held in EIP-55 checksummed form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address {
    checksummed: String,
    bytes: [u8; 20],
}

impl Address {
    /// Accepts `0x` followed by 40 hex digits. All-lowercase and all-uppercase
    /// input is accepted as-is; mixed case must carry a valid checksum.
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let trimmed = value.trim();
        let Some(digits) = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        else {
            return Err(invalid("address", trimmed, "must start with 0x"));
        };
        if digits.len() != ADDRESS_HEX_LEN {
            return Err(invalid("address", trimmed, "must be 40 hex digits"));
        }
        let mut bytes = [0_u8; 20];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|_| invalid("address", trimmed, "must be 40 hex digits"))?;
        let address = Self::from_bytes(bytes);

        let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
        if has_lower && has_upper && address.checksummed[2..] != *digits {
            return Err(invalid("address", trimmed, "checksum mismatch"));
        }
        Ok(address)
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self {
            checksummed: checksum_encode(&hex::encode(bytes)),
            bytes,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.checksummed
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.bytes
    }

    /// Lowercase form, as the subgraph stores account ids.
    #[must_use]
    pub fn to_lowercase(&self) -> String {
        self.checksummed.to_ascii_lowercase()
    }

    /// `0x1234...abcd`
    #[must_use]
    pub fn short(&self) -> String {
        let s = &self.checksummed;
        format!("{}...{}", &s[..6], &s[s.len() - 4..])
    }
}

fn checksum_encode(lower_hex: &str) -> String {
    let hash = keccak256(lower_hex.as_bytes());
    let mut out = String::with_capacity(2 + ADDRESS_HEX_LEN);
    out.push_str("0x");
    for (i, c) in lower_hex.chars().enumerate() {
        let nibble = if i % 2 == 0 {
            hash[i / 2] >> 4
        } else {
            hash[i / 2] & 0x0f
        };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// EIP-137 namehash of a dotted name. The empty name hashes to the zero node.
#[must_use]
pub fn namehash(name: &str) -> [u8; 32] {
    let mut node = [0_u8; 32];
    if name.is_empty() {
        return node;
    }
    for label in name.rsplit('.') {
        let label_hash = keccak256(label.as_bytes());
        let mut buf = [0_u8; 64];
        buf[..32].copy_from_slice(&node);
        buf[32..].copy_from_slice(&label_hash);
        node = keccak256(&buf);
    }
    node
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EnsName(String);

impl EnsName {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let normalized = value.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(invalid("ens name", &value, "must not be empty"));
        }
        if normalized.len() > ENS_NAME_MAX_LEN {
            return Err(invalid("ens name", &value, "must be at most 255 bytes"));
        }
        if !normalized.ends_with(".eth") {
            return Err(invalid("ens name", &value, "must end with .eth"));
        }
        if normalized.split('.').any(str::is_empty) {
            return Err(invalid("ens name", &value, "labels must not be empty"));
        }
        if normalized
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || "/?#%:@".contains(c))
        {
            return Err(invalid("ens name", &value, "contains forbidden characters"));
        }
        Ok(Self(normalized))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn namehash(&self) -> [u8; 32] {
        namehash(&self.0)
    }

    /// `vote.nouns.eth` -> `Vote.nouns.eth`
    #[must_use]
    pub fn title_case(&self) -> String {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProposalId(String);

impl ProposalId {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(invalid("proposal id", &value, "must not be empty"));
        }
        if value.len() > PROPOSAL_ID_MAX_LEN {
            return Err(invalid("proposal id", &value, "must be at most 20 digits"));
        }
        if !value.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("proposal id", &value, "must contain only [0-9]"));
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Route-level voter identifier: a hex address or an ENS name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VoterId {
    Address(Address),
    Ens(EnsName),
}

impl VoterId {
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.contains(".eth") {
            return EnsName::new(raw).map(Self::Ens);
        }
        Address::new(raw)
            .map(Self::Address)
            .map_err(|_| invalid("voter id", raw, "not a valid address or ens name"))
    }
}

impl fmt::Display for VoterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(address) => f.write_str(address.as_str()),
            Self::Ens(name) => f.write_str(name.as_str()),
        }
    }
}

impl FromStr for VoterId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn invalid(kind: &'static str, value: &str, reason: &'static str) -> Error {
    Error::InvalidIdentifier {
        kind,
        value: value.to_owned(),
        reason,
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.checksummed)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.checksummed
    }
}

impl TryFrom<String> for Address {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

macro_rules! impl_id_traits {
    ($name:ident) => {
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = Error;

            fn try_from(value: String) -> Result<Self> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = Error;

            fn try_from(value: &str) -> Result<Self> {
                Self::new(value)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::new(s)
            }
        }
    };
}

impl_id_traits!(EnsName);
impl_id_traits!(ProposalId);

#[cfg(test)]
mod tests {
    use super::*;

    const CHECKSUMMED: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    #[test]
    fn lowercase_address_is_checksummed() {
        let address = Address::new(CHECKSUMMED.to_ascii_lowercase()).expect("address");
        assert_eq!(address.as_str(), CHECKSUMMED);
        assert_eq!(address.to_lowercase(), CHECKSUMMED.to_ascii_lowercase());
    }

    #[test]
    fn mixed_case_address_must_match_checksum() {
        assert!(Address::new(CHECKSUMMED).is_ok());
        let broken = CHECKSUMMED.replace("aA", "Aa");
        let err = Address::new(broken).expect_err("bad checksum");
        assert!(err.to_string().contains("checksum mismatch"));
    }

    #[test]
    fn address_rejects_wrong_length_and_prefix() {
        assert!(Address::new("0x1234").is_err());
        assert!(Address::new("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").is_err());
        assert!(Address::new("0xzzaeb6053f3e94c9b9a09f33669435e7ef1beaed").is_err());
    }

    #[test]
    fn short_address_keeps_head_and_tail() {
        let address = Address::new(CHECKSUMMED).expect("address");
        assert_eq!(address.short(), "0x5aAe...eAed");
    }

    #[test]
    fn namehash_matches_eip137_vectors() {
        assert_eq!(namehash(""), [0_u8; 32]);
        assert_eq!(
            hex::encode(namehash("eth")),
            "93cdeb708b7545dc668eb9280176169d1c33cfd8ed6f04690a0bcc88a93fc4ae"
        );
        assert_eq!(
            hex::encode(namehash("foo.eth")),
            "de9b09fd7c5f901e23a3f19fecc54828e9c848539801e86591bd9801b019f84f"
        );
    }

    #[test]
    fn ens_name_is_lowercased_and_validated() {
        let name = EnsName::new("  Nouns.ETH ").expect("ens");
        assert_eq!(name.as_str(), "nouns.eth");
        assert_eq!(name.title_case(), "Nouns.eth");
        assert!(EnsName::new("nouns").is_err());
        assert!(EnsName::new("a..eth").is_err());
        assert!(EnsName::new("bad name.eth").is_err());
    }

    #[test]
    fn voter_id_routes_on_eth_suffix() {
        assert!(matches!(
            VoterId::parse("vote.nouns.eth").expect("ens"),
            VoterId::Ens(_)
        ));
        assert!(matches!(
            VoterId::parse(CHECKSUMMED).expect("address"),
            VoterId::Address(_)
        ));
        let err = VoterId::parse("not-a-voter").expect_err("invalid");
        assert!(err.to_string().contains("not a valid address or ens name"));
    }

    #[test]
    fn proposal_id_is_decimal() {
        assert!(ProposalId::new("412").is_ok());
        assert!(ProposalId::new("").is_err());
        assert!(ProposalId::new("0x1").is_err());
    }
}
