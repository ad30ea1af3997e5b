//! Form inputs as typed in by the user, and their validation into domain values.

use std::collections::HashSet;

use alloy::primitives::{Address, U256};

use crate::domain::{OwnerChange, SafeAccountConfig, SafeInfo, SENTINEL_OWNER};
use crate::ports::PortError;
use crate::units::parse_ether;

/// Parses a hex address. Mixed-case input must carry a valid EIP-55 checksum.
pub fn parse_address(input: &str) -> Result<Address, PortError> {
    let raw = input.trim();
    let hex = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(PortError::Validation(format!("invalid address: {raw:?}")));
    }
    let address: Address = hex
        .parse()
        .map_err(|e| PortError::Validation(format!("invalid address {raw:?}: {e}")))?;

    let has_upper = hex.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = hex.chars().any(|c| c.is_ascii_lowercase());
    if has_upper && has_lower && &address.to_checksum(None)[2..] != hex {
        return Err(PortError::Validation(format!(
            "bad address checksum: {raw}"
        )));
    }
    Ok(address)
}

fn parse_threshold(input: &str) -> Result<u64, PortError> {
    input
        .trim()
        .parse::<u64>()
        .map_err(|_| PortError::Validation(format!("invalid threshold: {:?}", input.trim())))
}

/// Empty input means "use the default".
fn parse_optional_threshold(input: &str) -> Result<Option<u64>, PortError> {
    if input.trim().is_empty() {
        Ok(None)
    } else {
        parse_threshold(input).map(Some)
    }
}

fn check_owner_candidate(owner: Address) -> Result<(), PortError> {
    if owner == Address::ZERO || owner == SENTINEL_OWNER {
        return Err(PortError::Validation(format!("invalid owner address: {owner}")));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendEthForm {
    pub to: String,
    pub amount: String,
}

impl SendEthForm {
    /// Recipient and value in wei.
    pub fn parse(&self) -> Result<(Address, U256), PortError> {
        if self.to.trim().is_empty() {
            return Err(PortError::Validation("recipient address is required".to_owned()));
        }
        let to = parse_address(&self.to)?;
        let value = parse_ether(&self.amount)?;
        Ok((to, value))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateSafeForm {
    pub threshold: String,
    /// Comma separated owner addresses.
    pub owners: String,
}

impl CreateSafeForm {
    pub fn parse(&self) -> Result<SafeAccountConfig, PortError> {
        if self.owners.trim().is_empty() {
            return Err(PortError::Validation(
                "owner list must have at least one owner".to_owned(),
            ));
        }
        let mut owners = Vec::new();
        let mut seen = HashSet::new();
        for segment in self.owners.split(',') {
            if segment.trim().is_empty() {
                return Err(PortError::Validation(
                    "owner list contains an empty entry".to_owned(),
                ));
            }
            let owner = parse_address(segment)?;
            check_owner_candidate(owner)?;
            if !seen.insert(owner) {
                return Err(PortError::Validation(format!("duplicate owner: {owner}")));
            }
            owners.push(owner);
        }

        let threshold = parse_threshold(&self.threshold)?;
        if threshold < 1 {
            return Err(PortError::Validation(
                "threshold must be greater than or equal to 1".to_owned(),
            ));
        }
        if threshold > owners.len() as u64 {
            return Err(PortError::Validation(format!(
                "threshold {threshold} exceeds the number of owners ({})",
                owners.len()
            )));
        }
        Ok(SafeAccountConfig { owners, threshold })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddOwnerForm {
    pub owner_address: String,
    /// Optional; defaults to the current threshold plus one.
    pub threshold: String,
}

impl AddOwnerForm {
    pub fn plan(&self, safe: &SafeInfo) -> Result<OwnerChange, PortError> {
        let owner = parse_address(&self.owner_address)?;
        check_owner_candidate(owner)?;
        if owner == safe.address {
            return Err(PortError::Validation("a Safe cannot own itself".to_owned()));
        }
        if safe.is_owner(&owner) {
            return Err(PortError::Validation(format!(
                "{owner} is already an owner"
            )));
        }

        let threshold = parse_optional_threshold(&self.threshold)?
            .unwrap_or_else(|| safe.threshold.saturating_add(1));
        let new_owner_count = safe.owners.len() as u64 + 1;
        if threshold < 1 || threshold > new_owner_count {
            return Err(PortError::Validation(format!(
                "threshold must be between 1 and {new_owner_count}, got {threshold}"
            )));
        }
        Ok(OwnerChange::Add { owner, threshold })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoveOwnerForm {
    pub owner_address: String,
    /// Optional; defaults to the current threshold minus one.
    pub threshold: String,
}

impl RemoveOwnerForm {
    pub fn plan(&self, safe: &SafeInfo) -> Result<OwnerChange, PortError> {
        let owner = parse_address(&self.owner_address)?;
        let index = safe
            .owners
            .iter()
            .position(|o| *o == owner)
            .ok_or_else(|| PortError::Validation(format!("{owner} is not an owner")))?;
        let prev_owner = if index == 0 {
            SENTINEL_OWNER
        } else {
            safe.owners[index - 1]
        };

        let threshold = parse_optional_threshold(&self.threshold)?
            .unwrap_or_else(|| safe.threshold.saturating_sub(1));
        let remaining = safe.owners.len() as u64 - 1;
        if remaining == 0 {
            return Err(PortError::Validation(
                "cannot remove the last owner".to_owned(),
            ));
        }
        if threshold < 1 || threshold > remaining {
            return Err(PortError::Validation(format!(
                "threshold must be between 1 and {remaining}, got {threshold}"
            )));
        }
        Ok(OwnerChange::Remove {
            prev_owner,
            owner,
            threshold,
        })
    }
}
