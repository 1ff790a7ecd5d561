//! Audit events emitted by committed invocations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::Pubkey;
use crate::instruction::OperationTag;

/// What a committed invocation did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum VaultEvent {
    Initialized {
        authority: Pubkey,
        mint: Pubkey,
        max_deposit: u64,
    },
    Deposited {
        amount: u64,
        balance: u64,
    },
    Withdrawn {
        amount: u64,
        balance: u64,
    },
    Paused,
    Resumed,
    Closed,
    TransferProposed {
        current: Pubkey,
        proposed: Pubkey,
    },
    TransferAccepted {
        previous: Pubkey,
        authority: Pubkey,
    },
    TransferCancelled {
        proposed: Pubkey,
    },
}

/// The result line a caller reads back after a successful invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub address: Pubkey,
    pub operation: OperationTag,
    /// Account nonce after the commit.
    pub nonce: u64,
    pub event: VaultEvent,
    pub processed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_a_snake_case_tag() {
        let json = serde_json::to_value(VaultEvent::Deposited {
            amount: 100,
            balance: 100,
        })
        .unwrap();
        assert_eq!(json["event"], "deposited");
        assert_eq!(json["amount"], 100);

        let json = serde_json::to_value(VaultEvent::Paused).unwrap();
        assert_eq!(json["event"], "paused");
    }
}
