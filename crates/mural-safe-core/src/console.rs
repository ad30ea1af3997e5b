use alloy::primitives::{Address, B256, U256};

use crate::domain::{HistoryEntry, Network, SafeInfo, SafeRecord, TimestampMs, TxReceipt, TxRequest};
use crate::forms::{AddOwnerForm, CreateSafeForm, RemoveOwnerForm, SendEthForm};
use crate::ports::{ClockPort, HistoryPort, PortError, ProviderPort, SafeSdkPort, SafeStorePort};

#[derive(Debug, Clone)]
pub enum ConsoleCommand {
    ConnectWallet,
    /// Picks up account/chain changes without prompting the wallet.
    SyncWallet,
    RefreshBalance {
        account: Address,
    },
    LoadHistory {
        account: Address,
    },
    SendEth {
        from: Address,
        form: SendEthForm,
    },
    CreateSafe {
        deployer: Address,
        form: CreateSafeForm,
    },
    ListSafes,
    LoadSafe {
        safe: Address,
    },
    AddOwner {
        executor: Address,
        safe: Address,
        form: AddOwnerForm,
    },
    RemoveOwner {
        executor: Address,
        safe: Address,
        form: RemoveOwnerForm,
    },
    ForgetSafe {
        safe: Address,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletConnection {
    pub available: bool,
    pub accounts: Vec<Address>,
    pub chain_id: Option<u64>,
    pub expected_chain_id: u64,
    pub events_seen: usize,
}

impl WalletConnection {
    pub fn active_account(&self) -> Option<Address> {
        self.accounts.first().copied()
    }

    pub fn chain_mismatch(&self) -> bool {
        matches!(self.chain_id, Some(id) if id != self.expected_chain_id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CommandResult {
    pub connection: Option<WalletConnection>,
    pub balance: Option<U256>,
    pub history: Option<Vec<HistoryEntry>>,
    pub tx_hash: Option<B256>,
    pub receipt: Option<TxReceipt>,
    pub deployed_safe: Option<Address>,
    pub safe_info: Option<SafeInfo>,
    pub safes: Option<Vec<SafeRecord>>,
}

impl CommandResult {
    fn empty() -> Self {
        Self::default()
    }
}

/// Dispatches user commands to the wallet, indexer, Safe contracts and store.
pub struct Console<P, H, S, Q, C>
where
    P: ProviderPort,
    H: HistoryPort,
    S: SafeSdkPort,
    Q: SafeStorePort,
    C: ClockPort,
{
    pub network: Network,
    pub provider: P,
    pub history: H,
    pub safe_sdk: S,
    pub store: Q,
    pub clock: C,
}

impl<P, H, S, Q, C> Console<P, H, S, Q, C>
where
    P: ProviderPort,
    H: HistoryPort,
    S: SafeSdkPort,
    Q: SafeStorePort,
    C: ClockPort,
{
    pub fn new(network: Network, provider: P, history: H, safe_sdk: S, store: Q, clock: C) -> Self {
        Self {
            network,
            provider,
            history,
            safe_sdk,
            store,
            clock,
        }
    }

    pub fn handle(&self, command: ConsoleCommand) -> Result<CommandResult, PortError> {
        match command {
            ConsoleCommand::ConnectWallet => {
                if !self.provider.is_available() {
                    return Err(PortError::Policy("no wallet provider available".to_owned()));
                }
                let accounts = self.provider.request_accounts()?;
                let chain_id = self.provider.chain_id()?;
                let events_seen = self.provider.drain_events()?.len();
                Ok(CommandResult {
                    connection: Some(WalletConnection {
                        available: true,
                        accounts,
                        chain_id: Some(chain_id),
                        expected_chain_id: self.network.chain_id,
                        events_seen,
                    }),
                    ..CommandResult::empty()
                })
            }
            ConsoleCommand::SyncWallet => Ok(CommandResult {
                connection: Some(self.sync_wallet()?),
                ..CommandResult::empty()
            }),
            ConsoleCommand::RefreshBalance { account } => Ok(CommandResult {
                balance: Some(self.provider.get_balance(account)?),
                ..CommandResult::empty()
            }),
            ConsoleCommand::LoadHistory { account } => Ok(CommandResult {
                history: Some(self.history.history(account)?),
                ..CommandResult::empty()
            }),
            ConsoleCommand::SendEth { from, form } => {
                let (to, value) = form.parse()?;
                self.ensure_network()?;
                let tx_hash = self
                    .provider
                    .send_transaction(&TxRequest::transfer(from, to, value))?;
                let balance = self.provider.get_balance(from)?;
                Ok(CommandResult {
                    tx_hash: Some(tx_hash),
                    balance: Some(balance),
                    ..CommandResult::empty()
                })
            }
            ConsoleCommand::CreateSafe { deployer, form } => {
                let config = form.parse()?;
                self.ensure_network()?;
                let now = self.clock.now_ms()?;
                let salt_nonce = U256::from(now).saturating_mul(U256::from(1_000u64));
                let address = self.safe_sdk.deploy_safe(deployer, &config, salt_nonce)?;
                self.store.add(SafeRecord {
                    address,
                    chain_id: self.network.chain_id,
                    added_at_ms: TimestampMs(now),
                })?;
                Ok(CommandResult {
                    deployed_safe: Some(address),
                    safes: Some(self.known_safes()?),
                    ..CommandResult::empty()
                })
            }
            ConsoleCommand::ListSafes => Ok(CommandResult {
                safes: Some(self.known_safes()?),
                ..CommandResult::empty()
            }),
            ConsoleCommand::LoadSafe { safe } => Ok(CommandResult {
                safe_info: Some(self.safe_sdk.safe_info(safe)?),
                ..CommandResult::empty()
            }),
            ConsoleCommand::AddOwner {
                executor,
                safe,
                form,
            } => {
                self.ensure_network()?;
                let info = self.safe_sdk.safe_info(safe)?;
                let change = form.plan(&info)?;
                let receipt = self.safe_sdk.execute_owner_change(executor, safe, &change)?;
                Ok(CommandResult {
                    receipt: Some(receipt),
                    safe_info: Some(self.safe_sdk.safe_info(safe)?),
                    ..CommandResult::empty()
                })
            }
            ConsoleCommand::RemoveOwner {
                executor,
                safe,
                form,
            } => {
                self.ensure_network()?;
                let info = self.safe_sdk.safe_info(safe)?;
                let change = form.plan(&info)?;
                let receipt = self.safe_sdk.execute_owner_change(executor, safe, &change)?;
                Ok(CommandResult {
                    receipt: Some(receipt),
                    safe_info: Some(self.safe_sdk.safe_info(safe)?),
                    ..CommandResult::empty()
                })
            }
            ConsoleCommand::ForgetSafe { safe } => {
                if !self.store.remove(safe)? {
                    return Err(PortError::NotFound(format!("safe not stored: {safe}")));
                }
                Ok(CommandResult {
                    safes: Some(self.known_safes()?),
                    ..CommandResult::empty()
                })
            }
        }
    }

    fn sync_wallet(&self) -> Result<WalletConnection, PortError> {
        if !self.provider.is_available() {
            return Ok(WalletConnection {
                available: false,
                accounts: Vec::new(),
                chain_id: None,
                expected_chain_id: self.network.chain_id,
                events_seen: 0,
            });
        }
        let events_seen = self.provider.drain_events()?.len();
        Ok(WalletConnection {
            available: true,
            accounts: self.provider.accounts()?,
            chain_id: Some(self.provider.chain_id()?),
            expected_chain_id: self.network.chain_id,
            events_seen,
        })
    }

    fn ensure_network(&self) -> Result<(), PortError> {
        let actual = self.provider.chain_id()?;
        if actual != self.network.chain_id {
            return Err(PortError::WrongNetwork {
                expected: self.network.chain_id,
                actual,
            });
        }
        Ok(())
    }

    fn known_safes(&self) -> Result<Vec<SafeRecord>, PortError> {
        Ok(self
            .store
            .list()?
            .into_iter()
            .filter(|r| r.chain_id == self.network.chain_id)
            .collect())
    }
}
