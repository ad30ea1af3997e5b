use std::cell::RefCell;
use std::collections::BTreeMap;

use alloy::primitives::{keccak256, Address, Bytes, B256, U256};
use mural_safe_core::{
    AddOwnerForm, ClockPort, Console, ConsoleCommand, CreateSafeForm, HistoryEntry, HistoryPort,
    Network, OwnerChange, PortError, ProviderEvent, ProviderEventKind, ProviderPort,
    RemoveOwnerForm, SafeAccountConfig, SafeInfo, SafeRecord, SafeSdkPort, SafeStorePort,
    SendEthForm, TxReceipt, TxRequest,
};

#[derive(Default)]
struct FakeWallet {
    available: bool,
    accounts: RefCell<Vec<Address>>,
    chain_id: u64,
    sent: RefCell<Vec<TxRequest>>,
    events: RefCell<Vec<ProviderEvent>>,
}

impl ProviderPort for FakeWallet {
    fn is_available(&self) -> bool {
        self.available
    }

    fn request_accounts(&self) -> Result<Vec<Address>, PortError> {
        Ok(self.accounts.borrow().clone())
    }

    fn accounts(&self) -> Result<Vec<Address>, PortError> {
        Ok(self.accounts.borrow().clone())
    }

    fn chain_id(&self) -> Result<u64, PortError> {
        Ok(self.chain_id)
    }

    fn get_balance(&self, _address: Address) -> Result<U256, PortError> {
        let spent = self
            .sent
            .borrow()
            .iter()
            .fold(U256::ZERO, |acc, t| acc + t.value);
        Ok(U256::from(10u64).pow(U256::from(18u64)) - spent)
    }

    fn send_transaction(&self, tx: &TxRequest) -> Result<B256, PortError> {
        self.sent.borrow_mut().push(tx.clone());
        Ok(keccak256(tx.to.as_slice()))
    }

    fn call(&self, _to: Address, _data: Bytes) -> Result<Bytes, PortError> {
        Err(PortError::NotImplemented("fake.call"))
    }

    fn transaction_receipt(&self, tx_hash: B256) -> Result<Option<TxReceipt>, PortError> {
        Ok(Some(TxReceipt {
            tx_hash,
            block_number: Some(1),
            success: true,
        }))
    }

    fn drain_events(&self) -> Result<Vec<ProviderEvent>, PortError> {
        Ok(std::mem::take(&mut *self.events.borrow_mut()))
    }
}

struct FakeHistory;

impl HistoryPort for FakeHistory {
    fn history(&self, address: Address) -> Result<Vec<HistoryEntry>, PortError> {
        Ok(vec![HistoryEntry {
            hash: B256::repeat_byte(0x11),
            block_hash: Some(B256::repeat_byte(0x22)),
            block_number: 42,
            from: address,
            to: None,
            value: U256::from(1u64),
            timestamp: Some(1_700_000_000),
            is_error: false,
        }])
    }
}

#[derive(Default)]
struct FakeSafes {
    safes: RefCell<BTreeMap<Address, SafeInfo>>,
    executed: RefCell<Vec<(Address, OwnerChange)>>,
}

impl SafeSdkPort for FakeSafes {
    fn deploy_safe(
        &self,
        _deployer: Address,
        config: &SafeAccountConfig,
        salt_nonce: U256,
    ) -> Result<Address, PortError> {
        let address = Address::from_slice(&keccak256(salt_nonce.to_be_bytes::<32>())[12..]);
        self.safes.borrow_mut().insert(
            address,
            SafeInfo {
                address,
                balance: U256::ZERO,
                owners: config.owners.clone(),
                threshold: config.threshold,
                nonce: 0,
                version: "1.3.0".to_owned(),
            },
        );
        Ok(address)
    }

    fn safe_info(&self, safe: Address) -> Result<SafeInfo, PortError> {
        self.safes
            .borrow()
            .get(&safe)
            .cloned()
            .ok_or_else(|| PortError::NotFound(safe.to_string()))
    }

    fn execute_owner_change(
        &self,
        executor: Address,
        safe: Address,
        change: &OwnerChange,
    ) -> Result<TxReceipt, PortError> {
        let mut safes = self.safes.borrow_mut();
        let info = safes
            .get_mut(&safe)
            .ok_or_else(|| PortError::NotFound(safe.to_string()))?;
        match *change {
            OwnerChange::Add { owner, threshold } => {
                info.owners.insert(0, owner);
                info.threshold = threshold;
            }
            OwnerChange::Remove {
                owner, threshold, ..
            } => {
                info.owners.retain(|o| *o != owner);
                info.threshold = threshold;
            }
        }
        info.nonce += 1;
        self.executed.borrow_mut().push((executor, *change));
        Ok(TxReceipt {
            tx_hash: B256::repeat_byte(0xee),
            block_number: Some(2),
            success: true,
        })
    }
}

#[derive(Default)]
struct FakeStore {
    records: RefCell<BTreeMap<Address, SafeRecord>>,
}

impl SafeStorePort for FakeStore {
    fn add(&self, record: SafeRecord) -> Result<(), PortError> {
        let mut records = self.records.borrow_mut();
        if records.contains_key(&record.address) {
            return Err(PortError::Conflict(record.address.to_string()));
        }
        records.insert(record.address, record);
        Ok(())
    }

    fn list(&self) -> Result<Vec<SafeRecord>, PortError> {
        Ok(self.records.borrow().values().cloned().collect())
    }

    fn get(&self, address: Address) -> Result<Option<SafeRecord>, PortError> {
        Ok(self.records.borrow().get(&address).cloned())
    }

    fn remove(&self, address: Address) -> Result<bool, PortError> {
        Ok(self.records.borrow_mut().remove(&address).is_some())
    }
}

struct FixedClock(u64);

impl ClockPort for FixedClock {
    fn now_ms(&self) -> Result<u64, PortError> {
        Ok(self.0)
    }
}

type TestConsole = Console<FakeWallet, FakeHistory, FakeSafes, FakeStore, FixedClock>;

fn owner() -> Address {
    "0x1000000000000000000000000000000000000001"
        .parse()
        .expect("owner")
}

fn other() -> Address {
    "0x2000000000000000000000000000000000000002"
        .parse()
        .expect("other")
}

fn console_on_chain(chain_id: u64) -> TestConsole {
    Console::new(
        Network::sepolia(),
        FakeWallet {
            available: true,
            accounts: RefCell::new(vec![owner()]),
            chain_id,
            ..FakeWallet::default()
        },
        FakeHistory,
        FakeSafes::default(),
        FakeStore::default(),
        FixedClock(1_739_750_400_000),
    )
}

fn console() -> TestConsole {
    console_on_chain(Network::sepolia().chain_id)
}

#[test]
fn connect_reports_accounts_and_network_mismatch() {
    let c = console();
    let result = c.handle(ConsoleCommand::ConnectWallet).expect("connect");
    let connection = result.connection.expect("connection");
    assert_eq!(connection.active_account(), Some(owner()));
    assert!(!connection.chain_mismatch());

    let wrong = console_on_chain(1);
    let connection = wrong
        .handle(ConsoleCommand::ConnectWallet)
        .expect("connect")
        .connection
        .expect("connection");
    assert!(connection.chain_mismatch());
}

#[test]
fn connect_without_provider_is_a_policy_error() {
    let c = Console::new(
        Network::sepolia(),
        FakeWallet::default(),
        FakeHistory,
        FakeSafes::default(),
        FakeStore::default(),
        FixedClock(0),
    );
    let err = c.handle(ConsoleCommand::ConnectWallet).expect_err("no provider");
    assert!(matches!(err, PortError::Policy(_)));

    let synced = c
        .handle(ConsoleCommand::SyncWallet)
        .expect("sync")
        .connection
        .expect("connection");
    assert!(!synced.available);
    assert!(synced.accounts.is_empty());
}

#[test]
fn sync_picks_up_account_changes() {
    let c = console();
    c.provider.accounts.replace(vec![other(), owner()]);
    c.provider.events.borrow_mut().push(ProviderEvent {
        sequence: 1,
        kind: ProviderEventKind::AccountsChanged,
        value: "[]".to_owned(),
    });
    let connection = c
        .handle(ConsoleCommand::SyncWallet)
        .expect("sync")
        .connection
        .expect("connection");
    assert_eq!(connection.active_account(), Some(other()));
    assert_eq!(connection.events_seen, 1);
}

#[test]
fn send_eth_broadcasts_and_refreshes_balance() {
    let c = console();
    let result = c
        .handle(ConsoleCommand::SendEth {
            from: owner(),
            form: SendEthForm {
                to: other().to_string(),
                amount: "0.5".to_owned(),
            },
        })
        .expect("send");
    assert!(result.tx_hash.is_some());
    assert_eq!(
        result.balance,
        Some(U256::from(500_000_000_000_000_000u128))
    );
    let sent = c.provider.sent.borrow();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, other());
    assert_eq!(sent[0].from, owner());
}

#[test]
fn state_changes_are_refused_on_the_wrong_network() {
    let c = console_on_chain(1);
    let err = c
        .handle(ConsoleCommand::SendEth {
            from: owner(),
            form: SendEthForm {
                to: other().to_string(),
                amount: "1".to_owned(),
            },
        })
        .expect_err("wrong network");
    assert_eq!(
        err,
        PortError::WrongNetwork {
            expected: 11_155_111,
            actual: 1
        }
    );
    assert!(c.provider.sent.borrow().is_empty());
}

#[test]
fn safe_operations_report_wrong_network_before_touching_contracts() {
    let c = console_on_chain(1);
    let unknown_safe: Address = "0x000000000000000000000000000000000000bEEF"
        .parse()
        .expect("safe");
    let wrong = PortError::WrongNetwork {
        expected: 11_155_111,
        actual: 1,
    };

    let err = c
        .handle(ConsoleCommand::AddOwner {
            executor: owner(),
            safe: unknown_safe,
            form: AddOwnerForm {
                owner_address: other().to_string(),
                threshold: String::new(),
            },
        })
        .expect_err("add owner");
    assert_eq!(err, wrong);

    let err = c
        .handle(ConsoleCommand::RemoveOwner {
            executor: owner(),
            safe: unknown_safe,
            form: RemoveOwnerForm {
                owner_address: owner().to_string(),
                threshold: String::new(),
            },
        })
        .expect_err("remove owner");
    assert_eq!(err, wrong);

    let err = c
        .handle(ConsoleCommand::CreateSafe {
            deployer: owner(),
            form: CreateSafeForm {
                threshold: "1".to_owned(),
                owners: owner().to_string(),
            },
        })
        .expect_err("create safe");
    assert_eq!(err, wrong);

    assert!(c.safe_sdk.executed.borrow().is_empty());
    assert!(c.safe_sdk.safes.borrow().is_empty());
    assert!(c.store.records.borrow().is_empty());
}

#[test]
fn history_is_passed_through() {
    let c = console();
    let history = c
        .handle(ConsoleCommand::LoadHistory { account: owner() })
        .expect("history")
        .history
        .expect("entries");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].from, owner());
}

#[test]
fn create_safe_stores_deployed_address() {
    let c = console();
    let result = c
        .handle(ConsoleCommand::CreateSafe {
            deployer: owner(),
            form: CreateSafeForm {
                threshold: "1".to_owned(),
                owners: format!("{},{}", owner(), other()),
            },
        })
        .expect("create");
    let address = result.deployed_safe.expect("address");
    let safes = result.safes.expect("safes");
    assert_eq!(safes.len(), 1);
    assert_eq!(safes[0].address, address);
    assert_eq!(safes[0].chain_id, 11_155_111);

    // Same clock, same salt, same address: the store rejects the duplicate key.
    let err = c
        .handle(ConsoleCommand::CreateSafe {
            deployer: owner(),
            form: CreateSafeForm {
                threshold: "1".to_owned(),
                owners: owner().to_string(),
            },
        })
        .expect_err("duplicate");
    assert!(matches!(err, PortError::Conflict(_)));
}

#[test]
fn invalid_create_form_never_reaches_the_contracts() {
    let c = console();
    let err = c
        .handle(ConsoleCommand::CreateSafe {
            deployer: owner(),
            form: CreateSafeForm {
                threshold: "3".to_owned(),
                owners: owner().to_string(),
            },
        })
        .expect_err("invalid");
    assert!(matches!(err, PortError::Validation(_)));
    assert!(c.safe_sdk.safes.borrow().is_empty());
}

#[test]
fn owner_management_round_trip() {
    let c = console();
    let safe = c
        .handle(ConsoleCommand::CreateSafe {
            deployer: owner(),
            form: CreateSafeForm {
                threshold: "1".to_owned(),
                owners: owner().to_string(),
            },
        })
        .expect("create")
        .deployed_safe
        .expect("address");

    let added = c
        .handle(ConsoleCommand::AddOwner {
            executor: owner(),
            safe,
            form: AddOwnerForm {
                owner_address: other().to_string(),
                threshold: String::new(),
            },
        })
        .expect("add owner");
    let info = added.safe_info.expect("reloaded");
    assert_eq!(info.owners, vec![other(), owner()]);
    assert_eq!(info.threshold, 2);
    assert!(added.receipt.expect("receipt").success);

    let removed = c
        .handle(ConsoleCommand::RemoveOwner {
            executor: owner(),
            safe,
            form: RemoveOwnerForm {
                owner_address: owner().to_string(),
                threshold: String::new(),
            },
        })
        .expect("remove owner");
    let info = removed.safe_info.expect("reloaded");
    assert_eq!(info.owners, vec![other()]);
    assert_eq!(info.threshold, 1);

    let executed = c.safe_sdk.executed.borrow();
    assert_eq!(
        executed[1].1,
        OwnerChange::Remove {
            prev_owner: other(),
            owner: owner(),
            threshold: 1
        }
    );
}

#[test]
fn forget_safe_removes_only_the_record() {
    let c = console();
    let safe = c
        .handle(ConsoleCommand::CreateSafe {
            deployer: owner(),
            form: CreateSafeForm {
                threshold: "1".to_owned(),
                owners: owner().to_string(),
            },
        })
        .expect("create")
        .deployed_safe
        .expect("address");

    let result = c
        .handle(ConsoleCommand::ForgetSafe { safe })
        .expect("forget");
    assert!(result.safes.expect("safes").is_empty());
    assert!(c.safe_sdk.safe_info(safe).is_ok());

    let err = c
        .handle(ConsoleCommand::ForgetSafe { safe })
        .expect_err("already gone");
    assert!(matches!(err, PortError::NotFound(_)));
}
