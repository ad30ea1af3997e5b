use std::time::Duration;

use alloy::primitives::{keccak256, Address, Bytes, B256, U256};
use alloy::sol_types::SolCall;
use safe_utils::{CallDataHasher, DomainHasher, SafeHasher, SafeWalletVersion, TxMessageHasher};
use tracing::{debug, info};

use mural_safe_core::{
    OwnerChange, PortError, ProviderPort, SafeAccountConfig, SafeInfo, SafeSdkPort, TxReceipt,
    TxRequest,
};

use crate::contracts::{GnosisSafe, GnosisSafeProxyFactory};
use crate::eip1193::wait_for_receipt;
use crate::{AdapterConfig, SafeDeployment};

/// Talks to Safe contracts through a wallet provider: `eth_call` for reads,
/// `eth_sendTransaction` for deployments and owner changes.
#[derive(Debug, Clone)]
pub struct SafeSdkAdapter<P: ProviderPort> {
    provider: P,
    deployment: SafeDeployment,
    chain_id: u64,
    receipt_poll_interval: Duration,
    receipt_timeout: Duration,
}

impl<P: ProviderPort> SafeSdkAdapter<P> {
    pub fn new(provider: P, config: &AdapterConfig) -> Self {
        Self {
            provider,
            deployment: config.safe_deployment,
            chain_id: config.network.chain_id,
            receipt_poll_interval: Duration::from_millis(config.receipt_poll_interval_ms),
            receipt_timeout: Duration::from_millis(config.receipt_timeout_ms),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn read<C: SolCall>(&self, to: Address, call: C) -> Result<C::Return, PortError> {
        let data = self.provider.call(to, Bytes::from(call.abi_encode()))?;
        if data.is_empty() {
            return Err(PortError::NotFound(format!(
                "no contract answered {} at {to}",
                C::SIGNATURE
            )));
        }
        C::abi_decode_returns(&data, true).map_err(|e| {
            PortError::Validation(format!("failed to decode {} result: {e}", C::SIGNATURE))
        })
    }

    fn submit(&self, tx: TxRequest) -> Result<TxReceipt, PortError> {
        let tx_hash = self.provider.send_transaction(&tx)?;
        info!(%tx_hash, to = %tx.to, "transaction submitted");
        let receipt = wait_for_receipt(
            &self.provider,
            tx_hash,
            self.receipt_poll_interval,
            self.receipt_timeout,
        )?;
        if !receipt.success {
            return Err(PortError::Reverted(tx_hash));
        }
        Ok(receipt)
    }

    /// EIP-712 hash of a zero-gas CALL from `safe` to itself carrying `data`.
    fn safe_tx_hash(&self, info: &SafeInfo, data: &[u8]) -> Result<B256, PortError> {
        let version = SafeWalletVersion::parse(&info.version).map_err(|e| {
            PortError::Validation(format!("unsupported Safe version {:?}: {e}", info.version))
        })?;
        let data_hash = CallDataHasher::new(alloy::hex::encode(data))
            .hash()
            .map_err(|e| PortError::Validation(format!("failed to hash call data: {e}")))?;
        let domain_hash = DomainHasher::new(version.clone(), self.chain_id, info.address).hash();
        let message_hash = TxMessageHasher::new(
            version,
            info.address,
            U256::ZERO,
            data_hash,
            0u8,
            U256::ZERO,
            U256::ZERO,
            U256::ZERO,
            Address::ZERO,
            Address::ZERO,
            U256::from(info.nonce),
        )
        .hash();
        Ok(SafeHasher::new(domain_hash, message_hash).hash())
    }

    /// Owners whose signature can be pre-validated: the executor itself plus
    /// owners that approved the hash on-chain.
    fn approving_owners(
        &self,
        info: &SafeInfo,
        executor: Address,
        safe_tx_hash: B256,
    ) -> Result<Vec<Address>, PortError> {
        let mut approvers = Vec::new();
        for owner in &info.owners {
            if *owner == executor {
                approvers.push(*owner);
                continue;
            }
            let approved = self
                .read(
                    info.address,
                    GnosisSafe::approvedHashesCall {
                        owner: *owner,
                        hash: safe_tx_hash,
                    },
                )?
                .approved;
            if !approved.is_zero() {
                approvers.push(*owner);
            }
        }
        approvers.sort();
        Ok(approvers)
    }
}

impl<P: ProviderPort> SafeSdkPort for SafeSdkAdapter<P> {
    fn deploy_safe(
        &self,
        deployer: Address,
        config: &SafeAccountConfig,
        salt_nonce: U256,
    ) -> Result<Address, PortError> {
        let initializer = GnosisSafe::setupCall {
            owners: config.owners.clone(),
            threshold: U256::from(config.threshold),
            to: Address::ZERO,
            data: Bytes::new(),
            fallbackHandler: self.deployment.fallback_handler,
            paymentToken: Address::ZERO,
            payment: U256::ZERO,
            paymentReceiver: Address::ZERO,
        }
        .abi_encode();

        let creation_code = self
            .read(
                self.deployment.proxy_factory,
                GnosisSafeProxyFactory::proxyCreationCodeCall {},
            )?
            .code;
        let predicted = predict_safe_address(
            self.deployment.proxy_factory,
            self.deployment.singleton,
            &creation_code,
            &initializer,
            salt_nonce,
        );
        debug!(%predicted, %salt_nonce, "deploying safe");

        let data = GnosisSafeProxyFactory::createProxyWithNonceCall {
            singleton: self.deployment.singleton,
            initializer: Bytes::from(initializer),
            saltNonce: salt_nonce,
        }
        .abi_encode();
        self.submit(TxRequest {
            from: deployer,
            to: self.deployment.proxy_factory,
            value: U256::ZERO,
            data: Bytes::from(data),
        })?;
        info!(safe = %predicted, "safe deployed");
        Ok(predicted)
    }

    fn safe_info(&self, safe: Address) -> Result<SafeInfo, PortError> {
        let version = self.read(safe, GnosisSafe::VERSIONCall {})?.version;
        let owners = self.read(safe, GnosisSafe::getOwnersCall {})?.owners;
        let threshold = self.read(safe, GnosisSafe::getThresholdCall {})?.threshold;
        let nonce = self.read(safe, GnosisSafe::nonceCall {})?.nonce;
        let balance = self.provider.get_balance(safe)?;
        Ok(SafeInfo {
            address: safe,
            balance,
            owners,
            threshold: u64::try_from(threshold)
                .map_err(|_| PortError::Validation("threshold out of range".to_owned()))?,
            nonce: u64::try_from(nonce)
                .map_err(|_| PortError::Validation("nonce out of range".to_owned()))?,
            version,
        })
    }

    fn execute_owner_change(
        &self,
        executor: Address,
        safe: Address,
        change: &OwnerChange,
    ) -> Result<TxReceipt, PortError> {
        let info = self.safe_info(safe)?;
        let data = match *change {
            OwnerChange::Add { owner, threshold } => GnosisSafe::addOwnerWithThresholdCall {
                owner,
                threshold: U256::from(threshold),
            }
            .abi_encode(),
            OwnerChange::Remove {
                prev_owner,
                owner,
                threshold,
            } => GnosisSafe::removeOwnerCall {
                prevOwner: prev_owner,
                owner,
                threshold: U256::from(threshold),
            }
            .abi_encode(),
        };

        let safe_tx_hash = self.safe_tx_hash(&info, &data)?;
        let approvers = self.approving_owners(&info, executor, safe_tx_hash)?;
        let required = usize::try_from(info.threshold).unwrap_or(usize::MAX);
        if approvers.len() < required {
            return Err(PortError::Policy(format!(
                "{} more owner approval(s) needed for {safe_tx_hash}",
                required - approvers.len()
            )));
        }
        debug!(%safe_tx_hash, approvers = approvers.len(), "executing owner change");

        let exec = GnosisSafe::execTransactionCall {
            to: safe,
            value: U256::ZERO,
            data: Bytes::from(data),
            operation: 0,
            safeTxGas: U256::ZERO,
            baseGas: U256::ZERO,
            gasPrice: U256::ZERO,
            gasToken: Address::ZERO,
            refundReceiver: Address::ZERO,
            signatures: prevalidated_signatures(&approvers),
        }
        .abi_encode();
        self.submit(TxRequest {
            from: executor,
            to: safe,
            value: U256::ZERO,
            data: Bytes::from(exec),
        })
    }
}

/// CREATE2 address a `createProxyWithNonce` call will deploy to.
pub fn predict_safe_address(
    factory: Address,
    singleton: Address,
    proxy_creation_code: &[u8],
    initializer: &[u8],
    salt_nonce: U256,
) -> Address {
    let mut salt_preimage = Vec::with_capacity(64);
    salt_preimage.extend_from_slice(keccak256(initializer).as_slice());
    salt_preimage.extend_from_slice(&salt_nonce.to_be_bytes::<32>());
    let salt = keccak256(&salt_preimage);

    let mut init_code = Vec::with_capacity(proxy_creation_code.len() + 32);
    init_code.extend_from_slice(proxy_creation_code);
    init_code.extend_from_slice(singleton.into_word().as_slice());
    factory.create2(salt, keccak256(&init_code))
}

/// `r = owner`, `s = 0`, `v = 1` for each owner, in the given order.
pub fn prevalidated_signatures(owners: &[Address]) -> Bytes {
    let mut out = Vec::with_capacity(owners.len() * 65);
    for owner in owners {
        out.extend_from_slice(owner.into_word().as_slice());
        out.extend_from_slice(&[0u8; 32]);
        out.push(1);
    }
    Bytes::from(out)
}
