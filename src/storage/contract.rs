// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Key/value store contract interactions.
//!
//! The on-chain store exposes `isAvailable`, `getData` and `setData` and
//! nothing else, so this backend has no compare-and-swap: index appends
//! fall back to read-modify-write.

use std::str::FromStr;

use alloy::{
    network::EthereumWallet,
    primitives::{Address, Bytes},
    providers::{Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    sol,
};

use super::{KeyValueStore, StoreError, StoreResult};

// Define the store interface using alloy's sol! macro
sol! {
    #[sol(rpc)]
    interface IKeyValueStore {
        function isAvailable() external view returns (bool);
        function getData(string key) external view returns (bytes);
        function setData(string key, bytes value) external;
    }
}

/// Key/value store contract wrapper.
pub struct ContractStore<P> {
    contract: IKeyValueStore::IKeyValueStoreInstance<P>,
    address: Address,
}

impl<P: Provider + Clone> ContractStore<P> {
    /// Create a new store contract instance.
    pub fn new(provider: &P, contract_address: &str) -> StoreResult<Self> {
        let address = Address::from_str(contract_address)
            .map_err(|e| StoreError::InvalidAddress(e.to_string()))?;

        let contract = IKeyValueStore::new(address, provider.clone());

        Ok(Self { contract, address })
    }

    /// The contract address.
    pub fn contract_address(&self) -> Address {
        self.address
    }
}

/// Connect to a store contract with a signing wallet (reads and writes).
pub fn connect(
    rpc_url: &str,
    contract_address: &str,
    signer: PrivateKeySigner,
) -> StoreResult<ContractStore<impl Provider + Clone>> {
    let url = parse_rpc_url(rpc_url)?;
    let provider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .connect_http(url);
    ContractStore::new(&provider, contract_address)
}

/// Connect to a store contract without a wallet (reads only).
pub fn connect_read_only(
    rpc_url: &str,
    contract_address: &str,
) -> StoreResult<ContractStore<impl Provider + Clone>> {
    let url = parse_rpc_url(rpc_url)?;
    let provider = ProviderBuilder::new().connect_http(url);
    ContractStore::new(&provider, contract_address)
}

fn parse_rpc_url(rpc_url: &str) -> StoreResult<url::Url> {
    rpc_url
        .parse()
        .map_err(|e: url::ParseError| StoreError::InvalidRpcUrl(e.to_string()))
}

impl<P: Provider + Clone> KeyValueStore for ContractStore<P> {
    fn address(&self) -> String {
        self.address.to_string()
    }

    async fn is_available(&self) -> StoreResult<bool> {
        self.contract
            .isAvailable()
            .call()
            .await
            .map_err(|e| StoreError::Rpc(e.to_string()))
    }

    async fn get_data(&self, key: &str) -> StoreResult<Vec<u8>> {
        let data: Bytes = self
            .contract
            .getData(key.to_string())
            .call()
            .await
            .map_err(|e| StoreError::Contract(e.to_string()))?;
        Ok(data.to_vec())
    }

    async fn set_data(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        let pending = self
            .contract
            .setData(key.to_string(), Bytes::copy_from_slice(value))
            .send()
            .await
            .map_err(|e| StoreError::Contract(e.to_string()))?;

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| StoreError::Rpc(e.to_string()))?;

        if !receipt.status() {
            return Err(StoreError::Contract(format!(
                "setData({key}) reverted in tx {}",
                receipt.transaction_hash
            )));
        }

        tracing::debug!(
            key = %key,
            tx_hash = %receipt.transaction_hash,
            "Store write confirmed"
        );
        Ok(())
    }
}
