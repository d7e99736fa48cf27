//! In-memory wallet API and chain used by the view tests

use crate::api::{
    Credentials, LoginOutcome, RegisterOutcome, SaveWalletOutcome, WalletApi, WalletRecord,
};
use crate::session::{Session, User, UserId};
use crate::wallet::{ChainClient, MinedReceipt, SecureWallet, SubmittedTransfer};
use crate::{Error, Result};
use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const KEY_A: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const ADDR_A: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
pub const KEY_B: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
pub const ADDR_B: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

pub fn eth(whole: u64) -> U256 {
    U256::from(whole) * U256::from(1_000_000_000_000_000_000u128)
}

pub fn addr(s: &str) -> Address {
    Address::from_str(s).unwrap()
}

fn transport_error() -> Error {
    Error::Io(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "connection refused",
    ))
}

pub enum Script<T> {
    Reply(T),
    Transport,
}

pub struct FakeApi {
    pub login: Mutex<Script<std::result::Result<(String, User), String>>>,
    pub register: Mutex<Script<RegisterOutcome>>,
    pub wallets: Mutex<Script<std::result::Result<Vec<WalletRecord>, String>>>,
    pub save: Mutex<Script<SaveWalletOutcome>>,
    pub saved: Mutex<Vec<WalletRecord>>,
    pub tokens_seen: Mutex<Vec<String>>,
    pub calls: AtomicUsize,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self {
            login: Mutex::new(Script::Reply(Ok((
                "tok-1".to_string(),
                User {
                    id: UserId::Number(1),
                    email: "alice@example.com".to_string(),
                },
            )))),
            register: Mutex::new(Script::Reply(RegisterOutcome::Registered)),
            wallets: Mutex::new(Script::Reply(Ok(Vec::new()))),
            save: Mutex::new(Script::Reply(SaveWalletOutcome::Saved)),
            saved: Mutex::new(Vec::new()),
            tokens_seen: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }
}

impl FakeApi {
    pub fn with_wallets(records: Vec<WalletRecord>) -> Self {
        let api = Self::default();
        *api.wallets.lock().unwrap() = Script::Reply(Ok(records));
        api
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletApi for FakeApi {
    async fn login(&self, _credentials: &Credentials) -> Result<LoginOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &*self.login.lock().unwrap() {
            Script::Reply(Ok((token, user))) => {
                Ok(LoginOutcome::LoggedIn(Session::new(token.clone(), user.clone())))
            }
            Script::Reply(Err(message)) => Ok(LoginOutcome::Rejected {
                message: message.clone(),
            }),
            Script::Transport => Err(transport_error()),
        }
    }

    async fn register(&self, _credentials: &Credentials) -> Result<RegisterOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &*self.register.lock().unwrap() {
            Script::Reply(outcome) => Ok(outcome.clone()),
            Script::Transport => Err(transport_error()),
        }
    }

    async fn list_wallets(&self, token: &str) -> Result<Vec<WalletRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tokens_seen.lock().unwrap().push(token.to_string());
        match &*self.wallets.lock().unwrap() {
            Script::Reply(Ok(records)) => Ok(records.clone()),
            Script::Reply(Err(message)) => Err(Error::Rejected(message.clone())),
            Script::Transport => Err(transport_error()),
        }
    }

    async fn save_wallet(&self, token: &str, record: &WalletRecord) -> Result<SaveWalletOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tokens_seen.lock().unwrap().push(token.to_string());
        match &*self.save.lock().unwrap() {
            Script::Reply(outcome) => {
                if *outcome == SaveWalletOutcome::Saved {
                    self.saved.lock().unwrap().push(record.clone());
                }
                Ok(outcome.clone())
            }
            Script::Transport => Err(transport_error()),
        }
    }
}

/// Chain whose balances move when transfers are mined
pub struct FakeChain {
    pub balances: Mutex<HashMap<Address, U256>>,
    pub balance_fails: Mutex<bool>,
    pub submit_error: Mutex<Option<String>>,
    /// `None` simulates a receipt that never shows up
    pub mined: Mutex<Option<MinedReceipt>>,
    pending: Mutex<Option<SubmittedTransfer>>,
    pub calls: AtomicUsize,
    pub balance_calls: AtomicUsize,
}

/// Fee charged to the sender when a transfer is mined (21000 gas at 1 gwei)
pub const GAS_FEE_WEI: u64 = 21_000_000_000_000;

impl Default for FakeChain {
    fn default() -> Self {
        Self {
            balances: Mutex::new(HashMap::new()),
            balance_fails: Mutex::new(false),
            submit_error: Mutex::new(None),
            mined: Mutex::new(Some(MinedReceipt {
                block_number: Some(1_234),
                gas_used: 21_000,
                success: true,
                confirmations: 1,
            })),
            pending: Mutex::new(None),
            calls: AtomicUsize::new(0),
            balance_calls: AtomicUsize::new(0),
        }
    }
}

impl FakeChain {
    pub fn with_balance(address: &str, wei: U256) -> Self {
        let chain = Self::default();
        chain.balances.lock().unwrap().insert(addr(address), wei);
        chain
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn balance_calls(&self) -> usize {
        self.balance_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainClient for FakeChain {
    async fn balance(&self, address: Address) -> Result<U256> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        if *self.balance_fails.lock().unwrap() {
            return Err(Error::Rpc("node unavailable".to_string()));
        }
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(&address)
            .copied()
            .unwrap_or(U256::ZERO))
    }

    async fn submit_transfer(
        &self,
        wallet: &SecureWallet,
        to: Address,
        value: U256,
    ) -> Result<SubmittedTransfer> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.submit_error.lock().unwrap().clone() {
            return Err(Error::Chain(reason));
        }
        let transfer = SubmittedTransfer {
            hash: TxHash::repeat_byte(0x77),
            from: wallet.address(),
            to,
            value,
        };
        *self.pending.lock().unwrap() = Some(transfer.clone());
        Ok(transfer)
    }

    async fn wait_for_receipt(&self, _hash: TxHash) -> Result<Option<MinedReceipt>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mined = self.mined.lock().unwrap().clone();
        let pending = self.pending.lock().unwrap().take();
        if let (Some(receipt), Some(transfer)) = (&mined, pending) {
            let mut balances = self.balances.lock().unwrap();
            let from = balances.entry(transfer.from).or_insert(U256::ZERO);
            *from = from.saturating_sub(U256::from(GAS_FEE_WEI));
            if receipt.success {
                *from = from.saturating_sub(transfer.value);
                *balances.entry(transfer.to).or_insert(U256::ZERO) += transfer.value;
            }
        }
        Ok(mined)
    }
}
