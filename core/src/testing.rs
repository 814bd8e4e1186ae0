//! Scripted wallet and a poll-to-completion helper for driving async controller code in tests.

use alloc::string::ToString;
use alloc::vec::Vec;
use core::cell::Cell;
use core::future::Future;
use core::pin::pin;
use core::task::{Context, Poll, Waker};

use crate::{Account, PaymentRequest, TransactionReceipt, WalletError, WalletService};

/// Polls `future` until it completes. Only suitable for futures that never wait on outside events.
pub(crate) fn block_on<F: Future>(future: F) -> F::Output {
    let mut future = pin!(future);
    let mut cx = Context::from_waker(Waker::noop());
    loop {
        if let Poll::Ready(output) = future.as_mut().poll(&mut cx) {
            return output;
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct MockSigner(pub Account);

pub(crate) struct MockWallet {
    pub accounts: Result<Vec<Account>, WalletError>,
    pub signer_error: Option<WalletError>,
    pub payment: Result<TransactionReceipt, WalletError>,
    pub account_requests: Cell<u32>,
    pub signer_requests: Cell<u32>,
    pub payments: Cell<u32>,
}

impl MockWallet {
    pub fn with_accounts(accounts: &[&str]) -> Self {
        Self {
            accounts: Ok(accounts.iter().copied().map(Account::new).collect()),
            signer_error: None,
            payment: Ok(TransactionReceipt {
                transaction_hash: "0xfeed".to_string(),
            }),
            account_requests: Cell::new(0),
            signer_requests: Cell::new(0),
            payments: Cell::new(0),
        }
    }

    pub fn connected() -> Self {
        Self::with_accounts(&["0x11e6c3B1CD4AE2FcC6F1C60500e876E43b0115b7"])
    }

    pub fn failing_accounts(error: WalletError) -> Self {
        Self {
            accounts: Err(error),
            ..Self::connected()
        }
    }

    pub fn failing_payment(error: WalletError) -> Self {
        Self {
            payment: Err(error),
            ..Self::connected()
        }
    }
}

impl WalletService for MockWallet {
    type Signer = MockSigner;

    async fn request_accounts(&self) -> Result<Vec<Account>, WalletError> {
        self.account_requests.set(self.account_requests.get() + 1);
        self.accounts.clone()
    }

    async fn get_signer(&self, account: &Account) -> Result<MockSigner, WalletError> {
        self.signer_requests.set(self.signer_requests.get() + 1);
        match &self.signer_error {
            Some(error) => Err(error.clone()),
            None => Ok(MockSigner(account.clone())),
        }
    }

    async fn execute_payment(
        &self,
        _signer: &MockSigner,
        _payment: &PaymentRequest,
    ) -> Result<TransactionReceipt, WalletError> {
        self.payments.set(self.payments.get() + 1);
        self.payment.clone()
    }
}
