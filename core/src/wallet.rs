use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::future::Future;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Wallet address as reported by the provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Account(String);

impl Account {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `0x1234...abcd` form used on the wallet button.
    pub fn short_label(&self) -> String {
        let address = self.as_str();
        if !address.is_ascii() || address.len() <= 10 {
            return address.to_string();
        }
        format!("{}...{}", &address[..6], &address[address.len() - 4..])
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Amount in the smallest unit of the chain's native currency (18 decimals).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NativeAmount(u128);

impl NativeAmount {
    pub const DECIMALS: u32 = 18;
    pub const ONE: Self = Self(10u128.pow(Self::DECIMALS));

    pub const fn from_base_units(amount: u128) -> Self {
        Self(amount)
    }

    pub const fn base_units(self) -> u128 {
        self.0
    }

    /// JSON-RPC quantity encoding, e.g. `0x2386f26fc10000`.
    pub fn to_hex_quantity(self) -> String {
        format!("{:#x}", self.0)
    }
}

impl fmt::Display for NativeAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / Self::ONE.0;
        let fraction = self.0 % Self::ONE.0;
        if fraction == 0 {
            return write!(f, "{whole}");
        }
        let digits = format!("{:0width$}", fraction, width = Self::DECIMALS as usize);
        write!(f, "{whole}.{}", digits.trim_end_matches('0'))
    }
}

/// Where and how much a turn costs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfig {
    pub contract_address: String,
    pub method: String,
    /// First four bytes of the keccak-256 hash of the method signature.
    pub selector: [u8; 4],
    pub price: NativeAmount,
    pub currency: String,
}

impl PaymentConfig {
    pub const DEFAULT_CONTRACT: &'static str = "0x11e6c3B1CD4AE2FcC6F1C60500e876E43b0115b7";
    /// `purchaseGame()`
    pub const PURCHASE_GAME_SELECTOR: [u8; 4] = [0xde, 0x65, 0xda, 0x20];
    /// 0.01 of the native unit.
    pub const DEFAULT_PRICE: NativeAmount = NativeAmount::from_base_units(10_000_000_000_000_000);

    pub fn request(&self) -> PaymentRequest {
        PaymentRequest {
            contract_address: self.contract_address.clone(),
            method: self.method.clone(),
            selector: self.selector,
            amount: self.price,
        }
    }

    pub fn price_label(&self) -> String {
        format!("{} {}", self.price, self.currency)
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            contract_address: Self::DEFAULT_CONTRACT.to_string(),
            method: "purchaseGame".to_string(),
            selector: Self::PURCHASE_GAME_SELECTOR,
            price: Self::DEFAULT_PRICE,
            currency: "MON".to_string(),
        }
    }
}

/// A single payable contract call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub contract_address: String,
    pub method: String,
    pub selector: [u8; 4],
    pub amount: NativeAmount,
}

impl PaymentRequest {
    /// Call data for a method without arguments.
    pub fn calldata_hex(&self) -> String {
        let mut data = String::from("0x");
        for byte in self.selector {
            data.push_str(&format!("{byte:02x}"));
        }
        data
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub transaction_hash: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("No wallet provider available")]
    ProviderUnavailable,
    #[error("Request rejected by the user")]
    UserRejected,
    #[error("Wallet returned no accounts")]
    NoAccounts,
    #[error("Insufficient funds")]
    InsufficientFunds,
    #[error("Chain error: {0}")]
    ChainError(String),
    #[error("Timed out waiting for confirmation")]
    Timeout,
}

/// External wallet provider. Key management, signing and chain RPC all live behind this trait.
///
/// Futures are not required to be `Send`, browser promise futures are single threaded.
pub trait WalletService {
    type Signer: Clone;

    fn request_accounts(&self) -> impl Future<Output = Result<Vec<Account>, WalletError>>;

    fn get_signer(
        &self,
        account: &Account,
    ) -> impl Future<Output = Result<Self::Signer, WalletError>>;

    /// Submits the payment and resolves once it is confirmed on chain.
    fn execute_payment(
        &self,
        signer: &Self::Signer,
        payment: &PaymentRequest,
    ) -> impl Future<Output = Result<TransactionReceipt, WalletError>>;
}

/// Asks for accounts and binds a signer to the first one.
pub async fn acquire_signer<W: WalletService>(
    wallet: &W,
) -> Result<(Account, W::Signer), WalletError> {
    let accounts = wallet.request_accounts().await?;
    let account = accounts
        .into_iter()
        .next()
        .ok_or(WalletError::NoAccounts)?;
    let signer = wallet.get_signer(&account).await?;
    Ok((account, signer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    #[test]
    fn short_label_keeps_prefix_and_suffix() {
        let account = Account::new("0x11e6c3B1CD4AE2FcC6F1C60500e876E43b0115b7");
        assert_eq!(account.short_label(), "0x11e6...15b7");
        assert_eq!(Account::new("0xabc").short_label(), "0xabc");
    }

    #[test]
    fn native_amount_formats_whole_units() {
        assert_eq!(PaymentConfig::DEFAULT_PRICE.to_string(), "0.01");
        assert_eq!(NativeAmount::ONE.to_string(), "1");
        assert_eq!(NativeAmount::from_base_units(1_500_000_000_000_000_000).to_string(), "1.5");
        assert_eq!(NativeAmount::from_base_units(1).to_string(), "0.000000000000000001");
    }

    #[test]
    fn native_amount_hex_quantity() {
        assert_eq!(PaymentConfig::DEFAULT_PRICE.to_hex_quantity(), "0x2386f26fc10000");
        assert_eq!(NativeAmount::from_base_units(0).to_hex_quantity(), "0x0");
    }

    #[test]
    fn default_payment_request() {
        let config = PaymentConfig::default();
        let request = config.request();

        assert_eq!(request.method, "purchaseGame");
        assert_eq!(request.calldata_hex(), "0xde65da20");
        assert_eq!(request.amount, PaymentConfig::DEFAULT_PRICE);
        assert_eq!(config.price_label(), "0.01 MON");
    }

    #[test]
    fn acquire_signer_uses_first_account() {
        let wallet = MockWallet::with_accounts(&["0xaaa", "0xbbb"]);

        let (account, signer) = block_on(acquire_signer(&wallet)).unwrap();

        assert_eq!(account, Account::new("0xaaa"));
        assert_eq!(signer, MockSigner(Account::new("0xaaa")));
    }

    #[test]
    fn acquire_signer_without_accounts_fails() {
        let wallet = MockWallet::with_accounts(&[]);

        assert_eq!(
            block_on(acquire_signer(&wallet)),
            Err(WalletError::NoAccounts)
        );
        assert_eq!(wallet.signer_requests.get(), 0);
    }
}
