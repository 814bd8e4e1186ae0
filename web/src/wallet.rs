use gloo::timers::future::TimeoutFuture;
use js_sys::{Function, JSON, Promise, Reflect};
use serde_json::{Value, json};
use turnsweeper_core as game;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use game::{Account, PaymentRequest, TransactionReceipt, WalletError, WalletService};

/// EIP-1193 "user rejected request".
const USER_REJECTED_CODE: i64 = 4001;
const RECEIPT_POLL_INTERVAL_MS: u32 = 2_000;
const RECEIPT_POLL_ATTEMPTS: u32 = 90;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Eip1193Signer {
    account: Account,
}

/// Injected browser wallet reached through `window.ethereum`.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct Eip1193Wallet;

impl Eip1193Wallet {
    fn provider() -> Result<JsValue, WalletError> {
        let window = gloo::utils::window();
        let ethereum = Reflect::get(&window, &JsValue::from_str("ethereum"))
            .map_err(|_| WalletError::ProviderUnavailable)?;
        if ethereum.is_undefined() || ethereum.is_null() {
            log::warn!("window.ethereum is not injected");
            return Err(WalletError::ProviderUnavailable);
        }
        Ok(ethereum)
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, WalletError> {
        let provider = Self::provider()?;
        let request: Function = Reflect::get(&provider, &JsValue::from_str("request"))
            .ok()
            .and_then(|request| request.dyn_into().ok())
            .ok_or(WalletError::ProviderUnavailable)?;

        let args = json!({ "method": method, "params": params });
        log::trace!("provider request: {}", args);
        let args = JSON::parse(&args.to_string()).map_err(|err| classify_js_error(&err))?;

        let promise: Promise = request
            .call1(&provider, &args)
            .map_err(|err| classify_js_error(&err))?
            .dyn_into()
            .map_err(|_| WalletError::ChainError(format!("{method} did not return a promise")))?;
        let response = JsFuture::from(promise)
            .await
            .map_err(|err| classify_js_error(&err))?;

        if response.is_undefined() {
            return Ok(Value::Null);
        }
        let text: String = JSON::stringify(&response)
            .map_err(|err| classify_js_error(&err))?
            .into();
        serde_json::from_str(&text).map_err(|err| WalletError::ChainError(err.to_string()))
    }

    async fn wait_for_receipt(&self, transaction_hash: &str) -> Result<TransactionReceipt, WalletError> {
        for attempt in 1..=RECEIPT_POLL_ATTEMPTS {
            let receipt = self
                .request("eth_getTransactionReceipt", json!([transaction_hash]))
                .await?;
            match receipt_succeeded(&receipt) {
                None => {
                    log::trace!("receipt for {} not ready (attempt {})", transaction_hash, attempt);
                    TimeoutFuture::new(RECEIPT_POLL_INTERVAL_MS).await;
                }
                Some(true) => {
                    return Ok(TransactionReceipt {
                        transaction_hash: transaction_hash.to_string(),
                    });
                }
                Some(false) => {
                    return Err(WalletError::ChainError(format!(
                        "transaction {transaction_hash} reverted"
                    )));
                }
            }
        }
        log::warn!("no receipt for {} after {} polls", transaction_hash, RECEIPT_POLL_ATTEMPTS);
        Err(WalletError::Timeout)
    }
}

impl WalletService for Eip1193Wallet {
    type Signer = Eip1193Signer;

    async fn request_accounts(&self) -> Result<Vec<Account>, WalletError> {
        let accounts = self.request("eth_requestAccounts", json!([])).await?;
        parse_accounts(&accounts)
    }

    async fn get_signer(&self, account: &Account) -> Result<Eip1193Signer, WalletError> {
        // the provider signs for whichever account it exposed
        Ok(Eip1193Signer {
            account: account.clone(),
        })
    }

    async fn execute_payment(
        &self,
        signer: &Eip1193Signer,
        payment: &PaymentRequest,
    ) -> Result<TransactionReceipt, WalletError> {
        let transaction = transaction_params(signer, payment);
        let hash = self
            .request("eth_sendTransaction", json!([transaction]))
            .await?;
        let hash = hash
            .as_str()
            .ok_or_else(|| WalletError::ChainError("missing transaction hash".to_string()))?;
        log::info!("{} submitted as {}", payment.method, hash);
        self.wait_for_receipt(hash).await
    }
}

fn transaction_params(signer: &Eip1193Signer, payment: &PaymentRequest) -> Value {
    json!({
        "from": signer.account.as_str(),
        "to": payment.contract_address,
        "value": payment.amount.to_hex_quantity(),
        "data": payment.calldata_hex(),
    })
}

fn parse_accounts(response: &Value) -> Result<Vec<Account>, WalletError> {
    let accounts = response
        .as_array()
        .ok_or_else(|| WalletError::ChainError(format!("unexpected accounts response: {response}")))?;
    Ok(accounts
        .iter()
        .filter_map(Value::as_str)
        .map(Account::new)
        .collect())
}

/// `None` while the transaction is still pending.
fn receipt_succeeded(receipt: &Value) -> Option<bool> {
    if receipt.is_null() {
        return None;
    }
    match receipt.get("status").and_then(Value::as_str) {
        Some("0x0") => Some(false),
        _ => Some(true),
    }
}

fn classify_js_error(err: &JsValue) -> WalletError {
    let code = Reflect::get(err, &JsValue::from_str("code"))
        .ok()
        .and_then(|code| code.as_f64())
        .map(|code| code as i64);
    let message = Reflect::get(err, &JsValue::from_str("message"))
        .ok()
        .and_then(|message| message.as_string())
        .unwrap_or_else(|| format!("{err:?}"));
    classify_provider_error(code, &message)
}

fn classify_provider_error(code: Option<i64>, message: &str) -> WalletError {
    match code {
        Some(USER_REJECTED_CODE) => WalletError::UserRejected,
        _ if message.to_ascii_lowercase().contains("insufficient funds") => {
            WalletError::InsufficientFunds
        }
        _ => WalletError::ChainError(message.to_string()),
    }
}
