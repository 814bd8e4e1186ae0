use core::mem;
use thiserror::Error;

use crate::*;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Precondition {
    #[error("Please connect your wallet first")]
    WalletNotConnected,
    #[error("A turn is already held")]
    TurnAlreadyHeld,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("No wallet found, install a browser wallet to continue")]
    WalletUnavailable,
    #[error("Request was rejected in the wallet")]
    UserRejected,
    #[error("Wallet connection failed: {0}")]
    ConnectionFailed(WalletError),
    #[error("Transaction failed: {0}")]
    TransactionFailed(WalletError),
    #[error("{0}")]
    PreconditionViolation(#[from] Precondition),
    #[error("Another wallet request is still pending")]
    RequestPending,
}

impl AuthError {
    fn from_connect(error: WalletError) -> Self {
        match error {
            WalletError::ProviderUnavailable => Self::WalletUnavailable,
            WalletError::UserRejected => Self::UserRejected,
            other => Self::ConnectionFailed(other),
        }
    }

    fn from_payment(error: WalletError) -> Self {
        match error {
            WalletError::ProviderUnavailable => Self::WalletUnavailable,
            WalletError::UserRejected => Self::UserRejected,
            other => Self::TransactionFailed(other),
        }
    }
}

pub type AuthResult<T> = core::result::Result<T, AuthError>;

#[derive(Clone, Debug, PartialEq)]
pub struct WalletBinding<S> {
    pub account: Account,
    pub signer: S,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TurnState<S> {
    Disconnected,
    Connected(WalletBinding<S>),
    TurnGranted(WalletBinding<S>),
}

impl<S> TurnState<S> {
    pub const fn binding(&self) -> Option<&WalletBinding<S>> {
        match self {
            Self::Disconnected => None,
            Self::Connected(binding) | Self::TurnGranted(binding) => Some(binding),
        }
    }
}

impl<S> Default for TurnState<S> {
    fn default() -> Self {
        Self::Disconnected
    }
}

/// Wallet request currently awaiting a result.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PendingRequest {
    Connect,
    Purchase,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConnectStart {
    Started,
    AlreadyConnected,
}

/// Everything needed to submit a payment once `begin_purchase` succeeded.
#[derive(Clone, Debug, PartialEq)]
pub struct PurchaseTicket<S> {
    pub signer: S,
    pub payment: PaymentRequest,
}

/// Wallet connection and turn grant state machine.
///
/// Every transition replaces the whole state value. At most one wallet request is in flight; while it is, new
/// requests and disconnects are refused with [`AuthError::RequestPending`].
///
/// Hosts that cannot hold `&mut self` across an await use the `begin_*`/`finish_*` pairs and run the wallet future
/// themselves; [`connect`](Self::connect) and [`purchase`](Self::purchase) combine the two.
#[derive(Clone, Debug, PartialEq)]
pub struct TurnAuthorization<S> {
    state: TurnState<S>,
    pending: Option<PendingRequest>,
}

impl<S> Default for TurnAuthorization<S> {
    fn default() -> Self {
        Self {
            state: TurnState::Disconnected,
            pending: None,
        }
    }
}

impl<S: Clone> TurnAuthorization<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &TurnState<S> {
        &self.state
    }

    pub fn pending(&self) -> Option<PendingRequest> {
        self.pending
    }

    pub fn account(&self) -> Option<&Account> {
        self.state.binding().map(|binding| &binding.account)
    }

    pub fn signer(&self) -> Option<&S> {
        self.state.binding().map(|binding| &binding.signer)
    }

    pub fn is_connected(&self) -> bool {
        self.state.binding().is_some()
    }

    pub fn has_turn(&self) -> bool {
        matches!(self.state, TurnState::TurnGranted(_))
    }

    /// Connected, no turn held and nothing in flight.
    pub fn can_purchase(&self) -> bool {
        matches!(self.state, TurnState::Connected(_)) && self.pending.is_none()
    }

    pub fn begin_connect(&mut self) -> AuthResult<ConnectStart> {
        self.check_idle()?;
        if self.is_connected() {
            return Ok(ConnectStart::AlreadyConnected);
        }
        self.pending = Some(PendingRequest::Connect);
        Ok(ConnectStart::Started)
    }

    pub fn finish_connect(
        &mut self,
        result: core::result::Result<(Account, S), WalletError>,
    ) -> AuthResult<()> {
        if self.pending != Some(PendingRequest::Connect) {
            log::warn!("Ignoring wallet connection result, no connection was requested");
            return Ok(());
        }
        self.pending = None;

        match result {
            Ok((account, signer)) => {
                log::info!("wallet connected: {}", account);
                self.state = TurnState::Connected(WalletBinding { account, signer });
                Ok(())
            }
            Err(err) => {
                log::error!("Wallet connection error: {}", err);
                Err(AuthError::from_connect(err))
            }
        }
    }

    pub fn disconnect(&mut self) -> AuthResult<()> {
        self.check_idle()?;
        if let Some(account) = self.account() {
            log::info!("wallet disconnected: {}", account);
        }
        self.state = TurnState::Disconnected;
        Ok(())
    }

    pub fn begin_purchase(&mut self, config: &PaymentConfig) -> AuthResult<PurchaseTicket<S>> {
        self.check_idle()?;
        let signer = match &self.state {
            TurnState::Disconnected => return Err(Precondition::WalletNotConnected.into()),
            TurnState::TurnGranted(_) => return Err(Precondition::TurnAlreadyHeld.into()),
            TurnState::Connected(binding) => binding.signer.clone(),
        };

        self.pending = Some(PendingRequest::Purchase);
        log::debug!("purchasing turn for {}", config.price_label());
        Ok(PurchaseTicket {
            signer,
            payment: config.request(),
        })
    }

    pub fn finish_purchase(
        &mut self,
        result: core::result::Result<TransactionReceipt, WalletError>,
    ) -> AuthResult<TransactionReceipt> {
        if self.pending != Some(PendingRequest::Purchase) {
            log::warn!("Ignoring purchase result, no purchase was requested");
            return result.map_err(AuthError::from_payment);
        }
        self.pending = None;

        match result {
            Ok(receipt) => {
                self.state = match mem::take(&mut self.state) {
                    TurnState::Connected(binding) => {
                        log::info!("turn purchased: {}", receipt.transaction_hash);
                        TurnState::TurnGranted(binding)
                    }
                    other => {
                        log::warn!("Purchase confirmed but no connected wallet is waiting for it");
                        other
                    }
                };
                Ok(receipt)
            }
            Err(err) => {
                log::error!("Purchase failed: {}", err);
                Err(AuthError::from_payment(err))
            }
        }
    }

    /// Drops a held turn, keeping the wallet connected. Returns whether a turn was held.
    pub fn revoke_turn(&mut self) -> bool {
        let (state, revoked) = match mem::take(&mut self.state) {
            TurnState::TurnGranted(binding) => (TurnState::Connected(binding), true),
            other => (other, false),
        };
        self.state = state;
        revoked
    }

    pub async fn connect<W>(&mut self, wallet: &W) -> AuthResult<()>
    where
        W: WalletService<Signer = S>,
    {
        if self.begin_connect()? == ConnectStart::AlreadyConnected {
            return Ok(());
        }
        let result = acquire_signer(wallet).await;
        self.finish_connect(result)
    }

    pub async fn purchase<W>(
        &mut self,
        wallet: &W,
        config: &PaymentConfig,
    ) -> AuthResult<TransactionReceipt>
    where
        W: WalletService<Signer = S>,
    {
        let ticket = self.begin_purchase(config)?;
        let result = wallet.execute_payment(&ticket.signer, &ticket.payment).await;
        self.finish_purchase(result)
    }

    fn check_idle(&self) -> AuthResult<()> {
        match self.pending {
            Some(_) => Err(AuthError::RequestPending),
            None => Ok(()),
        }
    }
}
