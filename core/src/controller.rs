use crate::*;

/// Status line shown above the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StatusBanner {
    GameOver,
    Won,
    PurchaseRequired,
    Playing,
}

/// Top-level coordinator owning the current round and the wallet/turn state.
///
/// Board moves go through [`reveal`](Self::reveal) and [`toggle_flag`](Self::toggle_flag), which only reach the board
/// while a turn is held and the round is still being played.
#[derive(Clone, Debug, PartialEq)]
pub struct GameController<S> {
    config: GameConfig,
    payment: PaymentConfig,
    session: GameSession,
    auth: TurnAuthorization<S>,
}

impl<S: Clone> GameController<S> {
    pub fn new(config: GameConfig, payment: PaymentConfig, seed: u64) -> Self {
        let session = GameSession::generate(RandomBoardGenerator::new(seed), config);
        Self::with_session(config, payment, session)
    }

    /// Controller around a prepared board; later resets use the board's size and mine count.
    pub fn with_board(board: Board, payment: PaymentConfig) -> Self {
        let config = board.game_config();
        Self::with_session(config, payment, GameSession::new(board))
    }

    fn with_session(config: GameConfig, payment: PaymentConfig, session: GameSession) -> Self {
        Self {
            config,
            payment,
            session,
            auth: TurnAuthorization::new(),
        }
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn payment_config(&self) -> &PaymentConfig {
        &self.payment
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn board(&self) -> &Board {
        self.session.board()
    }

    pub fn auth(&self) -> &TurnAuthorization<S> {
        &self.auth
    }

    pub fn status(&self) -> GameStatus {
        self.session.status()
    }

    pub fn can_play(&self) -> bool {
        self.auth.has_turn() && !self.session.is_finished()
    }

    pub fn can_purchase(&self) -> bool {
        self.auth.can_purchase()
    }

    pub fn status_banner(&self) -> StatusBanner {
        match self.status() {
            GameStatus::Lost => StatusBanner::GameOver,
            GameStatus::Won => StatusBanner::Won,
            GameStatus::Playing if !self.auth.has_turn() => StatusBanner::PurchaseRequired,
            GameStatus::Playing => StatusBanner::Playing,
        }
    }

    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        self.check_can_play()?;
        let outcome = self.session.reveal(coords)?;
        match outcome {
            RevealOutcome::HitMine => log::info!("Game over, mine at {:?}", coords),
            RevealOutcome::Won => log::info!("Board cleared"),
            _ => {}
        }
        Ok(outcome)
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        self.check_can_play()?;
        self.session.toggle_flag(coords)
    }

    /// Starts a new round on a fresh board. The wallet stays connected but a held turn is spent.
    pub fn reset(&mut self, seed: u64) {
        self.session = GameSession::generate(RandomBoardGenerator::new(seed), self.config);
        if self.auth.revoke_turn() {
            log::debug!("turn consumed by reset");
        }
    }

    pub fn begin_connect(&mut self) -> AuthResult<ConnectStart> {
        self.auth.begin_connect()
    }

    pub fn finish_connect(
        &mut self,
        result: core::result::Result<(Account, S), WalletError>,
    ) -> AuthResult<()> {
        self.auth.finish_connect(result)
    }

    pub fn disconnect_wallet(&mut self) -> AuthResult<()> {
        self.auth.disconnect()
    }

    pub fn begin_purchase(&mut self) -> AuthResult<PurchaseTicket<S>> {
        self.auth.begin_purchase(&self.payment)
    }

    pub fn finish_purchase(
        &mut self,
        result: core::result::Result<TransactionReceipt, WalletError>,
    ) -> AuthResult<TransactionReceipt> {
        self.auth.finish_purchase(result)
    }

    pub async fn connect_wallet<W>(&mut self, wallet: &W) -> AuthResult<()>
    where
        W: WalletService<Signer = S>,
    {
        self.auth.connect(wallet).await
    }

    pub async fn purchase_turn<W>(&mut self, wallet: &W) -> AuthResult<TransactionReceipt>
    where
        W: WalletService<Signer = S>,
    {
        self.auth.purchase(wallet, &self.payment).await
    }

    fn check_can_play(&self) -> Result<()> {
        if !self.auth.has_turn() {
            Err(GameError::NoTurn)
        } else if self.session.is_finished() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }
}
