use crate::utils::js_random_seed;
use crate::wallet::{Eip1193Signer, Eip1193Wallet};
use clap::Args;
use turnsweeper_core as game;
use yew::prelude::*;

use game::{
    Account, AuthError, ConnectStart, GameConfig, PaymentConfig, PendingRequest, StatusBanner,
    TransactionReceipt, WalletError, WalletService,
};

pub trait HasUpdate {
    fn has_update(self) -> bool;
}

impl<E: std::fmt::Display> HasUpdate for Result<game::MarkOutcome, E> {
    fn has_update(self) -> bool {
        self.map_or_else(
            |err| {
                log::debug!("flag rejected: {}", err);
                false
            },
            |outcome| outcome.has_update(),
        )
    }
}

impl<E: std::fmt::Display> HasUpdate for Result<game::RevealOutcome, E> {
    fn has_update(self) -> bool {
        self.map_or_else(
            |err| {
                log::debug!("reveal rejected: {}", err);
                false
            },
            |outcome| outcome.has_update(),
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Notice {
    Info(String),
    Error(String),
}

impl Notice {
    fn from_auth_error(err: &AuthError) -> Self {
        log::warn!("{}", err);
        Self::Error(err.to_string())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Msg {
    Reveal(game::Coord2),
    Flag(game::Coord2),
    ToggleWallet,
    WalletConnected(Result<(Account, Eip1193Signer), WalletError>),
    PurchaseTurn,
    PurchaseSettled(Result<TransactionReceipt, WalletError>),
    NewGame,
}

#[derive(Properties, Clone, PartialEq)]
struct CellProps {
    row: game::Coord,
    col: game::Coord,
    view: game::CellView,
    #[prop_or_default]
    locked: bool,
    on_reveal: Callback<game::Coord2>,
    on_flag: Callback<game::Coord2>,
}

#[function_component(Tile)]
fn tile_component(props: &CellProps) -> Html {
    use game::CellView::*;

    let CellProps {
        row,
        col,
        view,
        locked,
        on_reveal,
        on_flag,
    } = props.clone();

    let mut class = classes!(
        "cell",
        match view {
            Hidden => classes!(),
            Flagged => classes!("flag"),
            Revealed(count) => classes!("open", format!("num-{}", count)),
            Mine => classes!("open", "mine"),
        }
    );
    if locked {
        class.push("locked");
    }

    let onclick = Callback::from(move |_: MouseEvent| {
        log::trace!("({}, {}) click", row, col);
        on_reveal.emit((row, col));
    });
    let oncontextmenu = Callback::from(move |e: MouseEvent| {
        e.prevent_default();
        log::trace!("({}, {}) context menu", row, col);
        on_flag.emit((row, col));
    });

    html! {
        <td {class} {onclick} {oncontextmenu}>{cell_text(view)}</td>
    }
}

fn cell_text(view: game::CellView) -> String {
    use game::CellView::*;
    match view {
        Hidden | Revealed(0) => String::new(),
        Flagged => "🚩".to_string(),
        Mine => "💣".to_string(),
        Revealed(count) => count.to_string(),
    }
}

fn banner_text(banner: StatusBanner) -> Option<&'static str> {
    match banner {
        StatusBanner::GameOver => Some("Game Over! You hit a mine!"),
        StatusBanner::Won => Some("You Win!"),
        StatusBanner::PurchaseRequired => Some("Purchase a turn to play"),
        StatusBanner::Playing => None,
    }
}

#[derive(Args, Properties, Debug, Clone, PartialEq)]
pub(crate) struct GameProps {
    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Side length of the board
    #[arg(long, default_value_t = GameConfig::DEFAULT_SIZE)]
    size: game::Coord,

    /// Number of mines on the board
    #[arg(long, default_value_t = GameConfig::DEFAULT_MINES)]
    mines: game::CellCount,

    /// Address of the contract selling turns
    #[arg(long)]
    contract: Option<String>,
}

impl GameProps {
    fn game_config(&self) -> GameConfig {
        GameConfig::new(self.size, self.mines).unwrap_or_else(|err| {
            log::warn!(
                "{} ({}x{} with {} mines), using the default board",
                err,
                self.size,
                self.size,
                self.mines
            );
            GameConfig::default()
        })
    }

    fn payment_config(&self) -> PaymentConfig {
        let mut payment = PaymentConfig::default();
        if let Some(contract) = &self.contract {
            payment.contract_address = contract.clone();
        }
        payment
    }
}

pub(crate) struct GameView {
    controller: game::GameController<Eip1193Signer>,
    wallet: Eip1193Wallet,
    fixed_seed: Option<u64>,
    notice: Option<Notice>,
}

impl GameView {
    fn next_seed(&self) -> u64 {
        self.fixed_seed.unwrap_or_else(js_random_seed)
    }

    fn toggle_wallet(&mut self, ctx: &Context<Self>) -> bool {
        if self.controller.auth().is_connected() {
            return match self.controller.disconnect_wallet() {
                Ok(()) => {
                    log::info!("wallet disconnected");
                    self.notice = None;
                    true
                }
                Err(err) => {
                    self.notice = Some(Notice::from_auth_error(&err));
                    true
                }
            };
        }

        match self.controller.begin_connect() {
            Ok(ConnectStart::Started) => {
                let wallet = self.wallet;
                ctx.link().send_future(async move {
                    Msg::WalletConnected(game::acquire_signer(&wallet).await)
                });
                self.notice = None;
                true
            }
            Ok(ConnectStart::AlreadyConnected) => false,
            Err(err) => {
                self.notice = Some(Notice::from_auth_error(&err));
                true
            }
        }
    }

    fn purchase_turn(&mut self, ctx: &Context<Self>) -> bool {
        match self.controller.begin_purchase() {
            Ok(ticket) => {
                let wallet = self.wallet;
                ctx.link().send_future(async move {
                    Msg::PurchaseSettled(wallet.execute_payment(&ticket.signer, &ticket.payment).await)
                });
                self.notice = Some(Notice::Info("Confirm the purchase in your wallet".to_string()));
            }
            Err(err) => self.notice = Some(Notice::from_auth_error(&err)),
        }
        true
    }

    fn wallet_label(&self) -> String {
        let auth = self.controller.auth();
        match (auth.account(), auth.pending()) {
            (Some(account), _) => account.short_label(),
            (None, Some(PendingRequest::Connect)) => "Connecting...".to_string(),
            (None, _) => "Connect Wallet".to_string(),
        }
    }
}

impl Component for GameView {
    type Message = Msg;
    type Properties = GameProps;

    fn create(ctx: &Context<Self>) -> Self {
        let props = ctx.props();
        let fixed_seed = props.seed;
        let seed = fixed_seed.unwrap_or_else(js_random_seed);
        log::debug!("seed: {}", seed);

        Self {
            controller: game::GameController::new(props.game_config(), props.payment_config(), seed),
            wallet: Eip1193Wallet,
            fixed_seed,
            notice: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        use Msg::*;

        match msg {
            Reveal(coords) => {
                log::debug!("reveal cell: {:?}", coords);
                self.controller.reveal(coords).has_update()
            }
            Flag(coords) => {
                log::debug!("mark cell: {:?}", coords);
                self.controller.toggle_flag(coords).has_update()
            }
            ToggleWallet => self.toggle_wallet(ctx),
            WalletConnected(result) => {
                if let Err(err) = self.controller.finish_connect(result) {
                    self.notice = Some(Notice::from_auth_error(&err));
                }
                true
            }
            PurchaseTurn => self.purchase_turn(ctx),
            PurchaseSettled(result) => {
                self.notice = Some(match self.controller.finish_purchase(result) {
                    Ok(_) => Notice::Info("Purchase successful! You can now play.".to_string()),
                    Err(err) => Notice::from_auth_error(&err),
                });
                true
            }
            NewGame => {
                let seed = self.next_seed();
                log::debug!("new game, seed: {}", seed);
                self.controller.reset(seed);
                self.notice = None;
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        use Msg::*;

        let controller = &self.controller;
        let auth = controller.auth();
        let size = controller.board().size();
        let locked = !controller.can_play();

        let on_reveal = ctx.link().callback(Reveal);
        let on_flag = ctx.link().callback(Flag);
        let cb_wallet = ctx.link().callback(|_: MouseEvent| ToggleWallet);
        let cb_purchase = ctx.link().callback(|_: MouseEvent| PurchaseTurn);
        let cb_new_game = ctx.link().callback(|e: MouseEvent| {
            e.stop_propagation();
            NewGame
        });

        let status_class = classes!(match controller.status() {
            game::GameStatus::Playing if locked => "locked",
            game::GameStatus::Playing => "in-progress",
            game::GameStatus::Won => "win",
            game::GameStatus::Lost => "lose",
        });
        let show_purchase = auth.is_connected() && !auth.has_turn();
        let purchase_pending = auth.pending() == Some(PendingRequest::Purchase);
        let connect_pending = auth.pending() == Some(PendingRequest::Connect);
        let purchase_label = if purchase_pending {
            "Processing...".to_string()
        } else {
            format!("Purchase Turn ({})", controller.payment_config().price_label())
        };

        html! {
            <div class="turnsweeper" oncontextmenu={Callback::from(move |e: MouseEvent| e.prevent_default())}>
                <nav class="wallet">
                    <button class="wallet-button" onclick={cb_wallet} disabled={connect_pending || purchase_pending}>
                        {self.wallet_label()}
                    </button>
                    if show_purchase {
                        <button class="purchase-button" onclick={cb_purchase} disabled={!controller.can_purchase()}>
                            {purchase_label}
                        </button>
                    }
                </nav>
                <h1>{"Minesweeper"}</h1>
                if let Some(text) = banner_text(controller.status_banner()) {
                    <h2 class={classes!("status", status_class.clone())}>{text}</h2>
                }
                if let Some(notice) = &self.notice {
                    {match notice {
                        Notice::Info(text) => html! { <p class="notice">{text}</p> },
                        Notice::Error(text) => html! { <p class="notice error">{text}</p> },
                    }}
                }
                <table class={classes!("board", status_class)}>
                    { for (0..size).map(|row| html! {
                        <tr>
                            { for (0..size).map(|col| html! {
                                <Tile
                                    {row}
                                    {col}
                                    view={controller.board()[(row, col)].view()}
                                    {locked}
                                    on_reveal={on_reveal.clone()}
                                    on_flag={on_flag.clone()}
                                />
                            }) }
                        </tr>
                    }) }
                </table>
                <button class="new-game" onclick={cb_new_game}>{"New Game"}</button>
            </div>
        }
    }
}
