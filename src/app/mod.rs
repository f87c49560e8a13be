//! App - composition root and event loop
//!
//! # Architecture
//!
//! ```text
//! AppContext (config + collaborators, built once)
//!   │
//!   └── App
//!         ├── signals: user, account, connection, balance, view, logged_in, last_error
//!         ├── Reconciler (provisioning decision + idempotency flag)
//!         └── handle(Event) → Vec<Command> → effects::execute → Event ...
//! ```
//!
//! # Events
//!
//! | Kind | Events |
//! |------|--------|
//! | user intent | `SignInRequested`, `SignOutRequested`, `ConnectRequested`, `DisconnectRequested`, `PanelSelected`, `PrintRequested`, `RefreshBalance`, `Shutdown` |
//! | upstream push | `UserChanged`, `ConnectionChanged` |
//! | completion | `SignedIn`, `SignedOut`, `WalletProvisioned`, `Connected`, `Disconnected`, `BalanceFetched`, `Printed` |
//!
//! Sign-out, and a switch to a different user, bump the session epoch. Every
//! task carries the epoch it was issued in; completions from an older epoch
//! are dropped, so a provisioning call or a teardown disconnect still in
//! flight resolves into nothing. No task is ever cancelled.
//!
//! Failures are logged and kept in `last_error`; the rendered screen does not
//! change because of them and looks the same as "still loading".

pub mod config;
pub mod context;
pub mod effects;

pub use config::{AppConfig, ChainConfig};
pub use context::{AppContext, AppContextBuilder, MemoryCollaborators};
pub use effects::{Command, Task};

use futures::channel::mpsc;
use futures::future::{self, Either};
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::VecDeque;

use crate::balance::BalanceSnapshot;
use crate::core::Signal;
use crate::error::{CardError, Result};
use crate::reconciler::{select_connector, ReconcileAction, Reconciler};
use crate::session::{ConnectionState, SessionSnapshot, UserIdentity, WalletAccount};
use crate::view::{self, card, layout, Panel, Screen, ViewState};

/// Sign-in generation counter.
pub type Epoch = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    SignInRequested,
    SignOutRequested,
    ConnectRequested,
    DisconnectRequested,
    PanelSelected(Panel),
    PrintRequested,
    RefreshBalance,
    Shutdown,

    UserChanged(Option<UserIdentity>),
    ConnectionChanged(ConnectionState),

    SignedIn { epoch: Epoch, result: Result<UserIdentity> },
    SignedOut { epoch: Epoch, result: Result<()> },
    WalletProvisioned { epoch: Epoch, result: Result<WalletAccount> },
    Connected { epoch: Epoch, result: Result<ConnectionState> },
    Disconnected { epoch: Epoch, result: Result<()> },
    BalanceFetched { epoch: Epoch, address: String, result: Result<Option<BalanceSnapshot>> },
    Printed,
}

pub struct App {
    ctx: AppContext,
    reconciler: Reconciler,
    epoch: Epoch,
    sign_in_pending: bool,
    connect_pending: bool,
    auto_connect_attempted: bool,

    user: Signal<Option<UserIdentity>>,
    account: Signal<Option<WalletAccount>>,
    connection: Signal<ConnectionState>,
    balance: Signal<Option<BalanceSnapshot>>,
    view: Signal<ViewState>,
    logged_in: Signal<bool>,
    last_error: Signal<Option<CardError>>,
}

impl App {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            reconciler: Reconciler::new(),
            epoch: 0,
            sign_in_pending: false,
            connect_pending: false,
            auto_connect_attempted: false,
            user: Signal::new(None),
            account: Signal::new(None),
            connection: Signal::new(ConnectionState::disconnected()),
            balance: Signal::new(None),
            view: Signal::new(ViewState::new()),
            logged_in: Signal::new(false),
            last_error: Signal::new(None),
        }
    }

    // Signals
    pub fn user(&self) -> &Signal<Option<UserIdentity>> { &self.user }
    pub fn account(&self) -> &Signal<Option<WalletAccount>> { &self.account }
    pub fn connection(&self) -> &Signal<ConnectionState> { &self.connection }
    pub fn balance(&self) -> &Signal<Option<BalanceSnapshot>> { &self.balance }
    pub fn view(&self) -> &Signal<ViewState> { &self.view }
    pub fn logged_in(&self) -> &Signal<bool> { &self.logged_in }
    pub fn last_error(&self) -> &Signal<Option<CardError>> { &self.last_error }

    pub fn context(&self) -> &AppContext { &self.ctx }
    pub fn epoch(&self) -> Epoch { self.epoch }
    pub fn panel(&self) -> Panel { self.view.with(|v| v.panel()) }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            user: self.user.get(),
            account: self.account.get(),
            connection: self.connection.get(),
            balance: self.balance.get(),
        }
    }

    pub fn screen(&self) -> Screen {
        view::render(&self.snapshot(), self.panel(), &self.ctx.config().card_label)
    }

    /// Screen inside the landing page frame.
    pub fn page(&self) -> String {
        layout::render_page(&self.screen())
    }

    /// Events that mirror the collaborators' current state into the signals.
    pub fn bootstrap_events(&self) -> Vec<Event> {
        vec![
            Event::UserChanged(self.ctx.identity().current_user()),
            Event::ConnectionChanged(self.ctx.wallet().state()),
        ]
    }

    /// Reconcile one event. Returns the collaborator calls it calls for, each
    /// tagged with the epoch it was issued in.
    pub fn handle(&mut self, event: Event) -> Vec<Task> {
        let mut tasks = Vec::new();
        match event {
            Event::SignInRequested => {
                if self.user.with(Option::is_some) || self.sign_in_pending {
                    tracing::debug!("sign-in ignored: already signed in or pending");
                } else {
                    self.sign_in_pending = true;
                    self.issue(&mut tasks, Command::SignIn);
                }
            }
            Event::SignOutRequested => {
                if self.user.with(Option::is_some) {
                    tracing::info!("signing out");
                }
                self.end_session(&mut tasks, true);
            }
            Event::ConnectRequested => self.request_connect(&mut tasks),
            Event::DisconnectRequested => self.issue(&mut tasks, Command::Disconnect),
            Event::PanelSelected(panel) => {
                self.view.update(|v| v.select(panel));
            }
            Event::PrintRequested => match self.screen() {
                Screen::BusinessCard(card_view) if card_view.wallet.connected => {
                    self.issue(&mut tasks, Command::Print(card::render_card(&card_view)));
                }
                other => tracing::debug!("print ignored on {} screen", other.name()),
            },
            Event::RefreshBalance => self.fetch_balance(&mut tasks),
            Event::Shutdown => {}

            Event::UserChanged(Some(user)) => self.user_arrived(user, &mut tasks),
            Event::UserChanged(None) => {
                if self.user.with(Option::is_some) {
                    tracing::info!("identity provider reported sign-out");
                    self.end_session(&mut tasks, false);
                }
            }
            Event::ConnectionChanged(state) => {
                self.connection.set_if_changed(state);
            }

            Event::SignedIn { epoch, result } => {
                if epoch != self.epoch {
                    tracing::debug!("stale sign-in from epoch {} dropped", epoch);
                } else {
                    self.sign_in_pending = false;
                    match result {
                        Ok(user) => self.user_arrived(user, &mut tasks),
                        Err(e) => self.fail(e),
                    }
                }
            }
            Event::SignedOut { epoch, result } => match result {
                Ok(()) => tracing::debug!("sign-out for epoch {} confirmed", epoch),
                Err(e) if epoch == self.epoch => self.fail(e),
                Err(e) => tracing::warn!("sign-out for closed epoch {} failed: {}", epoch, e),
            },
            Event::WalletProvisioned { epoch, result } => {
                if epoch != self.epoch {
                    tracing::debug!("stale provisioning result from epoch {} dropped", epoch);
                } else {
                    match result {
                        Ok(account) => {
                            tracing::info!("wallet provisioned: {}", account.address());
                            self.account_arrived(account, &mut tasks);
                        }
                        Err(e) => self.fail(e),
                    }
                }
            }
            Event::Connected { epoch, result } => {
                if epoch != self.epoch {
                    tracing::debug!("stale connection from epoch {} dropped", epoch);
                } else {
                    self.connect_pending = false;
                    match result {
                        Ok(state) => {
                            tracing::info!("wallet connected on chain {:?}", state.chain_id);
                            self.connection.set(state);
                            self.fetch_balance(&mut tasks);
                        }
                        Err(e) => self.fail(e),
                    }
                }
            }
            Event::Disconnected { epoch, result } => {
                if epoch != self.epoch {
                    match result {
                        Ok(()) => tracing::debug!("disconnect for closed epoch {} done", epoch),
                        Err(e) => tracing::warn!("disconnect for closed epoch {} failed: {}", epoch, e),
                    }
                } else {
                    match result {
                        Ok(()) => {
                            self.connection.set_if_changed(ConnectionState::disconnected());
                        }
                        Err(e) => self.fail(e),
                    }
                }
            }
            Event::BalanceFetched { epoch, address, result } => {
                let current = self.account.with(|a| a.as_ref().map(|a| a.address() == address).unwrap_or(false));
                if epoch != self.epoch || !current {
                    tracing::debug!("stale balance for {} dropped", address);
                } else {
                    match result {
                        Ok(Some(snapshot)) => self.balance.set(Some(snapshot)),
                        Ok(None) => tracing::debug!("balance for {} still pending", address),
                        Err(e) => self.fail(e),
                    }
                }
            }
            Event::Printed => tracing::info!("business card sent to printer"),
        }
        tasks
    }

    /// Handle an event and drive every task it spawns to completion.
    pub async fn dispatch(&mut self, event: Event) {
        let mut queue = VecDeque::from([event]);
        let mut in_flight = FuturesUnordered::new();
        loop {
            while let Some(next) = queue.pop_front() {
                for task in self.handle(next) {
                    in_flight.push(effects::spawn(self.ctx.clone(), task));
                }
            }
            match in_flight.next().await {
                Some(done) => queue.push_back(done),
                None => break,
            }
        }
    }

    /// Cooperative event loop. Returns on `Event::Shutdown`, or once the sender
    /// is dropped and in-flight tasks have settled.
    pub async fn run(&mut self, mut events: mpsc::UnboundedReceiver<Event>) {
        let mut in_flight = FuturesUnordered::new();
        let mut queue: VecDeque<Event> = self.bootstrap_events().into();

        loop {
            while let Some(next) = queue.pop_front() {
                if next == Event::Shutdown {
                    tracing::info!("event loop stopping");
                    return;
                }
                for task in self.handle(next) {
                    in_flight.push(effects::spawn(self.ctx.clone(), task));
                }
            }

            let step = if in_flight.is_empty() {
                Either::Left(events.next().await)
            } else {
                match future::select(events.next(), in_flight.next()).await {
                    Either::Left((incoming, _)) => Either::Left(incoming),
                    Either::Right((done, _)) => Either::Right(done),
                }
            };

            match step {
                Either::Left(Some(incoming)) => queue.push_back(incoming),
                Either::Left(None) => {
                    while let Some(done) = in_flight.next().await {
                        for task in self.handle(done) {
                            in_flight.push(effects::spawn(self.ctx.clone(), task));
                        }
                    }
                    return;
                }
                Either::Right(Some(done)) => queue.push_back(done),
                Either::Right(None) => {}
            }
        }
    }

    fn issue(&self, tasks: &mut Vec<Task>, command: Command) {
        tasks.push(Task::new(command, self.epoch));
    }

    fn user_arrived(&mut self, user: UserIdentity, tasks: &mut Vec<Task>) {
        match self.user.with(|u| u.as_ref().map(|u| u.id.clone())) {
            Some(previous) if previous != user.id => {
                // Another user took over without a sign-out: nothing of the
                // previous session carries over.
                tracing::info!("user switched from {} to {}", previous, user.id);
                self.end_session(tasks, false);
                tracing::info!("signed in as {}", user.label());
            }
            Some(_) => {}
            None => tracing::info!("signed in as {}", user.label()),
        }
        self.user.set_if_changed(Some(user));
        if let Some(account) = self.ctx.identity().wallet() {
            self.account_arrived(account, tasks);
        } else {
            self.reconcile(tasks);
        }
    }

    fn account_arrived(&mut self, account: WalletAccount, tasks: &mut Vec<Task>) {
        let changed = self.account.set_if_changed(Some(account));
        if changed {
            self.balance.set(None);
        }
        self.reconcile(tasks);
        if !changed {
            return;
        }
        self.fetch_balance(tasks);
        if self.ctx.config().auto_connect && !self.auto_connect_attempted && !self.connection.with(|c| c.connected) {
            self.auto_connect_attempted = true;
            self.request_connect(tasks);
        }
    }

    fn reconcile(&mut self, tasks: &mut Vec<Task>) {
        let user_present = self.user.with(Option::is_some);
        let has_wallet = self.account.with(Option::is_some);
        if let Some(ReconcileAction::ProvisionWallet) = self.reconciler.observe(user_present, has_wallet) {
            tracing::info!("no wallet yet, provisioning");
            self.issue(tasks, Command::ProvisionWallet);
        }
        self.logged_in.set_if_changed(self.reconciler.logged_in());
    }

    fn request_connect(&mut self, tasks: &mut Vec<Task>) {
        if self.account.with(Option::is_none) {
            tracing::debug!("connect ignored: no wallet");
            return;
        }
        if self.connect_pending {
            tracing::debug!("connect ignored: handshake in flight");
            return;
        }
        match select_connector(&self.ctx.wallet().connectors()) {
            Ok(connector) => {
                tracing::info!("connecting via {}", connector.name);
                self.connect_pending = true;
                self.issue(tasks, Command::Connect(connector));
            }
            Err(e) => self.fail(e),
        }
    }

    fn fetch_balance(&self, tasks: &mut Vec<Task>) {
        if let Some(account) = self.account.get() {
            self.issue(tasks, Command::FetchBalance(account.address().to_string()));
        }
    }

    /// Teardown calls are issued in the closing epoch, then the session is cleared.
    fn end_session(&mut self, tasks: &mut Vec<Task>, sign_out: bool) {
        if sign_out {
            self.issue(tasks, Command::SignOut);
        }
        if self.connection.with(|c| c.connected) {
            self.issue(tasks, Command::Disconnect);
        }
        self.clear_session();
    }

    fn clear_session(&mut self) {
        self.epoch += 1;
        self.sign_in_pending = false;
        self.connect_pending = false;
        self.auto_connect_attempted = false;
        self.user.set_if_changed(None);
        self.account.set_if_changed(None);
        self.balance.set_if_changed(None);
        self.connection.set_if_changed(ConnectionState::disconnected());
        self.view.set_if_changed(ViewState::new());
        self.reconciler.reset();
        self.logged_in.set_if_changed(false);
    }

    fn fail(&self, error: CardError) {
        tracing::warn!("{} ({})", error, error.kind());
        self.last_error.set(Some(error));
    }
}
