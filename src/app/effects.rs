//! Effects: collaborator calls as tasks
//!
//! The app never awaits a collaborator inline. Reconciliation yields
//! [`Command`]s; each command runs as a task that always resolves to a
//! completion [`Event`] carrying the call's `Result`, tagged with the session
//! epoch it was started in.
//!
//! ```text
//! App::handle(event) ──► Vec<Task>   (command + epoch it was issued in)
//!                            │
//!                            ▼
//!                 execute(ctx, command, epoch)   (cooperative task)
//!                            │
//!                            ▼
//!                 Event::{SignedIn, WalletProvisioned, Connected, ...}
//!                            │
//!                            ▼
//!                 App::handle(completion)
//! ```

use futures::future::{FutureExt, LocalBoxFuture};

use super::context::AppContext;
use super::{Epoch, Event};
use crate::session::Connector;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SignIn,
    SignOut,
    ProvisionWallet,
    Connect(Connector),
    Disconnect,
    FetchBalance(String),
    Print(String),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::SignIn => "sign_in",
            Command::SignOut => "sign_out",
            Command::ProvisionWallet => "provision_wallet",
            Command::Connect(_) => "connect",
            Command::Disconnect => "disconnect",
            Command::FetchBalance(_) => "fetch_balance",
            Command::Print(_) => "print",
        }
    }
}

/// A command tagged with the session epoch it belongs to. Teardown calls
/// issued at sign-out carry the closing epoch, so their results never touch
/// the next session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub command: Command,
    pub epoch: Epoch,
}

impl Task {
    pub fn new(command: Command, epoch: Epoch) -> Self {
        Self { command, epoch }
    }
}

/// Run one command against the collaborators.
pub async fn execute(ctx: &AppContext, command: Command, epoch: Epoch) -> Event {
    tracing::debug!("effect {} (epoch {})", command.name(), epoch);
    match command {
        Command::SignIn => Event::SignedIn { epoch, result: ctx.identity().sign_in().await },
        Command::SignOut => Event::SignedOut { epoch, result: ctx.identity().sign_out().await },
        Command::ProvisionWallet => Event::WalletProvisioned { epoch, result: ctx.identity().create_wallet().await },
        Command::Connect(connector) => Event::Connected { epoch, result: ctx.wallet().connect(&connector).await },
        Command::Disconnect => Event::Disconnected { epoch, result: ctx.wallet().disconnect().await },
        Command::FetchBalance(address) => {
            let result = ctx.balances().balance(&address).await;
            Event::BalanceFetched { epoch, address, result }
        }
        Command::Print(document) => {
            ctx.printer().print(&document);
            Event::Printed
        }
    }
}

/// Owned task for the event loop.
pub(crate) fn spawn(ctx: AppContext, task: Task) -> LocalBoxFuture<'static, Event> {
    async move { execute(&ctx, task.command, task.epoch).await }.boxed_local()
}
