//! DeFi Card CLI - terminal front end
//!
//!   deficard format <raw> [symbol]            → whole-unit balance, e.g. "1 ETH"
//!   deficard card <address> [raw] [symbol]    → printable business card
//!   deficard demo                             → scripted session, in-memory collaborators
//!   deficard repl                             → interactive session
//!   deficard config [save <path>]             → effective configuration
//!
//! Configuration layers (lowest first): defaults, `--config <file>`, `.env` /
//! `DEFICARD_*` environment, command-line flags.
//!
//! Output format:
//!   --json     Output raw JSON (default for non-tty)
//!   --pretty   Pretty-print JSON (default for tty)

use alloy_primitives::U256;
use anyhow::{anyhow, bail, Context};
use deficard::balance::{self, BalanceSnapshot};
use deficard::logging::init_logging;
use deficard::view::{self, card, Panel};
use deficard::{
    install_signal_handlers, App, AppConfig, AppContext, ChainConfig, ConnectionState, Event, MemoryCollaborators,
    SessionSnapshot, UserIdentity, WalletAccount,
};
use serde_json::{json, Value};
use std::env;
use std::io::{IsTerminal, Write};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

/// Demo funding: 2.5 units in the smallest denomination.
const DEMO_BALANCE_WEI: u128 = 2_500_000_000_000_000_000;

fn main() {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let opts = ParsedArgs::parse(&args[1..]);

    if opts.help {
        print_usage();
        return;
    }

    if opts.version {
        println!("deficard {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let result = match opts.command.as_deref() {
        Some("format") => cmd_format(&opts),
        Some("card") => cmd_card(&opts),
        Some("demo") => cmd_demo(&opts),
        Some("repl") => cmd_repl(&opts),
        Some("config") => cmd_config(&opts),
        Some(cmd) => Err(anyhow!("Unknown command: {}", cmd)),
        None => {
            print_usage();
            return;
        }
    };

    let pretty = opts.pretty || (!opts.json && std::io::stdout().is_terminal());
    match result {
        Ok(output) => {
            // Commands that render text print it as-is unless JSON was asked for.
            match output.get("text").and_then(Value::as_str) {
                Some(text) if !opts.json => println!("{}", text),
                _ => println!("{}", to_json(&output, pretty)),
            }
        }
        Err(e) => {
            let err = json!({"error": format!("{:#}", e)});
            eprintln!("{}", to_json(&err, pretty));
            std::process::exit(1);
        }
    }
}

fn to_json(value: &Value, pretty: bool) -> String {
    let rendered = if pretty { serde_json::to_string_pretty(value) } else { serde_json::to_string(value) };
    rendered.unwrap_or_else(|_| value.to_string())
}

#[derive(Default)]
struct ParsedArgs {
    command: Option<String>,
    args: Vec<String>,
    config_path: Option<String>,
    client_id: Option<String>,
    label: Option<String>,
    chain: Option<String>,
    user: Option<String>,
    name: Option<String>,
    email: Option<String>,
    auto_connect: bool,
    connected: bool,
    json: bool,
    pretty: bool,
    help: bool,
    version: bool,
}

impl ParsedArgs {
    fn parse(args: &[String]) -> Self {
        // Load .env file if present
        if let Ok(contents) = std::fs::read_to_string(".env") {
            for line in contents.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once('=') {
                    let value = value.trim().trim_matches('"');
                    if !value.is_empty() && env::var(key.trim()).is_err() {
                        env::set_var(key.trim(), value);
                    }
                }
            }
        }

        let mut opts = ParsedArgs::default();
        let mut positional = Vec::new();
        let mut i = 0;

        while i < args.len() {
            let arg = &args[i];
            let value = args.get(i + 1).cloned();
            match arg.as_str() {
                "--help" | "-h" => opts.help = true,
                "--version" | "-V" => opts.version = true,
                "--json" => opts.json = true,
                "--pretty" => opts.pretty = true,
                "--auto-connect" => opts.auto_connect = true,
                "--connected" => opts.connected = true,
                "--config" | "-c" => { opts.config_path = value; i += 1; }
                "--client-id" => { opts.client_id = value; i += 1; }
                "--label" | "-l" => { opts.label = value; i += 1; }
                "--chain" => { opts.chain = value; i += 1; }
                "--user" | "-u" => { opts.user = value; i += 1; }
                "--name" | "-n" => { opts.name = value; i += 1; }
                "--email" | "-e" => { opts.email = value; i += 1; }
                _ if !arg.starts_with('-') => positional.push(arg.clone()),
                _ => debug!("ignoring unknown flag {}", arg),
            }
            i += 1;
        }

        // First positional is command, the rest are its arguments
        if !positional.is_empty() {
            opts.command = Some(positional.remove(0));
        }
        opts.args = positional;

        // Apply environment variables (lower priority than CLI args)
        if opts.config_path.is_none() {
            opts.config_path = env::var("DEFICARD_CONFIG").ok().filter(|s| !s.is_empty());
        }
        if opts.user.is_none() {
            opts.user = env::var("DEFICARD_USER").ok().filter(|s| !s.is_empty());
        }

        opts
    }

    fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    fn config(&self) -> anyhow::Result<AppConfig> {
        let base = match &self.config_path {
            Some(path) => AppConfig::load(path).with_context(|| format!("loading config {}", path))?,
            None => AppConfig::default(),
        };
        let mut config = base.apply_env();
        if let Some(id) = &self.client_id {
            config.client_id = id.clone();
        }
        if let Some(label) = &self.label {
            config.card_label = label.clone();
        }
        if let Some(chain) = &self.chain {
            let chain = ChainConfig::from_name(chain).ok_or_else(|| anyhow!("unknown chain: {}", chain))?;
            config.chains.retain(|c| c.id != chain.id);
            config.chains.insert(0, chain);
        }
        if self.auto_connect {
            config.auto_connect = true;
        }
        if config.client_id.trim().is_empty() {
            config.client_id = "deficard-cli".into();
        }
        config.validate()?;
        Ok(config)
    }

    fn user(&self) -> UserIdentity {
        let mut user = UserIdentity::new(self.user.clone().unwrap_or_else(|| "demo-user".into()));
        if let Some(name) = &self.name {
            user = user.with_name(name);
        }
        if let Some(email) = &self.email {
            user = user.with_email(email);
        }
        user
    }
}

fn print_usage() {
    println!(
        r#"deficard - Web3 business card generator

USAGE:
    deficard <command> [args] [options]

COMMANDS:
    format <raw> [symbol]           Format a raw balance (smallest unit) as whole units
    card <address> [raw] [symbol]   Render the business card for an address
    demo                            Scripted session: sign in, provision, connect, print
    repl                            Interactive session
    config [save <path>]            Show (or save) the effective configuration

SESSION OPTIONS:
    --user, -u <id>         User id (env: DEFICARD_USER, default: demo-user)
    --name, -n <name>       Display name
    --email, -e <email>     Email
    --auto-connect          Connect as soon as the wallet is known

CONFIG OPTIONS:
    --config, -c <path>     JSON config file (env: DEFICARD_CONFIG)
    --client-id <id>        Identity provider client id (env: DEFICARD_CLIENT_ID)
    --label, -l <text>      Card name label (env: DEFICARD_CARD_LABEL)
    --chain <name>          Default chain: mainnet|sepolia (env: DEFICARD_CHAINS)

OUTPUT OPTIONS:
    --json                  Raw JSON output
    --pretty                Pretty-print JSON
    --connected             (card) render as connected
    --version, -V           Print version

EXAMPLES:
    deficard format 1500000000000000000 ETH
    deficard card 0x00000000000000000000000000000000000000ff 2500000000000000000
    deficard demo --name Ada
    deficard repl --user alice --auto-connect
"#
    );
}

fn cmd_format(opts: &ParsedArgs) -> anyhow::Result<Value> {
    let raw = opts.arg(0).ok_or_else(|| anyhow!("Usage: deficard format <raw> [symbol]"))?;
    let config = opts.config()?;
    let symbol = match opts.arg(1) {
        Some(symbol) => symbol.to_string(),
        None => default_symbol(&config),
    };
    let value = balance::parse_raw(raw)?;
    let formatted = balance::format_balance(value, &symbol);
    Ok(json!({"raw": raw, "symbol": symbol, "formatted": formatted, "text": formatted}))
}

fn cmd_card(opts: &ParsedArgs) -> anyhow::Result<Value> {
    let address = opts.arg(0).ok_or_else(|| anyhow!("Usage: deficard card <address> [raw] [symbol]"))?;
    let config = opts.config()?;
    let account = WalletAccount::new(address)?;
    let symbol = opts.arg(2).map(str::to_string).unwrap_or_else(|| default_symbol(&config));
    let balance = match opts.arg(1) {
        Some(raw) => Some(BalanceSnapshot::new(balance::parse_raw(raw)?, symbol)),
        None => None,
    };
    let chain_id = config.default_chain().map(|c| c.id).unwrap_or_default();
    let connection = if opts.connected {
        ConnectionState::connected(account.address(), chain_id)
    } else {
        ConnectionState::disconnected()
    };

    let session = SessionSnapshot { user: Some(opts.user()), account: Some(account), connection, balance };
    let screen = view::render(&session, Panel::BusinessCard, &config.card_label);
    let card_view = screen.card().ok_or_else(|| anyhow!("no card for {}", address))?;
    Ok(json!({
        "display_name": card_view.display_name,
        "address": card_view.wallet.address,
        "balance": card_view.wallet.balance.as_text(),
        "text": card::render_card(card_view),
    }))
}

fn cmd_config(opts: &ParsedArgs) -> anyhow::Result<Value> {
    let config = opts.config()?;
    if opts.arg(0) == Some("save") {
        let path = opts.arg(1).ok_or_else(|| anyhow!("Usage: deficard config save <path>"))?;
        config.save(path)?;
        info!("config saved to {}", path);
        return Ok(json!({"saved": path}));
    }
    Ok(serde_json::to_value(&config)?)
}

fn default_symbol(config: &AppConfig) -> String {
    config.default_chain().map(|c| c.symbol.clone()).unwrap_or_else(|| "ETH".into())
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create runtime")
}

fn session(opts: &ParsedArgs) -> anyhow::Result<(App, MemoryCollaborators)> {
    let config = opts.config()?;
    let (ctx, handles) = AppContext::in_memory(config.clone(), opts.user())?;
    handles.fund_all(&config, U256::from(DEMO_BALANCE_WEI));
    Ok((App::new(ctx), handles))
}

/// Print documents the app sent to the printer since `seen`.
fn flush_printed(handles: &MemoryCollaborators, seen: &mut usize) {
    let documents = handles.printer.documents();
    for doc in documents.iter().skip(*seen) {
        println!("{}", doc);
    }
    *seen = documents.len();
}

fn cmd_demo(opts: &ParsedArgs) -> anyhow::Result<Value> {
    let (mut app, handles) = session(opts)?;
    let rt = runtime()?;

    rt.block_on(async {
        let mut printed = 0;
        let steps = [
            Event::SignInRequested,
            Event::ConnectRequested,
            Event::PanelSelected(Panel::BusinessCard),
            Event::PrintRequested,
        ];
        for event in app.bootstrap_events() {
            app.dispatch(event).await;
        }
        println!("{}", app.page());
        for event in steps {
            info!("demo: {:?}", event);
            app.dispatch(event).await;
            println!("{}", app.page());
            flush_printed(&handles, &mut printed);
        }
    });

    let snapshot = app.snapshot();
    if let Some(e) = app.last_error().get() {
        bail!(e);
    }
    Ok(json!({
        "user": snapshot.user.map(|u| u.id),
        "address": snapshot.account.map(|a| a.address().to_string()),
        "balance": snapshot.balance.map(|b| b.display()),
        "connected": snapshot.connection.connected,
        "provision_calls": handles.identity.provision_calls(),
        "printed": handles.printer.documents().len(),
    }))
}

fn cmd_repl(opts: &ParsedArgs) -> anyhow::Result<Value> {
    println!("DeFi Card REPL - type 'help' or 'quit'\n");

    let (mut app, handles) = session(opts)?;
    let rt = runtime()?;

    rt.block_on(async {
        let shutdown = install_signal_handlers();
        let mut stop = shutdown.subscribe();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut printed = 0;

        for event in app.bootstrap_events() {
            app.dispatch(event).await;
        }
        println!("{}", app.page());

        loop {
            print!("deficard> ");
            std::io::stdout().flush().ok();

            let line = tokio::select! {
                _ = stop.recv() => break,
                line = lines.next_line() => line,
            };
            let input = match line {
                Ok(Some(input)) => input,
                Ok(None) => break,
                Err(e) => {
                    println!("Error: {}", e);
                    break;
                }
            };

            let event = match input.trim() {
                "" => continue,
                "quit" | "exit" | "q" => break,
                "help" | "?" => {
                    println!("Commands:");
                    println!("  signin / signout    - Sign in or out");
                    println!("  connect / disconnect");
                    println!("  wallet / card       - Switch panel");
                    println!("  print               - Print the business card");
                    println!("  refresh             - Re-query the balance");
                    println!("  status              - Session snapshot");
                    println!("  quit                - Exit");
                    continue;
                }
                "status" => {
                    let snapshot = app.snapshot();
                    println!("user:      {}", snapshot.user.as_ref().map(|u| u.label()).unwrap_or("-"));
                    println!("wallet:    {}", snapshot.account.as_ref().map(|a| a.address()).unwrap_or("-"));
                    println!("balance:   {}", snapshot.balance.as_ref().map(|b| b.display()).unwrap_or_else(|| "-".into()));
                    println!("connected: {}", snapshot.connection.connected);
                    println!("panel:     {}", app.panel());
                    if let Some(e) = app.last_error().get() {
                        println!("last error: {} ({})", e, e.kind());
                    }
                    continue;
                }
                "signin" | "login" => Event::SignInRequested,
                "signout" | "logout" => Event::SignOutRequested,
                "connect" => Event::ConnectRequested,
                "disconnect" => Event::DisconnectRequested,
                "wallet" => Event::PanelSelected(Panel::Wallet),
                "card" => Event::PanelSelected(Panel::BusinessCard),
                "print" => Event::PrintRequested,
                "refresh" => Event::RefreshBalance,
                cmd => {
                    println!("Unknown: {}. Type 'help'.", cmd);
                    continue;
                }
            };

            app.dispatch(event).await;
            println!("{}", app.page());
            flush_printed(&handles, &mut printed);
        }
    });

    println!("Goodbye!");
    Ok(json!({"status": "exited", "provision_calls": handles.identity.provision_calls()}))
}
