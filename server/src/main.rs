use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State as AxumState;
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use governor::middleware::NoOpMiddleware;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use reelhall_engine::{GameConfig, SlotMachine, SymbolTable};
use reelhall_types::{
    cents_to_decimal, normalize_amount, AmountError, ClientMessage, Payline, ServerMessage,
    SpinResult, WinningLineView, MULTIPLIER_SLOTS, REEL_COUNT, ROW_COUNT,
};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Interface to bind when neither --host nor REELHALL_HOST is set.
const DEFAULT_HOST: &str = "0.0.0.0";

/// Port to listen on when neither --port nor REELHALL_PORT is set.
const DEFAULT_PORT: u16 = 3000;

/// Play-money balance granted to every fresh session, 5000.00.
const DEFAULT_STARTING_BALANCE_CENTS: u64 = 500_000;

/// Smallest accepted bet, 0.20.
const DEFAULT_MIN_BET_CENTS: u64 = 20;

/// Largest accepted bet, 100.00.
const DEFAULT_MAX_BET_CENTS: u64 = 10_000;

/// Authoritative spin server.
///
/// Every connection gets its own session with a fresh play-money balance
/// and its own RNG stream. Spins are requested and settled over a
/// websocket; a small JSON surface exposes the table layout and health.
#[derive(Parser, Debug)]
#[command(name = "reelhall-server", version, about)]
struct Args {
    /// Interface to bind. Overrides REELHALL_HOST.
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on. Overrides REELHALL_PORT.
    #[arg(short, long)]
    port: Option<u16>,

    /// Path to a YAML file replacing the built-in symbol table and paylines.
    #[arg(long)]
    game_config: Option<PathBuf>,

    /// Play money granted to new sessions, in cents. Overrides
    /// REELHALL_STARTING_BALANCE_CENTS.
    #[arg(long)]
    starting_balance_cents: Option<u64>,

    /// Smallest accepted bet, in cents. Overrides REELHALL_MIN_BET_CENTS.
    #[arg(long)]
    min_bet_cents: Option<u64>,

    /// Largest accepted bet, in cents. Overrides REELHALL_MAX_BET_CENTS.
    #[arg(long)]
    max_bet_cents: Option<u64>,
}

#[derive(Clone, Debug)]
struct ServerConfig {
    host: String,
    port: u16,
    starting_balance: u64,
    min_bet: u64,
    max_bet: u64,
}

impl ServerConfig {
    /// Flags win over environment variables, which win over defaults.
    fn resolve(args: &Args) -> Self {
        let host = args
            .host
            .clone()
            .or_else(|| std::env::var("REELHALL_HOST").ok())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = args
            .port
            .or_else(|| {
                std::env::var("REELHALL_PORT")
                    .ok()
                    .and_then(|raw| raw.parse().ok())
            })
            .unwrap_or(DEFAULT_PORT);
        Self {
            host,
            port,
            starting_balance: args.starting_balance_cents.unwrap_or_else(|| {
                read_u64(
                    "REELHALL_STARTING_BALANCE_CENTS",
                    DEFAULT_STARTING_BALANCE_CENTS,
                )
            }),
            min_bet: args
                .min_bet_cents
                .unwrap_or_else(|| read_u64("REELHALL_MIN_BET_CENTS", DEFAULT_MIN_BET_CENTS)),
            max_bet: args
                .max_bet_cents
                .unwrap_or_else(|| read_u64("REELHALL_MAX_BET_CENTS", DEFAULT_MAX_BET_CENTS)),
        }
    }
}

fn read_u64(key: &str, fallback: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(fallback)
}

fn parse_allowed_origins(key: &str) -> HashSet<String> {
    std::env::var(key)
        .map(|raw| {
            raw.split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Clone)]
struct AppState {
    machine: Arc<SlotMachine>,
    config: ServerConfig,
    allowed_origins: Arc<HashSet<String>>,
}

/// One websocket connection. The balance and the RNG stream live and die
/// with the socket task, so no spin ever contends with another session.
struct Session {
    id: Uuid,
    balance: u64,
    rng: ChaCha12Rng,
}

impl Session {
    fn new(starting_balance: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            balance: starting_balance,
            rng: ChaCha12Rng::from_entropy(),
        }
    }
}

#[derive(Debug, Error)]
enum SpinError {
    #[error(transparent)]
    InvalidBet(#[from] AmountError),
    #[error("minimum bet is {}", cents_to_decimal(*min))]
    BetTooSmall { min: u64 },
    #[error("maximum bet is {}", cents_to_decimal(*max))]
    BetTooLarge { max: u64 },
    #[error("balance {} cannot cover the bet", cents_to_decimal(*balance))]
    InsufficientBalance { balance: u64 },
}

fn error_code(err: &SpinError) -> &'static str {
    match err {
        SpinError::InvalidBet(_) => "INVALID_BET",
        SpinError::BetTooSmall { .. } => "BET_TOO_SMALL",
        SpinError::BetTooLarge { .. } => "BET_TOO_LARGE",
        SpinError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
    }
}

/// Validates the wire amount against the table limits, debits the bet,
/// runs one spin and credits the win. The balance only moves once every
/// check has passed.
fn execute_spin(
    machine: &SlotMachine,
    config: &ServerConfig,
    session: &mut Session,
    bet: f64,
) -> Result<SpinResult, SpinError> {
    let bet_cents = normalize_amount(bet)?;
    if bet_cents < config.min_bet {
        return Err(SpinError::BetTooSmall {
            min: config.min_bet,
        });
    }
    if bet_cents > config.max_bet {
        return Err(SpinError::BetTooLarge {
            max: config.max_bet,
        });
    }
    if bet_cents > session.balance {
        return Err(SpinError::InsufficientBalance {
            balance: session.balance,
        });
    }

    session.balance -= bet_cents;
    let result = machine.spin(&mut session.rng, bet_cents);
    session.balance += result.total_win;
    Ok(result)
}

fn handle_spin(
    state: &AppState,
    session: &mut Session,
    request_id: Option<String>,
    bet: f64,
) -> ServerMessage {
    match execute_spin(&state.machine, &state.config, session, bet) {
        Ok(result) => {
            info!(
                session = %session.id,
                bet,
                win = result.total_win,
                lines = result.winning_lines.len(),
                "spin settled"
            );
            spin_response(state.machine.table(), session.balance, request_id, &result)
        }
        Err(err) => {
            debug!(session = %session.id, code = error_code(&err), "spin rejected");
            ServerMessage::Error {
                request_id,
                code: error_code(&err).to_string(),
                message: err.to_string(),
            }
        }
    }
}

/// Renders an engine result for the wire: symbol indices become id
/// strings and cent amounts become decimals.
fn spin_response(
    table: &SymbolTable,
    balance: u64,
    request_id: Option<String>,
    result: &SpinResult,
) -> ServerMessage {
    let reels = (0..REEL_COUNT)
        .map(|reel| {
            (0..ROW_COUNT)
                .map(|row| table.id(result.grid.cell(reel, row)).to_string())
                .collect()
        })
        .collect();
    let winning_lines = result
        .winning_lines
        .iter()
        .map(|line| WinningLineView {
            line_index: line.line_index,
            count: line.count,
            symbol: table.id(line.symbol).to_string(),
            win: cents_to_decimal(line.win),
        })
        .collect();
    ServerMessage::SpinResult {
        request_id,
        reels,
        total_win: cents_to_decimal(result.total_win),
        winning_lines,
        balance: cents_to_decimal(balance),
    }
}

fn welcome(session: &Session, config: &ServerConfig) -> ServerMessage {
    ServerMessage::Welcome {
        session_id: session.id.to_string(),
        balance: cents_to_decimal(session.balance),
        min_bet: cents_to_decimal(config.min_bet),
        max_bet: cents_to_decimal(config.max_bet),
    }
}

fn bad_request(request_id: Option<String>, message: &str) -> ServerMessage {
    ServerMessage::Error {
        request_id,
        code: "BAD_REQUEST".to_string(),
        message: message.to_string(),
    }
}

fn send_message(tx: &mpsc::UnboundedSender<Message>, message: &ServerMessage) {
    match serde_json::to_string(message) {
        Ok(payload) => {
            let _ = tx.send(Message::Text(payload));
        }
        Err(err) => warn!(?err, "failed to serialize outbound message"),
    }
}

fn origin_allowed(headers: &HeaderMap, allowed: &HashSet<String>) -> bool {
    if allowed.is_empty() || allowed.contains("*") {
        return true;
    }
    match headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
    {
        Some(origin) => allowed.contains(origin),
        None => false,
    }
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    AxumState(state): AxumState<AppState>,
) -> Response {
    if !origin_allowed(&headers, &state.allowed_origins) {
        warn!("rejected websocket upgrade from disallowed origin");
        return StatusCode::FORBIDDEN.into_response();
    }
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

    // Writer task so slow sends never stall the read loop.
    let write_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let mut session = Session::new(state.config.starting_balance);
    info!(session = %session.id, "session connected");
    send_message(&tx, &welcome(&session, &state.config));

    while let Some(Ok(message)) = receiver.next().await {
        if matches!(message, Message::Close(_)) {
            break;
        }
        if let Some(response) = handle_frame(&state, &mut session, message) {
            send_message(&tx, &response);
        }
    }

    info!(session = %session.id, balance = session.balance, "session disconnected");
    write_task.abort();
}

/// Turns one inbound frame into at most one reply. Control frames
/// produce nothing; close is handled by the read loop.
fn handle_frame(
    state: &AppState,
    session: &mut Session,
    message: Message,
) -> Option<ServerMessage> {
    match message {
        Message::Text(text) => {
            let response = match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::Spin { request_id, bet }) => {
                    handle_spin(state, session, request_id, bet)
                }
                Err(err) => {
                    warn!(session = %session.id, ?err, "unparseable client message");
                    bad_request(None, "unrecognized client message")
                }
            };
            Some(response)
        }
        Message::Binary(_) => Some(bad_request(None, "binary frames are not accepted")),
        _ => None,
    }
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Serialize)]
struct SymbolInfo {
    id: String,
    multipliers: [u32; MULTIPLIER_SLOTS],
}

/// Table layout served to clients. Weights stay server-side; clients
/// only learn what a symbol pays, never how often it lands.
#[derive(Serialize)]
struct ConfigResponse {
    reels: usize,
    rows: usize,
    #[serde(rename = "minBet")]
    min_bet: f64,
    #[serde(rename = "maxBet")]
    max_bet: f64,
    #[serde(rename = "startingBalance")]
    starting_balance: f64,
    symbols: Vec<SymbolInfo>,
    paylines: Vec<Payline>,
}

fn config_response(state: &AppState) -> ConfigResponse {
    let table = state.machine.table();
    let symbols = (0..table.len())
        .map(|ix| SymbolInfo {
            id: table.id(ix as u8).to_string(),
            multipliers: *table.multipliers(ix as u8),
        })
        .collect();
    ConfigResponse {
        reels: REEL_COUNT,
        rows: ROW_COUNT,
        min_bet: cents_to_decimal(state.config.min_bet),
        max_bet: cents_to_decimal(state.config.max_bet),
        starting_balance: cents_to_decimal(state.config.starting_balance),
        symbols,
        paylines: state.machine.lines().patterns().to_vec(),
    }
}

async fn game_config(AxumState(state): AxumState<AppState>) -> Json<ConfigResponse> {
    Json(config_response(&state))
}

type IpGovernorConfig =
    tower_governor::governor::GovernorConfig<SmartIpKeyExtractor, NoOpMiddleware>;

fn governor_config() -> Option<Arc<IpGovernorConfig>> {
    let per_second = read_u64("REELHALL_RATE_LIMIT_PER_SEC", 0);
    let burst = read_u64("REELHALL_RATE_LIMIT_BURST", 0);
    if per_second == 0 || burst == 0 {
        return None;
    }
    let nanos_per_request = (1_000_000_000 / per_second).max(1);
    GovernorConfigBuilder::default()
        .period(Duration::from_nanos(nanos_per_request))
        .burst_size(burst.min(u64::from(u32::MAX)) as u32)
        .key_extractor(SmartIpKeyExtractor)
        .finish()
        .map(Arc::new)
}

fn cors_layer(allowed: &HashSet<String>) -> CorsLayer {
    let layer = if allowed.is_empty() || allowed.contains("*") {
        CorsLayer::new().allow_origin(AllowOrigin::any())
    } else {
        let origins = allowed
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("invalid origin in REELHALL_ALLOWED_ORIGINS: {}", origin);
                    None
                }
            })
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(AllowOrigin::list(origins))
    };
    layer
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE])
}

fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.allowed_origins);

    let router = Router::new()
        .route("/ws", get(ws_handler))
        .route("/healthz", get(healthz))
        .route("/api/config", get(game_config));

    let router = match governor_config() {
        Some(config) => router.layer(GovernorLayer { config }),
        None => router,
    };

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = ServerConfig::resolve(&args);
    anyhow::ensure!(config.min_bet > 0, "minimum bet must be positive");
    anyhow::ensure!(
        config.min_bet <= config.max_bet,
        "minimum bet {} exceeds maximum bet {}",
        config.min_bet,
        config.max_bet
    );

    let game = match &args.game_config {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("could not read game config {}", path.display()))?;
            GameConfig::from_yaml(&contents)
                .with_context(|| format!("could not parse game config {}", path.display()))?
        }
        None => GameConfig::default(),
    };
    let machine = SlotMachine::new(&game).context("invalid game configuration")?;
    info!(
        symbols = machine.table().len(),
        paylines = machine.lines().len(),
        total_weight = machine.table().total_weight(),
        "game tables loaded"
    );

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("invalid listen address")?;
    let state = AppState {
        machine: Arc::new(machine),
        config,
        allowed_origins: Arc::new(parse_allowed_origins("REELHALL_ALLOWED_ORIGINS")),
    };
    let app = build_router(state);

    info!(%addr, "spin server listening");
    axum::serve(
        tokio::net::TcpListener::bind(addr).await?,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("server error")?;
    Ok(())
}
