//! zDrop API - Service Launcher
//!
//! Run modes:
//!   zdrop-api api     - Start the REST API server
//!   zdrop-api demo    - Run a self-contained distribution demo
//!
//! Configuration comes from ZDROP_* environment variables (see config.rs);
//! a .env file is honored.

use std::env;
use std::sync::Arc;

use tracing::info;

use zdrop::api::{self, AppState};
use zdrop::clock::{ManualClock, SystemClock};
use zdrop::config::ZDropConfig;
use zdrop::custody::MemoryCustody;
use zdrop::distributor::{
    DistributionParams, DistributorService, RoleSet, DEFAULT_CLAIM_WINDOW_SECS,
};
use zdrop::events::TracingEventSink;
use zdrop::logging::{init_logging, LogLevel};
use zdrop::merkle::MerkleTree;
use zdrop::storage::{ClaimStore, MemoryClaimStore, SqliteClaimStore};
use zdrop::types::{digest_to_hex, Identity};

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    match args[1].as_str() {
        "api" => run_api_server().await,
        "demo" => run_demo().await,
        "help" | "--help" | "-h" => print_usage(),
        _ => print_usage(),
    }
}

fn print_usage() {
    println!("zDrop - One-Shot Merkle-Gated Value Distributor");
    println!();
    println!("Usage:");
    println!("  zdrop-api api     Start REST API server");
    println!("  zdrop-api demo    Run a self-contained distribution demo");
    println!();
    println!("Environment Variables:");
    println!("  ZDROP_COMMITMENT          Hex-encoded 32-byte allocation root (required)");
    println!("  ZDROP_DEPOSIT_AMOUNT      Exact pool amount required at open (required)");
    println!("  ZDROP_OWNER               Hex-encoded owner identity (required)");
    println!("  ZDROP_DAO                 Hex-encoded dao identity (required)");
    println!("  ZDROP_CLAIM_WINDOW_SECS   Claim window duration (default: 90 days)");
    println!("  ZDROP_API_PORT            REST API port (default: 3001)");
    println!("  ZDROP_DB_PATH             SQLite path for claim records (default: in-memory)");
    println!("  ZDROP_LOG_LEVEL           Logging level (default: info)");
    println!("  ZDROP_LOG_JSON            Set to 1 for JSON log output");
}

/// Start the REST API server
async fn run_api_server() {
    dotenv::dotenv().ok();

    let config = match ZDropConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(LogLevel::from(config.log_level.as_str()), config.log_json) {
        eprintln!("Logging error: {}", e);
        std::process::exit(1);
    }

    let claims: Arc<dyn ClaimStore> = match &config.db_path {
        Some(path) => match SqliteClaimStore::new(path) {
            Ok(store) => Arc::new(store),
            Err(e) => {
                eprintln!("Storage error: {}", e);
                std::process::exit(1);
            }
        },
        None => Arc::new(MemoryClaimStore::new()),
    };

    let service = Arc::new(DistributorService::new(
        DistributionParams {
            expected_commitment: config.expected_commitment,
            expected_deposit: config.expected_deposit,
            claim_window_secs: config.claim_window_secs,
        },
        RoleSet::new(config.owner, config.dao),
        Arc::new(MemoryCustody::new()),
        claims,
        Arc::new(SystemClock),
        Arc::new(TracingEventSink),
    ));

    info!(
        target: "zdrop",
        commitment = %digest_to_hex(&config.expected_commitment),
        deposit = config.expected_deposit,
        window_secs = config.claim_window_secs,
        "starting zdrop-api"
    );

    if let Err(e) = api::serve(AppState::new(service), config.api_port).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Run a self-contained distribution end to end with a manual clock
async fn run_demo() {
    init_logging(LogLevel::Info, false).ok();

    let owner = random_identity();
    let dao = random_identity();
    let recipients: Vec<(Identity, u64)> = vec![
        (random_identity(), 600),
        (random_identity(), 300),
        (random_identity(), 100),
    ];
    let pool: u64 = recipients.iter().map(|(_, amount)| amount).sum();
    let tree = MerkleTree::new(recipients.clone());

    println!("allocation root: {}", digest_to_hex(&tree.root()));
    println!("pool:            {}", pool);

    let custody = Arc::new(MemoryCustody::new());
    let clock = Arc::new(ManualClock::new(chrono::Utc::now().timestamp()));
    let service = DistributorService::new(
        DistributionParams {
            expected_commitment: tree.root(),
            expected_deposit: pool,
            claim_window_secs: DEFAULT_CLAIM_WINDOW_SECS,
        },
        RoleSet::new(owner, dao),
        custody.clone(),
        Arc::new(MemoryClaimStore::new()),
        clock.clone(),
        Arc::new(TracingEventSink),
    );

    if let Err(e) = service.open(dao, tree.root(), pool).await {
        eprintln!("open failed: {}", e);
        return;
    }

    // first two recipients claim, the third never shows up
    for (identity, amount) in recipients.iter().take(2) {
        let proof = tree.proof_for(identity).unwrap_or_default();
        match service.claim(*identity, *amount, &proof).await {
            Ok(()) => println!("claimed {} -> {}", amount, identity),
            Err(e) => eprintln!("claim failed: {}", e),
        }
    }

    clock.advance(DEFAULT_CLAIM_WINDOW_SECS);
    match service.withdraw_remaining(dao).await {
        Ok(swept) => println!("window closed, swept residue: {}", swept),
        Err(e) => eprintln!("sweep failed: {}", e),
    }
    println!("dao balance: {}", custody.balance_of(&dao).await);
}

fn random_identity() -> Identity {
    let mut bytes = [0u8; 32];
    rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
    Identity::new(bytes)
}
