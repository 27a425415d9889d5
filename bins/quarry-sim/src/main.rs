//! Quarry simulation driver.
//!
//! Seeds a ledger with coinbase outputs, pushes a batch of randomized
//! candidate transactions through mempool admission, then assembles a
//! block and reports what made it in.

use anyhow::Result;
use clap::Parser;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

use quarry_core::assembler::assemble_block;
use quarry_core::constants::DEFAULT_POOL_CAPACITY;
use quarry_core::ledger::UtxoLedger;
use quarry_core::mempool::Mempool;
use quarry_core::types::{OutPoint, Transaction, TxId, TxIdGenerator, TxOutput};

/// CLI arguments for the simulator.
#[derive(Debug, Parser)]
#[command(name = "quarry-sim")]
#[command(about = "Quarry admission and block assembly simulator", long_about = None)]
struct Args {
    /// RNG seed for reproducible runs.
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Number of coinbase outputs to seed the ledger with.
    #[arg(long, default_value = "20")]
    utxo_count: u32,

    /// Number of candidate transactions to draw.
    #[arg(long, default_value = "15")]
    tx_count: usize,

    /// Mempool capacity in bytes.
    #[arg(long, default_value_t = DEFAULT_POOL_CAPACITY)]
    pool_capacity: u64,

    /// Maximum assembled block size in bytes.
    #[arg(long, default_value = "4000")]
    max_block_size: u64,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit the final report as JSON on stdout.
    #[arg(long)]
    json: bool,
}

/// Row in the final block report.
#[derive(Debug, Serialize)]
struct TxReport {
    txid: String,
    fee: u64,
    size: u64,
    fee_rate: f64,
}

/// Machine-readable summary of a full run.
#[derive(Debug, Serialize)]
struct RunReport {
    seed: u64,
    admitted: usize,
    rejected: usize,
    pool_txs: usize,
    pool_bytes: u64,
    pool_capacity: u64,
    block: Vec<TxReport>,
    block_size: u64,
    block_fees: u64,
}

/// Seed `count` coinbase outputs under the reserved txid 0.
///
/// Returns the outpoint/value pairs in creation order so candidate
/// generation does not depend on map iteration order.
fn seed_coinbase_outputs(
    ledger: &mut UtxoLedger,
    count: u32,
    rng: &mut StdRng,
) -> Vec<(OutPoint, u64)> {
    let mut seeded = Vec::with_capacity(count as usize);
    for index in 0..count {
        let outpoint = OutPoint::new(TxId(0), index);
        let value = rng.gen_range(500..=5_000);
        ledger.add(outpoint, value);
        seeded.push((outpoint, value));
    }
    seeded
}

/// Draw up to `count` single-input candidates over distinct outpoints.
///
/// A draw whose fee swallows the whole input value is dropped without
/// consuming a txid.
fn generate_candidates(
    available: &mut [(OutPoint, u64)],
    count: usize,
    ids: &mut TxIdGenerator,
    rng: &mut StdRng,
) -> Vec<Transaction> {
    available.shuffle(rng);

    let mut txs = Vec::new();
    for &(outpoint, value) in available.iter().take(count) {
        let fee = rng.gen_range(50..=500);
        let size = rng.gen_range(150..=600);
        if value <= fee {
            debug!("dropping draw on {outpoint}: value {value} cannot cover fee {fee}");
            continue;
        }
        let tx = Transaction {
            id: ids.next_id(),
            inputs: vec![outpoint],
            outputs: vec![TxOutput { value: value - fee }],
            fee,
            size,
            replaceable: rng.gen_bool(0.5),
        };
        debug!(
            "{}: spends {outpoint} (value {value}), fee={fee}, size={size}, replaceable={}",
            tx.id, tx.replaceable
        );
        txs.push(tx);
    }
    txs
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .init();

    info!("quarry-sim v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "seed={} utxos={} candidates={} pool_capacity={} max_block_size={}",
        args.seed, args.utxo_count, args.tx_count, args.pool_capacity, args.max_block_size
    );

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut ids = TxIdGenerator::new();

    let mut ledger = UtxoLedger::new();
    let mut available = seed_coinbase_outputs(&mut ledger, args.utxo_count, &mut rng);
    info!("seeded {} coinbase outputs", ledger.len());

    let candidates = generate_candidates(&mut available, args.tx_count, &mut ids, &mut rng);
    info!("drew {} candidate transactions", candidates.len());

    let mut pool = Mempool::new(args.pool_capacity);
    let mut admitted = 0usize;
    let mut rejected = 0usize;
    for tx in candidates {
        let txid = tx.id;
        let fee_rate = tx.fee_rate();
        match pool.add(tx, &ledger) {
            Ok(()) => {
                admitted += 1;
                info!("{txid}: fee_rate={fee_rate} -> accepted");
            }
            Err(err) => {
                rejected += 1;
                info!("{txid}: fee_rate={fee_rate} -> rejected ({err})");
            }
        }
    }

    info!("{pool}");

    let block = assemble_block(&pool, &ledger, args.max_block_size);
    info!("assembled {block}");
    for tx in block.transactions() {
        info!(
            "  {}: fee={}, size={}, fee_rate={}",
            tx.id,
            tx.fee,
            tx.size,
            tx.fee_rate()
        );
    }
    info!("total fees: {}", block.total_fees());
    info!("block size: {} bytes", block.total_size());

    if args.json {
        let report = RunReport {
            seed: args.seed,
            admitted,
            rejected,
            pool_txs: pool.len(),
            pool_bytes: pool.total_size(),
            pool_capacity: pool.capacity(),
            block: block
                .transactions()
                .iter()
                .map(|tx| TxReport {
                    txid: tx.id.to_string(),
                    fee: tx.fee,
                    size: tx.size,
                    fee_rate: tx.fee_rate().as_f64(),
                })
                .collect(),
            block_size: block.total_size(),
            block_fees: block.total_fees(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
