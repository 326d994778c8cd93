//! Driver: populate a book from an orders file, hit it with random
//! updates, and write the latency statistics.
//!
//! ```text
//! daybook --orders orders.json --updates 100000 --stats stats.json
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use daybook::feed;
use daybook::sim::{self, LoadProfile};
use daybook::{BookConfig, OrderBook, OrderId, DEFAULT_CLOSE_HOUR};

#[derive(Debug, Parser)]
#[command(name = "daybook", about = "Limit order book load driver")]
struct Args {
    /// Orders file: a JSON array (.json) or whitespace-separated lines.
    #[arg(long)]
    orders: Option<PathBuf>,

    /// Where to write latency statistics (.json or .csv).
    #[arg(long, default_value = "stats.json")]
    stats: PathBuf,

    /// Number of random updates to apply after populating.
    #[arg(long, default_value_t = 100_000)]
    updates: usize,

    /// Session close hour for GFD orders (0-23).
    #[arg(long, default_value_t = DEFAULT_CLOSE_HOUR)]
    close_hour: u32,

    /// Seed for the update generator.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Fail if the recorded sample count differs from the update count.
    /// Only meaningful while the book never runs empty mid-run.
    #[arg(long)]
    check_samples: bool,

    /// Print the final book to stdout.
    #[arg(long)]
    print_book: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let book = OrderBook::with_config(BookConfig {
        close_hour: args.close_hour,
    });

    let mut next_order_id: u32 = 0;
    if let Some(path) = &args.orders {
        let records = feed::load_orders(path)
            .with_context(|| format!("loading orders from {}", path.display()))?;
        for record in records {
            next_order_id += 1;
            match record.into_order(OrderId(next_order_id)) {
                Ok(order) => {
                    book.add_order(order);
                }
                Err(err) => warn!(%err, "invalid order record, skipping"),
            }
        }
        info!(
            orders = next_order_id,
            resting = book.number_of_orders(),
            "book populated"
        );
    }

    // Measure only the random update phase.
    book.clear_latencies();

    let mut rng = StdRng::seed_from_u64(args.seed);
    sim::run_random_updates(
        &book,
        args.updates,
        &mut next_order_id,
        &LoadProfile::default(),
        &mut rng,
    );
    info!(
        updates = args.updates,
        resting = book.number_of_orders(),
        "random updates applied"
    );

    if args.print_book {
        book.print_book();
    }

    let expected = args.check_samples.then_some(args.updates);
    book.write_latency_stats(&args.stats, expected)
        .with_context(|| format!("writing latency statistics to {}", args.stats.display()))?;
    info!(path = %args.stats.display(), "latency statistics written");

    Ok(())
}
