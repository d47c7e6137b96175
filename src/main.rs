//! matchbook demo binary.
//!
//! Seeds a book, fires a few crossing orders and prints the resulting
//! trades and depth. Log verbosity follows `RUST_LOG` (try
//! `RUST_LOG=matchbook=debug`).

use matchbook::{Order, OrderKind, Orderbook, Side, Trade};
use tracing_subscriber::EnvFilter;

fn print_trades(label: &str, trades: &[Trade]) {
    println!("{label}:");
    if trades.is_empty() {
        println!("  (no trades)");
    }
    for trade in trades {
        println!(
            "  {} x buy #{} @ {} / sell #{} @ {}",
            trade.quantity(),
            trade.bid.order_id,
            trade.bid.price,
            trade.ask.order_id,
            trade.ask.price,
        );
    }
}

fn print_depth(book: &Orderbook) {
    let (bids, asks) = book.snapshot();
    println!("depth ({} resting orders):", book.size());
    for level in asks.iter().rev() {
        println!("  ask {:>6} | {:>6}", level.price, level.quantity);
    }
    for level in &bids {
        println!("  bid {:>6} | {:>6}", level.price, level.quantity);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let book = Orderbook::new();

    // Seed resting interest on both sides
    for order in [
        Order::new(OrderKind::Limit, 1, Side::Buy, 100, 10),
        Order::new(OrderKind::Limit, 2, Side::Buy, 101, 50),
        Order::new(OrderKind::Limit, 3, Side::Sell, 103, 25),
        Order::new(OrderKind::Limit, 4, Side::Sell, 104, 40),
    ] {
        book.add(order).expect("seed order rejected");
    }

    println!("== initial book ==");
    print_depth(&book);

    // A limit sell crossing into the bids
    let trades = book
        .add(Order::new(OrderKind::Limit, 5, Side::Sell, 100, 20))
        .expect("crossing sell rejected");
    println!("\n== limit sell 20 @ 100 ==");
    print_trades("trades", &trades);
    print_depth(&book);

    // A market buy that sweeps the asks and rests at the anchor price
    let trades = book.add(Order::market(6, Side::Buy, 80)).expect("market buy rejected");
    println!("\n== market buy 80 ==");
    print_trades("trades", &trades);
    print_depth(&book);

    // An all-or-none that cannot be covered is dropped without error
    let trades = book
        .add(Order::new(OrderKind::AllOrNone, 7, Side::Sell, 100, 1_000))
        .expect("all-or-none rejected");
    println!("\n== all-or-none sell 1000 @ 100 ==");
    print_trades("trades", &trades);
    print_depth(&book);
}
