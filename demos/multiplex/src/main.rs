//! Multiplex Example
//!
//! Three countdown actors, each in its own stepping instance, interleaved
//! round-robin until all of them run dry.
//!
//! Usage: `multiplex [direct|actor|loop]` (default `direct`).
//! Set `RUST_LOG=debug` to see every dispatch.

use stepwise_core::{Address, Behavior, LoopControl, Stepping, Value};
use stepwise_hub::{
    actor, shared, MultiplexConfig, MultiplexSummary, Multiplexer, Report, Result, SharedStepping,
};
use tracing_subscriber::EnvFilter;

const LAYOUT: &str = r#"(
    producers: [
        (label: "A", mode: EventLoop(count: Some(1))),
        (label: "B", mode: EventLoop(count: Some(2))),
        (label: "C", mode: Dispatch),
    ],
)"#;

fn countdown(label: &'static str) -> Behavior {
    Behavior::new(label, move |ex, message| {
        println!("--{}-- {}", label, message);
        let count = message.as_int().unwrap_or(0) - 1;
        if count > 0 {
            ex.send_self(count);
        }
        Ok(())
    })
}

fn countdowns() -> Vec<SharedStepping> {
    [("A", 2), ("B", 3), ("C", 5)]
        .into_iter()
        .map(|(label, start)| {
            let mut stepping = Stepping::new();
            let actor = stepping.sponsor(countdown(label));
            stepping.send(&actor, start);
            shared(stepping)
        })
        .collect()
}

fn print_summary(summary: &MultiplexSummary) {
    println!("\nTrace:");
    for (label, report) in &summary.trace {
        let mark = match report {
            Report::DidWork => "work",
            Report::Idle => "idle",
            Report::Failed(_) => "FAILED",
        };
        println!("  {} {}", label, mark);
    }
    println!("\nSummary: {}", summary);
}

fn run_direct() -> Result<()> {
    println!("=== Direct multiplexing (one dispatch per visit) ===\n");
    let mut mux = Multiplexer::new();
    for (label, stepping) in ["A", "B", "C"].into_iter().zip(countdowns()) {
        mux.add_producer(label, stepwise_hub::DispatchProducer::new(stepping));
    }
    let summary = mux.run()?;
    print_summary(&summary);
    Ok(())
}

fn run_loop() -> Result<()> {
    println!("=== Configured multiplexing (bounded event loops) ===\n");
    let config = MultiplexConfig::from_ron(LAYOUT)?;
    let mut mux = Multiplexer::from_config(&config, countdowns())?;
    let summary = mux.run()?;
    print_summary(&summary);
    Ok(())
}

fn run_actor() -> Result<()> {
    println!("=== Actor-hosted multiplexing ===\n");
    let mut root = Stepping::new();
    let children: Vec<Address> = countdowns()
        .into_iter()
        .map(|stepping| root.sponsor(actor::dispatch_adapter(stepping)))
        .collect();
    let mux = root.sponsor(actor::round_robin(children));
    root.send(&mux, Value::Null);

    let mut steps = 0u64;
    root.event_loop(LoopControl::new().log(|effect| {
        if let Some(effect) = effect {
            steps += 1;
            tracing::debug!(%effect, "root step");
        }
    }))?;
    println!("\nRoot stepping dispatched {} events", steps);
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match std::env::args().nth(1).as_deref() {
        None | Some("direct") => run_direct(),
        Some("loop") => run_loop(),
        Some("actor") => run_actor(),
        Some(other) => {
            eprintln!("unknown mode `{}`; expected direct, loop or actor", other);
            std::process::exit(2);
        }
    }
}
