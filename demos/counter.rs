//! Counter that remembers its value between runs.
//!
//! Run it a few times: the count keeps going up. Pass `reset` to start over.

use serde::{Deserialize, Serialize};
use storable::{PersistentStore, Storage, StoreOptions};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct Counter {
    runs: u32,
    last_note: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let path = std::env::temp_dir().join("storable-counter.json");
    let storage = Storage::with_file(&path)?;
    let counter = PersistentStore::new(
        Counter::default(),
        StoreOptions::new("counter"),
        Some(&storage),
    );

    println!("=== Persistent counter ({}) ===\n", path.display());

    let _sub = counter.subscribe(|c| println!("runs = {}, note = {:?}", c.runs, c.last_note));

    if std::env::args().nth(1).as_deref() == Some("reset") {
        counter.reset()?;
        return Ok(());
    }

    counter.update(|c| Counter {
        runs: c.runs + 1,
        last_note: Some(format!("run #{}", c.runs + 1)),
    })?;

    Ok(())
}
