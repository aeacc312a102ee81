use data_loader::{ReplayerDataset, ReplayerOptions};
use std::path::Path;
use std::time::Instant;

fn main() {
    let data_dir = Path::new("data/R6B");

    println!("Loading Yahoo! R6B dataset...\n");

    let start = Instant::now();
    let mut dataset = ReplayerDataset::load(data_dir, ReplayerOptions::default())
        .expect("Failed to load dataset");
    let elapsed = start.elapsed();

    let events = dataset.get_user_item_timeline().len();

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Users: {}", dataset.get_num_users());
    println!("Articles: {}", dataset.get_num_items());
    println!("Events: {}", events);
    println!("Anonymous events skipped: {}", dataset.get_skipped_events());
    println!("\nPerformance: {:.0} events/second",
             events as f64 / elapsed.as_secs_f64());
}
