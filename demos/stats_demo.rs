use clap::Parser;
use pod_hash::HashMap;
use pod_hash::TableStats;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: usize,

    /// Percentage of entries to remove after filling, leaving tombstones.
    #[arg(short = 'r', long = "remove_percent", default_value_t = 30)]
    remove_percent: u64,
}

fn print_stats(label: &str, stats: &TableStats) {
    println!("{label}:");
    println!("  capacity:      {}", stats.capacity);
    println!("  size:          {}", stats.size);
    println!("  occupied:      {}", stats.occupied);
    println!("  tombstones:    {}", stats.tombstones);
    println!("  upper bound:   {}", stats.upper_bound);
    println!("  longest probe: {}", stats.longest_probe);
    println!(
        "  mean probe:    {:.3}",
        stats.total_probe as f64 / stats.size.max(1) as f64
    );
}

fn main() -> Result<(), pod_hash::Error> {
    let args = Args::parse();

    println!(
        "Creating HashMap with target capacity: {}",
        args.target_capacity
    );

    let mut map: HashMap<u64, u64> = HashMap::try_with_capacity(args.target_capacity)?;

    println!("Actual capacity: {}", map.capacity());
    println!("Filling map up to its upper bound...");

    let count = map.upper_bound() as u64;
    for key in 0..count {
        map.put(key, key * key)?;
    }
    println!(
        "Final load factor: {:.2}%",
        (map.len() as f64 / map.capacity() as f64) * 100.0
    );
    print_stats("after fill", &map.stats());

    let removals = count * args.remove_percent.min(100) / 100;
    for key in 0..removals {
        let index = map.find(&key);
        map.remove_at(index, false);
    }
    print_stats("after removals", &map.stats());

    let mut reclaimed = 0;
    for key in count..count + removals {
        if map.put_index(key, key)?.1 == pod_hash::Insertion::Reclaimed {
            reclaimed += 1;
        }
    }
    println!("Reinserted {removals} keys, {reclaimed} into tombstones");
    print_stats("after reinsertion", &map.stats());

    map.shrink_to_fit()?;
    print_stats("after shrink_to_fit", &map.stats());

    Ok(())
}
