use chain_hash::DefaultHashBuilder;
use chain_hash::HashMap;
use clap::Parser;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'n', long = "entries", default_value_t = 1000)]
    entries: u64,

    #[arg(short = 'c', long = "initial_capacity", default_value_t = 16)]
    initial_capacity: usize,

    #[arg(short = 'l', long = "load_factor", default_value_t = 0.75)]
    load_factor: f32,
}

fn main() -> Result<(), chain_hash::Error> {
    let args = Args::parse();

    println!(
        "Creating HashMap with initial capacity {} and load factor {}",
        args.initial_capacity, args.load_factor
    );

    let mut map: HashMap<u64, u64, DefaultHashBuilder> =
        HashMap::with_capacity_and_load_factor(args.initial_capacity, args.load_factor)?;

    println!("Initial threshold: {}", map.threshold());
    println!("Filling map with {} u64 keys...", args.entries);

    for i in 0..args.entries {
        if map.insert(Some(i), i).is_some() {
            panic!("Key already exists in map: {}", i);
        }
    }
    map.insert(None, u64::MAX);

    println!("Inserted {} entries into map", map.len());
    println!(
        "Final load: {:.2}%",
        (map.len() as f64 / map.capacity() as f64) * 100.0
    );

    map.print_chain_histogram();
    map.debug_stats().print();

    Ok(())
}
