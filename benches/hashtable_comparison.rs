use alloc::format;
use core::hash::Hash;
use core::hash::Hasher;
use core::hint::black_box;

use chain_hash::HashTable as ChainHashTable;
use chain_hash::hash_table::Entry as ChainEntry;
use criterion::AxisScale;
use criterion::BatchSize;
use criterion::Criterion;
use criterion::PlotConfiguration;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use hashbrown::hash_table::Entry as HashbrownEntry;
use hashbrown::hash_table::HashTable as HashbrownHashTable;
use rand::Rng;
use rand::SeedableRng;
use rand::TryRngCore;
use rand::rngs::OsRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand_distr::Zipf;
use siphasher::sip::SipHasher;

extern crate alloc;

trait KeyValuePair: Clone {
    fn new(key: u64) -> Self;

    fn hash_key(&self) -> u64;
    fn eq_key(&self, other: &Self) -> bool;
}

#[derive(Clone)]
struct TestItem {
    key: String,
    _value: u64,
}

impl KeyValuePair for TestItem {
    fn new(key: u64) -> Self {
        black_box(Self {
            key: format!("key_{:016X}", key),
            _value: key,
        })
    }

    fn hash_key(&self) -> u64 {
        let mut hasher = SipHasher::new();
        self.key.hash(&mut hasher);
        hasher.finish()
    }

    fn eq_key(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

#[derive(Clone)]
struct SmallTestItem {
    key: u64,
}

impl KeyValuePair for SmallTestItem {
    fn new(key: u64) -> Self {
        black_box(Self { key })
    }

    fn hash_key(&self) -> u64 {
        let mut hasher = SipHasher::new();
        self.key.hash(&mut hasher);
        hasher.finish()
    }

    fn eq_key(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

const SIZES: &[usize] = &[
    (1 << 10),
    (1 << 12),
    (1 << 14),
    (1 << 16),
    (1 << 18),
];

fn random_items<TestItem: KeyValuePair>(count: usize) -> Vec<(u64, TestItem)> {
    let mut rng = OsRng;
    (0..count)
        .map(|_| {
            let key = rng.try_next_u64().unwrap();
            let item = TestItem::new(key);
            let hash = item.hash_key();
            (hash, item)
        })
        .collect()
}

fn fill_chain<TestItem: KeyValuePair>(
    items: impl IntoIterator<Item = (u64, TestItem)>,
) -> ChainHashTable<TestItem> {
    let mut table = ChainHashTable::new();
    for (hash, item) in items {
        match table.entry(hash, |v| v.eq_key(&item)) {
            ChainEntry::Vacant(entry) => {
                entry.insert(item);
            }
            ChainEntry::Occupied(mut entry) => {
                *entry.get_mut() = item;
            }
        }
    }
    table
}

fn fill_hashbrown<TestItem: KeyValuePair>(
    items: impl IntoIterator<Item = (u64, TestItem)>,
) -> HashbrownHashTable<TestItem> {
    let mut table = HashbrownHashTable::new();
    for (hash, item) in items {
        match table.entry(hash, |v: &TestItem| v.eq_key(&item), |v| v.hash_key()) {
            HashbrownEntry::Vacant(entry) => {
                entry.insert(item);
            }
            HashbrownEntry::Occupied(mut entry) => {
                *entry.get_mut() = item;
            }
        }
    }
    table
}

fn bench_insert_random<TestItem: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!(
        "insert_random_{}",
        core::any::type_name::<TestItem>()
    ));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES[..=MAX_SIZE].iter() {
        let hash_and_item = random_items::<TestItem>(*size);
        group.throughput(Throughput::Elements(*size as u64));

        group.bench_function(format!("chain_hash/{size}"), |b| {
            b.iter_batched(
                || {
                    let mut hash_and_item = hash_and_item.clone();
                    hash_and_item.shuffle(&mut SmallRng::from_os_rng());
                    hash_and_item
                },
                |hash_and_item| black_box(fill_chain(hash_and_item)),
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || {
                    let mut hash_and_item = hash_and_item.clone();
                    hash_and_item.shuffle(&mut SmallRng::from_os_rng());
                    hash_and_item
                },
                |hash_and_item| black_box(fill_hashbrown(hash_and_item)),
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_find_hit<TestItem: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!(
        "find_hit_{}",
        core::any::type_name::<TestItem>()
    ));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES[..=MAX_SIZE].iter() {
        let hash_and_item = random_items::<TestItem>(*size);
        let chain = fill_chain(hash_and_item.iter().cloned());
        let hashbrown = fill_hashbrown(hash_and_item.iter().cloned());

        let mut lookups = hash_and_item.clone();
        lookups.shuffle(&mut SmallRng::from_os_rng());

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_function(format!("chain_hash/{size}"), |b| {
            b.iter(|| {
                for (hash, item) in lookups.iter() {
                    black_box(chain.find(*hash, |v| v.eq_key(item)));
                }
            })
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                for (hash, item) in lookups.iter() {
                    black_box(hashbrown.find(*hash, |v| v.eq_key(item)));
                }
            })
        });
    }

    group.finish();
}

fn bench_find_miss<TestItem: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!(
        "find_miss_{}",
        core::any::type_name::<TestItem>()
    ));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES[..=MAX_SIZE].iter() {
        let present = random_items::<TestItem>(*size);
        let missing = random_items::<TestItem>(*size);
        let chain = fill_chain(present.iter().cloned());
        let hashbrown = fill_hashbrown(present.into_iter());

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_function(format!("chain_hash/{size}"), |b| {
            b.iter(|| {
                for (hash, item) in missing.iter() {
                    black_box(chain.find(*hash, |v| v.eq_key(item)));
                }
            })
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                for (hash, item) in missing.iter() {
                    black_box(hashbrown.find(*hash, |v| v.eq_key(item)));
                }
            })
        });
    }

    group.finish();
}

fn bench_remove<TestItem: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!(
        "remove_{}",
        core::any::type_name::<TestItem>()
    ));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES[..=MAX_SIZE].iter() {
        let hash_and_item = random_items::<TestItem>(*size);
        let chain = fill_chain(hash_and_item.iter().cloned());
        let hashbrown = fill_hashbrown(hash_and_item.iter().cloned());

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_function(format!("chain_hash/{size}"), |b| {
            b.iter_batched(
                || chain.clone(),
                |mut table| {
                    for (hash, item) in hash_and_item.iter() {
                        black_box(table.remove(*hash, |v| v.eq_key(item)));
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || hashbrown.clone(),
                |mut table| {
                    for (hash, item) in hash_and_item.iter() {
                        if let Ok(entry) = table.find_entry(*hash, |v| v.eq_key(item)) {
                            black_box(entry.remove());
                        }
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

#[derive(Clone, Copy)]
enum Operation {
    Insert,
    Remove,
    Find,
}

fn bench_mixed_probabilistic_zipf<TestItem: KeyValuePair, const MAX_SIZE: usize>(
    c: &mut Criterion,
) {
    let mut group = c.benchmark_group(format!(
        "mixed_probabilistic_zipf_{}",
        core::any::type_name::<TestItem>()
    ));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES[..=MAX_SIZE].iter() {
        let mut rng = SmallRng::from_os_rng();
        let op_distr = Zipf::new(3.0, 1.0).unwrap();
        let key_distr = Zipf::new(*size as f32 * 2.0, 1.0).unwrap();

        let operations = (0..size * 3)
            .map(|_| {
                let op_choice: f64 = rng.sample(op_distr);
                let key = rng.sample(key_distr) as u64;
                let item = TestItem::new(key);
                let hash = item.hash_key();
                let operation = if op_choice <= 1.0 {
                    Operation::Find
                } else if op_choice <= 2.0 {
                    Operation::Insert
                } else {
                    Operation::Remove
                };
                (operation, hash, item)
            })
            .collect::<Vec<_>>();

        group.throughput(Throughput::Elements(*size as u64 * 3));
        group.bench_function(format!("chain_hash/{size}"), |b| {
            b.iter_batched(
                || operations.clone(),
                |operations| {
                    let mut table = ChainHashTable::<TestItem>::new();
                    for (operation, hash, item) in operations {
                        match operation {
                            Operation::Insert => {
                                match table.entry(hash, |v| v.eq_key(&item)) {
                                    ChainEntry::Vacant(entry) => {
                                        black_box(entry.insert(item));
                                    }
                                    ChainEntry::Occupied(mut entry) => {
                                        black_box(entry.insert(item));
                                    }
                                }
                            }
                            Operation::Remove => {
                                black_box(table.remove(hash, |v| v.eq_key(&item)));
                            }
                            Operation::Find => {
                                black_box(table.find(hash, |v| v.eq_key(&item)));
                            }
                        }
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || operations.clone(),
                |operations| {
                    let mut table = HashbrownHashTable::<TestItem>::new();
                    for (operation, hash, item) in operations {
                        match operation {
                            Operation::Insert => {
                                match table.entry(hash, |v| v.eq_key(&item), |v| v.hash_key()) {
                                    HashbrownEntry::Vacant(entry) => {
                                        black_box(entry.insert(item));
                                    }
                                    HashbrownEntry::Occupied(mut entry) => {
                                        *entry.get_mut() = item;
                                    }
                                }
                            }
                            Operation::Remove => {
                                if let Ok(entry) = table.find_entry(hash, |v| v.eq_key(&item)) {
                                    black_box(entry.remove());
                                }
                            }
                            Operation::Find => {
                                black_box(table.find(hash, |v| v.eq_key(&item)));
                            }
                        }
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_insert_random::<SmallTestItem, 4>,
    bench_insert_random::<TestItem, 4>,
    bench_find_hit::<SmallTestItem, 4>,
    bench_find_hit::<TestItem, 4>,
    bench_find_miss::<SmallTestItem, 4>,
    bench_find_miss::<TestItem, 4>,
    bench_remove::<SmallTestItem, 4>,
    bench_remove::<TestItem, 4>,
    bench_mixed_probabilistic_zipf::<SmallTestItem, 4>,
    bench_mixed_probabilistic_zipf::<TestItem, 4>,
);

criterion_main!(benches);
