use core::hash::BuildHasherDefault;
use core::hash::Hash;
use core::hint::black_box;

use criterion::AxisScale;
use criterion::BatchSize;
use criterion::Criterion;
use criterion::PlotConfiguration;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use hashbrown::HashMap as HashbrownMap;
use pod_hash::HashMap as PodHashMap;
use pod_hash::Visit;
use rand::Rng;
use rand::SeedableRng;
use rand::TryRngCore;
use rand::rngs::OsRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand_distr::Zipf;
use siphasher::sip::SipHasher13;

type Sip = BuildHasherDefault<SipHasher13>;

trait BenchKey: Copy + Hash + Eq {
    fn new(key: u64) -> Self;
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct SmallKey(u64);

impl BenchKey for SmallKey {
    fn new(key: u64) -> Self {
        black_box(Self(key))
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct WideKey([u64; 4]);

impl BenchKey for WideKey {
    fn new(key: u64) -> Self {
        black_box(Self([key, key.rotate_left(16), key.rotate_left(32), !key]))
    }
}

#[derive(Clone, Copy)]
enum Operation {
    Insert,
    Find,
    Remove,
}

const SIZES: &[usize] = &[
    (1 << 10),
    (1 << 12),
    (1 << 14),
    (1 << 16),
    (1 << 18),
];

fn random_keys<K: BenchKey>(count: usize) -> Vec<K> {
    let mut rng = OsRng;
    (0..count)
        .map(|_| K::new(rng.try_next_u64().unwrap()))
        .collect()
}

fn filled_pod<K: BenchKey>(keys: &[K]) -> PodHashMap<K, u64, Sip> {
    let mut map = PodHashMap::default();
    for (i, key) in keys.iter().enumerate() {
        map.put(*key, i as u64).unwrap();
    }
    map
}

fn filled_hashbrown<K: BenchKey>(keys: &[K]) -> HashbrownMap<K, u64, Sip> {
    let mut map = HashbrownMap::default();
    for (i, key) in keys.iter().enumerate() {
        map.insert(*key, i as u64);
    }
    map
}

fn bench_insert_random<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!(
        "insert_random_{}",
        core::any::type_name::<K>()
    ));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES[..=MAX_SIZE].iter() {
        let keys = random_keys::<K>(*size);
        group.throughput(Throughput::Elements(*size as u64));

        group.bench_function(format!("pod_hash/{size}"), |b| {
            b.iter_batched(
                || {
                    let mut keys = keys.clone();
                    keys.shuffle(&mut SmallRng::from_os_rng());
                    keys
                },
                |keys| black_box(filled_pod(&keys)),
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || {
                    let mut keys = keys.clone();
                    keys.shuffle(&mut SmallRng::from_os_rng());
                    keys
                },
                |keys| black_box(filled_hashbrown(&keys)),
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_insert_preallocated<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!(
        "insert_preallocated_{}",
        core::any::type_name::<K>()
    ));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES[..=MAX_SIZE].iter() {
        let keys = random_keys::<K>(*size);
        group.throughput(Throughput::Elements(*size as u64));

        group.bench_function(format!("pod_hash/{size}"), |b| {
            b.iter_batched(
                || PodHashMap::<K, u64, Sip>::try_with_capacity(*size).unwrap(),
                |mut map| {
                    for (i, key) in keys.iter().enumerate() {
                        black_box(map.put(*key, i as u64).unwrap());
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || HashbrownMap::<K, u64, Sip>::with_capacity_and_hasher(*size, Sip::default()),
                |mut map| {
                    for (i, key) in keys.iter().enumerate() {
                        black_box(map.insert(*key, i as u64));
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_find_hit_miss<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!(
        "find_hit_miss_{}",
        core::any::type_name::<K>()
    ));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES[..=MAX_SIZE].iter() {
        let keys = random_keys::<K>(*size);
        let mut probes = keys.clone();
        probes.extend(random_keys::<K>(*size));
        probes.shuffle(&mut SmallRng::from_os_rng());

        let pod = filled_pod(&keys);
        let brown = filled_hashbrown(&keys);
        group.throughput(Throughput::Elements(probes.len() as u64));

        group.bench_function(format!("pod_hash/{size}"), |b| {
            b.iter(|| {
                for key in probes.iter() {
                    black_box(pod.get(key));
                }
            })
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                for key in probes.iter() {
                    black_box(brown.get(key));
                }
            })
        });
    }

    group.finish();
}

fn bench_remove<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("remove_{}", core::any::type_name::<K>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES[..=MAX_SIZE].iter() {
        let keys = random_keys::<K>(*size);
        let pod = filled_pod(&keys);
        let brown = filled_hashbrown(&keys);
        group.throughput(Throughput::Elements(*size as u64));

        group.bench_function(format!("pod_hash/{size}"), |b| {
            b.iter_batched(
                || pod.clone(),
                |mut map| {
                    for key in keys.iter() {
                        black_box(map.remove(key));
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || brown.clone(),
                |mut map| {
                    for key in keys.iter() {
                        black_box(map.remove(key));
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_iteration<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("iteration_{}", core::any::type_name::<K>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES[..=MAX_SIZE].iter() {
        let keys = random_keys::<K>(*size);
        let pod = filled_pod(&keys);
        let brown = filled_hashbrown(&keys);
        group.throughput(Throughput::Elements(*size as u64));

        group.bench_function(format!("pod_hash/{size}"), |b| {
            b.iter(|| black_box(pod.values().fold(0u64, |acc, v| acc.wrapping_add(*v))))
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| black_box(brown.values().fold(0u64, |acc, v| acc.wrapping_add(*v))))
        });
    }

    group.finish();
}

fn bench_retain_half<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("retain_half_{}", core::any::type_name::<K>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES[..=MAX_SIZE].iter() {
        let keys = random_keys::<K>(*size);
        let pod = filled_pod(&keys);
        let brown = filled_hashbrown(&keys);
        group.throughput(Throughput::Elements(*size as u64));

        group.bench_function(format!("pod_hash/{size}"), |b| {
            b.iter_batched(
                || pod.clone(),
                |mut map| {
                    map.iterate(|_, _, v| if *v % 2 == 0 { Visit::Remove } else { Visit::Continue });
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || brown.clone(),
                |mut map| {
                    map.retain(|_, v| *v % 2 != 0);
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_mixed_probabilistic_zipf<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    for exponent in [1.0, 1.3] {
        let mut group = c.benchmark_group(format!(
            "mixed_probabilistic_zipf_{:.01}_{}",
            exponent,
            core::any::type_name::<K>()
        ));
        group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

        const KEY_SPACE_MULTIPLIER: f32 = 2.0;

        for size in SIZES[..=MAX_SIZE].iter() {
            let mut rng = SmallRng::from_os_rng();
            let op_distr = Zipf::new(3.0, exponent).unwrap();
            let insert_distr = Zipf::new(*size as f32 - 1.0, 1.0).unwrap();
            let lookup_distr = Zipf::new(*size as f32 * KEY_SPACE_MULTIPLIER - 1.0, 1.0).unwrap();

            let workload = (0..size * 3)
                .map(|_| {
                    let op_choice: f64 = rng.sample(op_distr);
                    if op_choice <= 1.0 {
                        (Operation::Find, K::new(rng.sample(lookup_distr) as u64))
                    } else if op_choice <= 2.0 {
                        (Operation::Insert, K::new(rng.sample(insert_distr) as u64))
                    } else {
                        (Operation::Remove, K::new(rng.sample(lookup_distr) as u64))
                    }
                })
                .collect::<Vec<(Operation, K)>>();

            group.throughput(Throughput::Elements(workload.len() as u64));

            group.bench_function(format!("pod_hash/{size}"), |b| {
                b.iter(|| {
                    let mut map = PodHashMap::<K, u64, Sip>::default();
                    for (i, (operation, key)) in workload.iter().enumerate() {
                        match operation {
                            Operation::Insert => {
                                black_box(map.replace(*key, i as u64).unwrap());
                            }
                            Operation::Find => {
                                black_box(map.get(key));
                            }
                            Operation::Remove => {
                                black_box(map.remove(key));
                            }
                        }
                    }
                    black_box(map)
                })
            });

            group.bench_function(format!("hashbrown/{size}"), |b| {
                b.iter(|| {
                    let mut map = HashbrownMap::<K, u64, Sip>::default();
                    for (i, (operation, key)) in workload.iter().enumerate() {
                        match operation {
                            Operation::Insert => {
                                black_box(map.insert(*key, i as u64));
                            }
                            Operation::Find => {
                                black_box(map.get(key));
                            }
                            Operation::Remove => {
                                black_box(map.remove(key));
                            }
                        }
                    }
                    black_box(map)
                })
            });
        }

        group.finish();
    }
}

fn bench_churn<K: BenchKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("churn_{}", core::any::type_name::<K>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES[..=MAX_SIZE].iter() {
        let insertions_and_removals = (0..*size as u64)
            .flat_map(|i| {
                let key = K::new(i);
                [key, key]
            })
            .collect::<Vec<K>>();

        group.throughput(Throughput::Elements(insertions_and_removals.len() as u64));

        group.bench_function(format!("pod_hash/{size}"), |b| {
            b.iter_batched(
                || {
                    let mut keys = insertions_and_removals.clone();
                    keys.shuffle(&mut SmallRng::from_os_rng());
                    keys
                },
                |keys| {
                    let mut map = PodHashMap::<K, u64, Sip>::default();
                    for key in keys {
                        let (index, kind) = map.put_index(key, 0).unwrap();
                        if kind == pod_hash::Insertion::Present {
                            black_box(map.remove_at(index, true));
                        }
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || {
                    let mut keys = insertions_and_removals.clone();
                    keys.shuffle(&mut SmallRng::from_os_rng());
                    keys
                },
                |keys| {
                    let mut map = HashbrownMap::<K, u64, Sip>::default();
                    for key in keys {
                        match map.entry(key) {
                            hashbrown::hash_map::Entry::Vacant(entry) => {
                                black_box(entry.insert(0));
                            }
                            hashbrown::hash_map::Entry::Occupied(entry) => {
                                black_box(entry.remove());
                            }
                        }
                    }
                    black_box(map)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_mixed_probabilistic_zipf::<SmallKey, 4>,
    bench_mixed_probabilistic_zipf::<WideKey, 3>,
    bench_churn::<SmallKey, 4>,
    bench_churn::<WideKey, 3>,
    bench_insert_random::<SmallKey, 4>,
    bench_insert_random::<WideKey, 3>,
    bench_insert_preallocated::<SmallKey, 4>,
    bench_insert_preallocated::<WideKey, 3>,
    bench_find_hit_miss::<SmallKey, 4>,
    bench_find_hit_miss::<WideKey, 3>,
    bench_remove::<SmallKey, 4>,
    bench_remove::<WideKey, 3>,
    bench_iteration::<SmallKey, 4>,
    bench_iteration::<WideKey, 3>,
    bench_retain_half::<SmallKey, 4>,
    bench_retain_half::<WideKey, 3>,
);

criterion_main!(benches);
