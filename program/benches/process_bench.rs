// Processor benchmarks for GeniusVault.
//
// Covers record encode/decode, signable-byte construction, and full
// deposit invocations through the in-memory and sled stores.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use genius_vault::{
    load, process, process_signed, Invocation, MemoryStore, Operation, Pubkey, SignerSet,
    SledStore, VaultAccount, VaultKeypair,
};

fn init_vault<S: genius_vault::AccountStore>(store: &mut S, kp: &VaultKeypair) -> Pubkey {
    let address = Pubkey::new([0xAB; 32]);
    let inv = Invocation::new(
        address,
        0,
        Operation::Initialize {
            authority: kp.pubkey(),
            mint: Pubkey::new([0x01; 32]),
            max_deposit: u64::MAX,
        },
    );
    process(store, &inv, &SignerSet::from(kp.pubkey())).expect("initialize");
    address
}

fn bench_record_codec(c: &mut Criterion) {
    let mut acct = VaultAccount::new(
        Pubkey::new([1u8; 32]),
        Pubkey::new([2u8; 32]),
        Pubkey::new([3u8; 32]),
        u64::MAX,
    );
    acct.total_deposited = 10_000;
    acct.balance = 10_000;
    let bytes = acct.encode().expect("encode");

    c.bench_function("record/encode", |b| b.iter(|| acct.encode()));
    c.bench_function("record/decode", |b| b.iter(|| VaultAccount::decode(&bytes)));
}

fn bench_signable_bytes(c: &mut Criterion) {
    let inv = Invocation::new(Pubkey::new([7u8; 32]), 42, Operation::Deposit { amount: 500 });
    c.bench_function("invocation/signable_bytes", |b| b.iter(|| inv.signable_bytes()));
}

fn bench_memory_deposits(c: &mut Criterion) {
    let mut group = c.benchmark_group("process/memory_deposits");

    for count in [1u64, 10, 100] {
        group.throughput(Throughput::Elements(count));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let kp = VaultKeypair::from_seed(&[9u8; 32]);
            let signers = SignerSet::from(kp.pubkey());
            b.iter(|| {
                let mut store = MemoryStore::new();
                let address = init_vault(&mut store, &kp);
                for nonce in 1..=count {
                    let inv = Invocation::new(address, nonce, Operation::Deposit { amount: 1 });
                    process(&mut store, &inv, &signers).expect("deposit");
                }
            });
        });
    }

    group.finish();
}

fn bench_signed_deposit(c: &mut Criterion) {
    let kp = VaultKeypair::from_seed(&[9u8; 32]);
    let mut store = MemoryStore::new();
    let address = init_vault(&mut store, &kp);

    c.bench_function("process/signed_deposit", |b| {
        b.iter(|| {
            let nonce = load(&store, &address)
                .expect("load")
                .map_or(0, |acct| acct.nonce);
            let signed = Invocation::new(address, nonce, Operation::Deposit { amount: 1 }).sign(&[&kp]);
            process_signed(&mut store, &signed).expect("deposit")
        });
    });
}

fn bench_sled_deposit(c: &mut Criterion) {
    let kp = VaultKeypair::from_seed(&[9u8; 32]);
    let signers = SignerSet::from(kp.pubkey());
    let mut store = SledStore::open_temporary().expect("temp store");
    let address = init_vault(&mut store, &kp);

    c.bench_function("process/sled_deposit", |b| {
        b.iter(|| {
            let nonce = load(&store, &address)
                .expect("load")
                .map_or(0, |acct| acct.nonce);
            let inv = Invocation::new(address, nonce, Operation::Deposit { amount: 1 });
            process(&mut store, &inv, &signers).expect("deposit")
        });
    });
}

criterion_group!(
    benches,
    bench_record_codec,
    bench_signable_bytes,
    bench_memory_deposits,
    bench_signed_deposit,
    bench_sled_deposit,
);
criterion_main!(benches);
