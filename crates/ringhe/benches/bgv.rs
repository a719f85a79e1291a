use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::thread_rng;
use ringhe::bgv::{
    AutomorphismKeys, BgvParametersBuilder, Ciphertext, Multiplicator, Plaintext, PublicKey,
    RelinearizationKey, SecretKey, SwitchKeyMultiplicationKey,
};
use ringhe_traits::{FheEncoder, FheEncrypter};
use std::sync::Arc;
use std::time::Duration;

pub fn bgv_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("bgv");
    group.sample_size(10);
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(2));

    let mut rng = thread_rng();
    for (degree, log_q) in [(16usize, 60usize), (64, 100)] {
        let par = BgvParametersBuilder::new()
            .set_degree(degree)
            .set_plaintext_modulus(257)
            .set_ciphertext_modulus_size(log_q)
            .build_arc()
            .unwrap();
        let sk = SecretKey::random(&par, &mut rng).unwrap();
        let pk = PublicKey::new(&sk, &mut rng).unwrap();
        let rk = Arc::new(RelinearizationKey::new(&sk, &mut rng).unwrap());
        let sk_mul = Arc::new(SwitchKeyMultiplicationKey::new(&sk, &mut rng).unwrap());
        let ak = AutomorphismKeys::new(&sk, &[3], &mut rng).unwrap();

        let values = (0..degree as u64).collect::<Vec<_>>();
        let pt = Plaintext::try_encode(values.as_slice(), &par).unwrap();
        let ct1: Ciphertext = sk.try_encrypt(&pt, &mut rng).unwrap();
        let ct2: Ciphertext = sk.try_encrypt(&pt, &mut rng).unwrap();
        let name = format!("n={degree}/log(q)={log_q}");

        group.bench_function(BenchmarkId::new("encrypt_sk", &name), |b| {
            b.iter(|| -> Ciphertext { sk.try_encrypt(&pt, &mut thread_rng()).unwrap() })
        });
        group.bench_function(BenchmarkId::new("encrypt_pk", &name), |b| {
            b.iter(|| -> Ciphertext { pk.try_encrypt(&pt, &mut thread_rng()).unwrap() })
        });

        let multiplicator = Multiplicator::new(rk);
        group.bench_function(BenchmarkId::new("mul_relinearization_key", &name), |b| {
            b.iter(|| multiplicator.multiply(&ct1, &ct2).unwrap())
        });
        let multiplicator = Multiplicator::new(sk_mul);
        group.bench_function(BenchmarkId::new("mul_switch_keys", &name), |b| {
            b.iter(|| multiplicator.multiply(&ct1, &ct2).unwrap())
        });

        group.bench_function(BenchmarkId::new("eval_auto", &name), |b| {
            b.iter(|| ak.eval_auto(&ct1, 3).unwrap())
        });
    }

    group.finish();
}

criterion_group!(bgv, bgv_benchmark);
criterion_main!(bgv);
