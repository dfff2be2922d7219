use symcrypt_cipher::{new_block_cipher, Algorithm, CipherSpec, ModeKind, PaddingKind, SymmetricEncryption};
use symcrypt_core::EngineConfig;

fn make_data(size: usize) -> Vec<u8> {
    (0..size)
        .map(|i| (i.wrapping_mul(7) ^ (i >> 3)) as u8)
        .collect()
}

fn engine(algorithm: Algorithm, mode: ModeKind) -> SymmetricEncryption {
    let spec = CipherSpec::new(algorithm, mode, PaddingKind::Pkcs7, vec![0x5Cu8; 16]);
    SymmetricEncryption::new(spec, &[0xABu8; 16], &EngineConfig::default()).unwrap()
}

#[divan::bench(args = Algorithm::ALL)]
fn bench_single_block(bencher: divan::Bencher, algorithm: Algorithm) {
    let cipher = new_block_cipher(algorithm, &[0xABu8; 16]).unwrap();
    let mut block = [0u8; 16];
    bencher
        .counter(divan::counter::BytesCount::new(16usize))
        .bench_local(|| cipher.encrypt_block(divan::black_box(&mut block)).unwrap());
}

#[divan::bench(args = ModeKind::ALL)]
fn bench_encrypt_rc6_64k(bencher: divan::Bencher, mode: ModeKind) {
    let engine = engine(Algorithm::Rc6, mode);
    let data = make_data(65536);
    bencher
        .counter(divan::counter::BytesCount::new(data.len()))
        .bench(|| engine.encrypt(divan::black_box(&data)).unwrap());
}

#[divan::bench(args = ModeKind::ALL)]
fn bench_decrypt_serpent_64k(bencher: divan::Bencher, mode: ModeKind) {
    let engine = engine(Algorithm::Serpent, mode);
    let data = make_data(65536);
    let encrypted = engine.encrypt(&data).unwrap();
    bencher
        .counter(divan::counter::BytesCount::new(data.len()))
        .bench(|| engine.decrypt(divan::black_box(&encrypted)).unwrap());
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_ctr_by_size(bencher: divan::Bencher, size: usize) {
    let engine = engine(Algorithm::Rc6, ModeKind::Ctr);
    let data = make_data(size);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| engine.encrypt(divan::black_box(&data)).unwrap());
}

fn main() {
    divan::main();
}
