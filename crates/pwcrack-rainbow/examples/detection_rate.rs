//! 検出率評価スクリプト
//!
//! 保存済みレインボーテーブルの検出率と検索速度を計測する。
//! サンプル平文はテーブルのアルファベットから一様抽出する。
//!
//! ## 実行方法
//!
//! ```powershell
//! # 事前に pwcrack_create でテーブルを作成しておく（data/rainbow_table.json）
//! cargo run --example detection_rate -p pwcrack-rainbow --release -- 5
//! ```
//!
//! ## 出力例
//!
//! ```text
//! [Detection Rate Evaluation]
//! Table: data/rainbow_table.json
//! Chains: 100,000
//! Length: 5
//! Sample count: 200
//!
//! Detection rate: 142/200 (71.0%)
//! Total time: 12.34s
//! Average time per query: 61.7ms
//! ```

use std::time::Instant;

use pwcrack_rainbow::{Cracker, FileChainStore, MismatchPolicy, RainbowConfig, ReductionFamily, hash_plaintext};

const SAMPLE_COUNT: usize = 200;
const DEFAULT_LENGTH: usize = 5;

fn main() {
    let length = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(DEFAULT_LENGTH);

    let config = RainbowConfig::default();

    println!("[Detection Rate Evaluation]");
    println!("Table: {}", config.table_path().display());

    println!("Loading table...");
    let start = Instant::now();
    let store = match FileChainStore::open_with_config(&config, MismatchPolicy::Abort) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: Failed to load table: {}", e);
            eprintln!(
                "Generate with: cargo run --release -p pwcrack-cli --bin pwcrack_create -- 100000 {}",
                length
            );
            std::process::exit(1);
        }
    };
    println!(
        "Loaded {} chains in {:.2}s",
        store.len(),
        start.elapsed().as_secs_f64()
    );
    println!("Length: {}", length);
    println!("Sample count: {}", SAMPLE_COUNT);
    println!();

    let mut rng = rand::thread_rng();
    let samples: Vec<String> = (0..SAMPLE_COUNT)
        .map(|_| config.alphabet.random_plaintext(&mut rng, length))
        .collect();

    let reduction = ReductionFamily::new(config.alphabet.clone());
    let cracker = Cracker::new(&store, &reduction, config.steps);

    let mut detected = 0;
    let start = Instant::now();

    for (i, plaintext) in samples.iter().enumerate() {
        let found = cracker
            .crack(&hash_plaintext(plaintext), length)
            .unwrap_or_else(|e| {
                eprintln!("Error: lookup failed: {}", e);
                std::process::exit(1);
            });

        if found.as_deref() == Some(plaintext.as_str()) {
            detected += 1;
        }

        if (i + 1) % 20 == 0 {
            println!("Progress: {}/{}", i + 1, SAMPLE_COUNT);
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!(
        "Detection rate: {}/{} ({:.1}%)",
        detected,
        SAMPLE_COUNT,
        detected as f64 / SAMPLE_COUNT as f64 * 100.0
    );
    println!("Total time: {:.2}s", elapsed.as_secs_f64());
    println!(
        "Average time per query: {:.1}ms",
        elapsed.as_secs_f64() * 1000.0 / SAMPLE_COUNT as f64
    );
}
