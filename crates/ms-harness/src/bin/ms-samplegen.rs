#![forbid(unsafe_code)]

use std::path::PathBuf;

use ms_harness::{CorpusConfig, generate_corpus};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = CorpusConfig::default_paths();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--out-dir" => {
                let value = args.next().ok_or("--out-dir requires a path")?;
                config.out_dir = PathBuf::from(value);
            }
            "--samples" => {
                let value = args.next().ok_or("--samples requires a count")?;
                config.samples = value.parse()?;
            }
            "--size-jump" => {
                let value = args.next().ok_or("--size-jump requires a count")?;
                config.size_jump = value.parse()?;
                if config.size_jump == 0 {
                    return Err("--size-jump must be at least 1".into());
                }
            }
            "--max-value" => {
                let value = args.next().ok_or("--max-value requires a bound")?;
                config.max_value = value.parse()?;
                if config.max_value == 0 {
                    return Err("--max-value must be at least 1".into());
                }
            }
            "--seed" => {
                let value = args.next().ok_or("--seed requires a u64")?;
                config.rng_seed = Some(value.parse()?);
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            other => {
                return Err(format!("unknown argument: {other}").into());
            }
        }
    }

    let written = generate_corpus(&config)?;
    for path in &written {
        println!("wrote sample={}", path.display());
    }
    println!("corpus dir={} samples={}", config.out_dir.display(), written.len());

    Ok(())
}

fn print_help() {
    println!(
        "ms-samplegen\n\
         Usage:\n\
         \tms-samplegen [--out-dir samples_big] [--samples 5] [--size-jump 200000]\n\
         Options:\n\
         \t--out-dir <path>     Output directory for sample files (default samples_big)\n\
         \t--samples <n>        Number of sample files (default 5)\n\
         \t--size-jump <n>      Array-size step between samples (default 200000)\n\
         \t--max-value <n>      Exclusive bound on array values (default 200)\n\
         \t--seed <u64>         Reproduction seed for the generator\n\
         \t-h, --help           Show this help"
    );
}
