#![forbid(unsafe_code)]

use std::path::PathBuf;

use ms_harness::{HarnessConfig, append_run_history, run_suite, solver_is_present, write_run_report};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = HarnessConfig::default_paths();
    let mut write_report = false;
    let mut write_history = false;
    let mut require_green = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--solver" => {
                let value = args.next().ok_or("--solver requires a path")?;
                config.solver = PathBuf::from(value);
            }
            "--work-dir" => {
                let value = args.next().ok_or("--work-dir requires a path")?;
                config.work_dir = PathBuf::from(value);
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
            "--write-report" => {
                write_report = true;
            }
            "--write-history" => {
                write_history = true;
            }
            "--require-green" => {
                require_green = true;
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

    if !solver_is_present(&config.solver) {
        eprintln!(
            "warning: solver {} is not a file; every case will be reported failed",
            config.solver.display()
        );
    }

    let report = run_suite(&config)?;
    for case in &report.results {
        match case.elapsed_ms {
            Some(elapsed) => println!(
                "case size={} queries={} status={} elapsed_ms={}{}",
                case.size,
                case.query_count,
                case.status,
                elapsed,
                detail_suffix(case.detail.as_deref())
            ),
            None => println!(
                "case size={} queries={} status={}{}",
                case.size,
                case.query_count,
                case.status,
                detail_suffix(case.detail.as_deref())
            ),
        }
    }
    println!(
        "suite={} solver={} samples={} passed={} wrong={} failed={} green={}",
        report.suite,
        report.solver,
        report.samples,
        report.passed,
        report.wrong,
        report.failed,
        report.is_green()
    );

    if write_report {
        let path = write_run_report(&config, &report)?;
        println!("wrote run_report={}", path.display());
    }
    if write_history {
        let path = append_run_history(&config, &report)?;
        println!("wrote run_history={}", path.display());
    }

    if require_green && !report.is_green() {
        return Err(format!(
            "run is not green: wrong={} failed={}",
            report.wrong, report.failed
        )
        .into());
    }

    Ok(())
}

fn detail_suffix(detail: Option<&str>) -> String {
    detail.map_or_else(String::new, |detail| format!(" detail={detail:?}"))
}

fn print_help() {
    println!(
        "ms-harness-cli\n\
         Usage:\n\
         \tms-harness-cli [--solver ./solver] [--samples 50] [--size-jump 20000] [--seed N]\n\
         Options:\n\
         \t--solver <path>      Solver executable under test (default ./solver)\n\
         \t--work-dir <path>    Directory for transient case files (default .)\n\
         \t--samples <n>        Number of cases on the linear schedule (default 50)\n\
         \t--size-jump <n>      Array-size step between cases (default 20000)\n\
         \t--max-value <n>      Exclusive bound on array values (default 1000000)\n\
         \t--seed <u64>         Reproduction seed for the case generator\n\
         \t--write-report       Write run_report.json under the work dir\n\
         \t--write-history      Append a summary row to run_history.jsonl\n\
         \t--require-green      Exit non-zero when any case is wrong or failed\n\
         \t-h, --help           Show this help"
    );
}
