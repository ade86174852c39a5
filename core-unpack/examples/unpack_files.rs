//! Decode media files and print their tensor shapes.
//!
//! Run with:
//! ```bash
//! cargo run -p core-unpack --example unpack_files -- 4 a.png b.gif c.wav
//!
//! # JSON logs
//! UNPACK_LOG=json cargo run -p core-unpack --example unpack_files -- 2 *.jpg
//! ```

use core_runtime::logging::{init_logging, LogFormat, LogLevel, LoggingConfig};
use core_unpack::{BatchDecoder, DecodeConfig};
use std::env;
use std::fs;
use std::process::ExitCode;

fn main() -> ExitCode {
    let format = match env::var("UNPACK_LOG").as_deref() {
        Ok("json") => LogFormat::Json,
        Ok("compact") => LogFormat::Compact,
        _ => LogFormat::Pretty,
    };
    if let Err(e) = init_logging(
        LoggingConfig::default()
            .with_format(format)
            .with_level(LogLevel::Info),
    ) {
        eprintln!("logging disabled: {e}");
    }

    let mut args = env::args().skip(1);
    let Some(workers) = args.next().and_then(|w| w.parse::<usize>().ok()) else {
        eprintln!("usage: unpack_files <workers> <file>...");
        return ExitCode::FAILURE;
    };
    let paths: Vec<String> = args.collect();

    // File reading happens up front; the engine only sees bytes.
    let mut inputs = Vec::with_capacity(paths.len());
    for path in &paths {
        match fs::read(path) {
            Ok(bytes) => inputs.push(bytes),
            Err(e) => {
                eprintln!("{path}: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    let batch = match BatchDecoder::new(DecodeConfig::default()) {
        Ok(batch) => batch,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let items = match batch.unpack_many(&inputs, workers) {
        Ok(items) => items,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut failed = 0;
    for (path, item) in paths.iter().zip(items) {
        match item.result {
            Ok(tensor) => println!("{path}: {} {:?}", item.format, tensor.shape()),
            Err(e) => {
                failed += 1;
                println!("{path}: {} error: {e}", item.format);
            }
        }
    }

    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
