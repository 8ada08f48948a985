use std::path::Path;
use std::process;

use foldeval::{FoldStore, LinearClassifier, Mode, NFold, RunConfig};

const USAGE: &str = "usage: foldeval <config.json> <data_dir> <n_folds> [--test] [--no-save]";

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 3 {
        eprintln!("{}", USAGE);
        process::exit(2);
    }

    let config = match RunConfig::load_json(Path::new(&args[0])) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to load config {}: {}", args[0], err);
            process::exit(1);
        }
    };

    let n_folds: usize = match args[2].parse() {
        Ok(n) => n,
        Err(_) => {
            eprintln!("n_folds must be a non-negative integer, got '{}'", args[2]);
            process::exit(2);
        }
    };

    let mode = if args.iter().any(|a| a == "--test") {
        Mode::Test
    } else {
        Mode::Validate
    };
    let save = !args.iter().any(|a| a == "--no-save");

    let runner = NFold::new(
        FoldStore::new(&args[1]),
        ".",
        "linear",
        |name: &str, base_name: &str| LinearClassifier::new(name, base_name),
    );

    if let Err(err) = runner.run(&config, n_folds, save, mode) {
        eprintln!("cross-validation failed: {}", err);
        process::exit(1);
    }
}
