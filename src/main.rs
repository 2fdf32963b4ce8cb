use std::path::PathBuf;

use clap::Parser;

/// AdaScript is a small, dynamically-typed, embeddable scripting language
/// with a tree-walking interpreter.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory that `import "builtins/..."` paths resolve against.
    #[arg(long = "built-ins-location", value_name = "DIR")]
    built_ins_location: Option<PathBuf>,

    /// The script file to run.
    script: PathBuf,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = adascript::run_file(&args.script, args.built_ins_location) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
