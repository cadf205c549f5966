// meili main program

mod config;
mod files;
mod internals;
mod kernel;
mod runtime;

use config::Config;
use std::process;

fn main() {
    let mut config = Config::new();
    config.process_args();

    if config.run {
        let status = config.run_forth();
        process::exit(status as i32);
    }
}
