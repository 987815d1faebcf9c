use pqinspect::cli;
use std::env;
use std::process;

fn main() {
    env_logger::init();

    let command = cli::Command::new();

    match command.run(env::args()) {
        Ok(output) => {
            print!("{}", output)
        }
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    };
}
