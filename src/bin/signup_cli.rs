use signup_core::cli::{run_cli, CliOptions};

fn main() {
    signup_core::init();

    let result = CliOptions::parse(std::env::args().skip(1)).and_then(run_cli);
    if let Err(err) = result {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
