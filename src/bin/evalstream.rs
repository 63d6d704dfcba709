fn main() {
    if let Err(e) = evalstream::cli::run() {
        eprintln!("evalstream: {}", e);
        std::process::exit(1);
    }
}
