fn main() {
    if let Err(error) = mide_cli::run() {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}
