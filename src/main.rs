fn main() {
    if let Err(err) = dealnotes_lib::run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}
