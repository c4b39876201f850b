fn main() {
    murmur_cli::set_version(env!("CARGO_PKG_VERSION"));
    let args: Vec<String> = std::env::args().skip(1).collect();

    let backend = match murmur_cli::FilesystemMurmurBackend::open() {
        Ok(b) => b,
        Err(e) => {
            eprintln!("murmur: {e}");
            std::process::exit(1);
        }
    };
    murmur_cli::logging::init_logging(backend.config().log.as_deref());

    let out = murmur_cli::run_cli(&args, &backend);
    if !out.stdout.is_empty() {
        print!("{}", out.stdout);
    }
    if !out.stderr.is_empty() {
        eprint!("{}", out.stderr);
    }
    std::process::exit(out.exit_code);
}
