use clipcode_core::registrar::chord_trigger;
use clipcode_core::MappingIndex;

fn main() {
    tracing_subscriber::fmt::init();

    let root = std::env::args().nth(1).unwrap_or_else(|| ".".to_string());
    let index = MappingIndex::build(&root);
    for (code, path) in index.iter() {
        println!("{:<6} {:<14} {}", code.to_string(), chord_trigger(code), path.display());
    }
}
