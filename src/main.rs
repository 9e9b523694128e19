//! # Voxel World Entry Point
//!
//! Calls into the library's `run()` function, which builds the world and runs the
//! headless demo.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- path/to/config.json
//! ```

fn main() {
    if let Err(err) = voxel_world::run() {
        log::error!("{err:#}");
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
