// This binary crate is intentionally minimal.
// All library logic lives in src/lib.rs and its modules.
// Run examples with:
//   cargo run --example xor
fn main() {
    println!("synapse-nn: a small supervised-learning library in Rust.");
    println!("Run `cargo run --example xor` to see the XOR demo.");
}
