pub mod network_io;

pub use network_io::NetworkIoCsv;
