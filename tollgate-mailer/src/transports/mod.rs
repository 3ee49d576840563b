mod file;
mod memory;
pub mod smtp;

pub use file::FileTransport;
pub use memory::MemoryTransport;
pub use smtp::{SmtpTransport, TlsConfig};
