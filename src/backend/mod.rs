pub mod client;
pub mod packet;
pub mod socket;

pub use client::BackendClient;
pub use socket::SocketChannel;
