//! Snapshot providers

pub mod clip;
pub mod udp;

pub use clip::ClipProvider;
pub use udp::UdpProvider;
