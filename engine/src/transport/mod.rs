mod loopback;
mod peer;

pub use loopback::LoopbackSink;
pub use peer::PeerSink;
