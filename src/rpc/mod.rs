//! RPC layer subsystem.
//!
//! # Data Flow
//! ```text
//! JSON body → contract (protobuf encode) → CallContext + bytes
//!     → transport (tonic channel, RawCodec) → backend
//!     → bytes → contract (protobuf decode) → JSON body
//! ```
//!
//! # Design Decisions
//! - The transport moves opaque bytes; message types live only in `contract`
//! - The echo backend ships in-tree so the relay can be exercised end to end

pub mod call;
pub mod codec;
pub mod contract;
pub mod echo;
pub mod transport;

pub use call::CallContext;
pub use contract::{greeter_contract, ServiceContract, UnaryMethod};
pub use echo::EchoGreeter;
pub use transport::GrpcDialer;
