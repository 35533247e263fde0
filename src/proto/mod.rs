//! Wire contract for the `voting.Voting` service.
//!
//! `voting.rs` is generated from `proto/voting.proto` and checked in; regenerate it with
//! tonic-build whenever the schema changes, and keep the descriptor in `build.rs` in step.

pub mod voting;

use prost::Message;

/// Encoded `FileDescriptorSet` for `voting.proto`, built by `build.rs` for server reflection.
pub const FILE_DESCRIPTOR_SET: &[u8] =
    include_bytes!(concat!(env!("OUT_DIR"), "/voting_descriptor.bin"));

/// Serializes a message into its protobuf binary form.
pub fn encode<M: Message>(message: &M) -> Vec<u8> {
    message.encode_to_vec()
}

/// Parses a protobuf binary payload. Unknown fields are skipped and absent fields take their
/// proto3 defaults.
pub fn decode<M: Message + Default>(bytes: &[u8]) -> Result<M, prost::DecodeError> {
    M::decode(bytes)
}
