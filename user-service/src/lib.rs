//! # User Service
//!
//! **INTERNAL USE ONLY**: This crate exists solely to provide gRPC server
//! implementations and a descriptor set for integration testing the
//! `pontet-core` client layer. It is not intended for production use.

pub mod pb {
    include!(concat!(env!("OUT_DIR"), "/user.v1.rs"));
}

pub use pb::account_service_server::{AccountService, AccountServiceServer};
pub use pb::user_service_server::{UserService, UserServiceServer};
pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("descriptors");
