//! Zone-level DNS arithmetic: SOA serials and reverse-lookup names.

pub mod reverse;
pub mod serial;

pub use reverse::{ReverseError, best_matching_zone, ip_to_ptr, ipv4_to_ptr, ipv6_to_ptr};
pub use serial::{next_serial, updated_soa_content};
