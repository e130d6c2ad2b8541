//! Services: the publish workflow and the HTTP transport it runs over.

pub mod publisher;
pub mod transport;
