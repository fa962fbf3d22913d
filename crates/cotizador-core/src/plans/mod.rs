//! One calculator per plan family. Each takes the price row, the request fields of its
//! branch and a configuration snapshot, and returns a complete [`crate::QuoteResult`].

pub mod cash;
pub mod credicontado;
pub mod credito;
pub mod credito_fs;
