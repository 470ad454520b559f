//! The layered block decoders, leaf to root: raw value decoding, property
//! stores, the decryption layer, format identification, field-offset maps,
//! and the fixed/variable record blocks. Everything here is stateless with
//! respect to the container; the reader layer feeds in stream bytes and
//! interprets the results.

pub mod bytes;
pub mod crypt;
pub mod fieldmap;
pub mod fixed;
pub mod format;
pub mod props;
pub mod var;
