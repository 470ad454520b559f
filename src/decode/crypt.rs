//! Read-password protection.
//!
//! Protected files flag themselves in the header property store and may
//! additionally XOR-scramble their payload streams with a single byte
//! derived from the stored encryption code.

use super::bytes;
use super::props::{keys, Props};

/// Protection state read from a header property store.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Protection {
    pub password_protected: bool,
    pub encrypted: bool,
    code: u8,
}

impl Protection {
    pub fn from_props(props: &Props) -> Protection {
        let flags = props.byte(keys::PASSWORD_FLAG);
        let raw_code = props.byte(keys::ENCRYPTION_CODE);
        Protection {
            password_protected: flags & 0x01 != 0,
            encrypted: flags & 0x02 != 0,
            code: if raw_code == 0 { 0 } else { 0xFF - raw_code },
        }
    }

    /// Undo the XOR scrambling if this file uses it; plain files pass
    /// through untouched.
    pub fn decode(&self, mut data: Vec<u8>) -> Vec<u8> {
        if self.encrypted {
            bytes::xor_transform(&mut data, self.code);
        }
        data
    }
}
