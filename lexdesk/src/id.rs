use std::{
    fmt,
    str::FromStr,
    sync::atomic::{AtomicU32, Ordering},
};

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;
use uuid::Uuid;

/// Length of the hexadecimal rendering of an [`ObjectId`].
pub const OBJECT_ID_HEX_LEN: usize = 24;

/// Random bytes shared by every identifier generated in this process.
static PROCESS_UNIQUE: Lazy<[u8; 5]> = Lazy::new(|| {
    let random = Uuid::new_v4();
    let mut bytes = [0u8; 5];
    bytes.copy_from_slice(&random.as_bytes()[..5]);
    bytes
});

static COUNTER: Lazy<AtomicU32> = Lazy::new(|| {
    let seed = Uuid::new_v4().as_u128() as u32;
    AtomicU32::new(seed & 0x00FF_FFFF)
});

/// Twelve-byte document identifier, rendered as 24 lowercase hex characters.
///
/// Layout: 4-byte big-endian creation time in seconds, 5 process-unique random
/// bytes, 3-byte wrapping counter. The all-zero value is the nil identifier and
/// is what `Default` returns.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ObjectId([u8; 12]);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid object id {input:?}: expected {OBJECT_ID_HEX_LEN} hexadecimal characters")]
pub struct ObjectIdError {
    pub input: String,
}

impl ObjectId {
    pub const NIL: ObjectId = ObjectId([0u8; 12]);

    /// Generates a fresh identifier stamped with the current time.
    pub fn generate() -> Self {
        let secs = Utc::now().timestamp() as u32;
        let count = COUNTER.fetch_add(1, Ordering::Relaxed) & 0x00FF_FFFF;

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(&*PROCESS_UNIQUE);
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
        Self(bytes)
    }

    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    pub const fn bytes(&self) -> [u8; 12] {
        self.0
    }

    /// Parses the 24-character hexadecimal form. Upper and lower case are accepted.
    pub fn parse_str(input: &str) -> Result<Self, ObjectIdError> {
        if input.len() != OBJECT_ID_HEX_LEN {
            return Err(ObjectIdError { input: input.to_string() });
        }
        let mut bytes = [0u8; 12];
        hex::decode_to_slice(input, &mut bytes).map_err(|_| ObjectIdError { input: input.to_string() })?;
        Ok(Self(bytes))
    }

    pub fn is_nil(&self) -> bool {
        self.0 == [0u8; 12]
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Creation time encoded in the leading four bytes.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let secs = u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]]);
        DateTime::from_timestamp(i64::from(secs), 0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = ObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        ObjectId::parse_str(&raw).map_err(de::Error::custom)
    }
}
