use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;
use crate::store::{Store, Value};

/// Sets the specified fields to their respective values in the hash stored at `key`, creating
/// the hash when needed. Returns the number of fields that were added.
///
/// Ref: <https://redis.io/docs/latest/commands/hset/>
#[derive(Debug, PartialEq)]
pub struct HSet {
    pub key: Bytes,
    pub pairs: Vec<(Bytes, Bytes)>,
}

impl Executable for HSet {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let hash = match store.get_or_insert_with(&self.key, Value::empty_hash) {
            Value::Hash(hash) => hash,
            _ => return Err(CommandError::WrongType),
        };

        let added = self
            .pairs
            .into_iter()
            .map(|(field, value)| hash.set(field, value))
            .filter(|&added| added)
            .count();

        Ok(Frame::Integer(added as i64))
    }
}

impl TryFrom<&mut CommandParser> for HSet {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let pairs = parser.pairs()?;

        Ok(Self { key, pairs })
    }
}
