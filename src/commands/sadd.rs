use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;
use crate::store::{Store, Value};

/// Add the specified members to the set stored at `key`. Members already in the set are
/// ignored. If `key` does not exist, a new set is created before adding the members.
///
/// Returns the number of members that were added, not including those already present.
///
/// Ref: <https://redis.io/docs/latest/commands/sadd/>
#[derive(Debug, PartialEq)]
pub struct SAdd {
    pub key: Bytes,
    pub members: Vec<Bytes>,
}

impl Executable for SAdd {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let set = match store.get_or_insert_with(&self.key, Value::empty_set) {
            Value::Set(set) => set,
            _ => return Err(CommandError::WrongType),
        };

        Ok(Frame::Integer(set.add(self.members) as i64))
    }
}

impl TryFrom<&mut CommandParser> for SAdd {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let members = parser.remaining(1)?;

        Ok(Self { key, members })
    }
}
