use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;
use crate::store::{Store, Value};

/// Remove the specified members from the set stored at `key`.
///
/// Ref: <https://redis.io/docs/latest/commands/srem/>
#[derive(Debug, PartialEq)]
pub struct SRem {
    pub key: Bytes,
    pub members: Vec<Bytes>,
}

impl Executable for SRem {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let removed = match store.get(&self.key) {
            Some(Value::Set(set)) => set.remove(&self.members),
            Some(_) => return Err(CommandError::WrongType),
            None => 0,
        };

        Ok(Frame::Integer(removed as i64))
    }
}

impl TryFrom<&mut CommandParser> for SRem {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let members = parser.remaining(1)?;

        Ok(Self { key, members })
    }
}
