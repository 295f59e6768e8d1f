use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandError, CommandParser};
use crate::frame::Frame;
use crate::store::{Store, Value};

/// Returns 1 if `member` is a member of the set stored at `key`, 0 otherwise.
///
/// Ref: <https://redis.io/docs/latest/commands/sismember/>
#[derive(Debug, PartialEq)]
pub struct SIsMember {
    pub key: Bytes,
    pub member: Bytes,
}

impl Executable for SIsMember {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        let found = match store.get(&self.key) {
            Some(Value::Set(set)) => set.contains(&self.member),
            Some(_) => return Err(CommandError::WrongType),
            None => false,
        };

        Ok(Frame::Integer(found as i64))
    }
}

impl TryFrom<&mut CommandParser> for SIsMember {
    type Error = CommandError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_bytes()?;
        let member = parser.next_bytes()?;
        parser.finish()?;

        Ok(Self { key, member })
    }
}
