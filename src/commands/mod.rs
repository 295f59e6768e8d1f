pub mod del;
pub mod echo;
pub mod executable;
pub mod exists;
pub mod get;
pub mod hdel;
pub mod hget;
pub mod hlen;
pub mod hset;
pub mod llen;
pub mod lpop;
pub mod lpush;
pub mod ping;
pub mod rpop;
pub mod rpush;
pub mod sadd;
pub mod scard;
pub mod set;
pub mod sismember;
pub mod srem;
pub mod type_;
pub mod zadd;
pub mod zcard;
pub mod zrem;
pub mod zscore;

use bytes::Bytes;
use itertools::Itertools;
use std::vec;
use thiserror::Error as ThisError;

use crate::commands::executable::Executable;
use crate::frame::Frame;
use crate::store::Store;

use del::Del;
use echo::Echo;
use exists::Exists;
use get::Get;
use hdel::HDel;
use hget::HGet;
use hlen::HLen;
use hset::HSet;
use llen::LLen;
use lpop::LPop;
use lpush::LPush;
use ping::Ping;
use rpop::RPop;
use rpush::RPush;
use sadd::SAdd;
use scard::SCard;
use set::Set;
use sismember::SIsMember;
use srem::SRem;
use type_::Type;
use zadd::ZAdd;
use zcard::ZCard;
use zrem::ZRem;
use zscore::ZScore;

#[derive(Debug, PartialEq)]
pub enum Command {
    Del(Del),
    Exists(Exists),
    Get(Get),
    Set(Set),
    Type(Type),

    LLen(LLen),
    LPop(LPop),
    LPush(LPush),
    RPop(RPop),
    RPush(RPush),

    HDel(HDel),
    HGet(HGet),
    HLen(HLen),
    HSet(HSet),

    SAdd(SAdd),
    SCard(SCard),
    SIsMember(SIsMember),
    SRem(SRem),

    ZAdd(ZAdd),
    ZCard(ZCard),
    ZRem(ZRem),
    ZScore(ZScore),

    Echo(Echo),
    Ping(Ping),
}

impl Command {
    /// Whether a successful run of the command changes the keyspace.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Command::Del(_)
                | Command::Set(_)
                | Command::LPop(_)
                | Command::LPush(_)
                | Command::RPop(_)
                | Command::RPush(_)
                | Command::HDel(_)
                | Command::HSet(_)
                | Command::SAdd(_)
                | Command::SRem(_)
                | Command::ZAdd(_)
                | Command::ZRem(_)
        )
    }
}

impl Executable for Command {
    fn exec(self, store: Store) -> Result<Frame, CommandError> {
        match self {
            Command::Del(cmd) => cmd.exec(store),
            Command::Echo(cmd) => cmd.exec(store),
            Command::Exists(cmd) => cmd.exec(store),
            Command::Get(cmd) => cmd.exec(store),
            Command::HDel(cmd) => cmd.exec(store),
            Command::HGet(cmd) => cmd.exec(store),
            Command::HLen(cmd) => cmd.exec(store),
            Command::HSet(cmd) => cmd.exec(store),
            Command::LLen(cmd) => cmd.exec(store),
            Command::LPop(cmd) => cmd.exec(store),
            Command::LPush(cmd) => cmd.exec(store),
            Command::Ping(cmd) => cmd.exec(store),
            Command::RPop(cmd) => cmd.exec(store),
            Command::RPush(cmd) => cmd.exec(store),
            Command::SAdd(cmd) => cmd.exec(store),
            Command::SCard(cmd) => cmd.exec(store),
            Command::Set(cmd) => cmd.exec(store),
            Command::SIsMember(cmd) => cmd.exec(store),
            Command::SRem(cmd) => cmd.exec(store),
            Command::Type(cmd) => cmd.exec(store),
            Command::ZAdd(cmd) => cmd.exec(store),
            Command::ZCard(cmd) => cmd.exec(store),
            Command::ZRem(cmd) => cmd.exec(store),
            Command::ZScore(cmd) => cmd.exec(store),
        }
    }
}

/// Hands out the arguments of a single request, reporting an arity error in the name of the
/// command whenever the caller asks for more (or fewer) than were sent.
pub struct CommandParser {
    command: String,
    parts: vec::IntoIter<Bytes>,
}

impl CommandParser {
    pub(crate) fn new(command: &str, parts: Vec<Bytes>) -> CommandParser {
        CommandParser {
            command: command.to_lowercase(),
            parts: parts.into_iter(),
        }
    }

    fn wrong_number_of_arguments(&self) -> CommandError {
        CommandError::WrongNumberOfArguments {
            command: self.command.clone(),
        }
    }

    fn next_bytes(&mut self) -> Result<Bytes, CommandError> {
        self.parts
            .next()
            .ok_or_else(|| self.wrong_number_of_arguments())
    }

    fn next_optional(&mut self) -> Option<Bytes> {
        self.parts.next()
    }

    /// Takes every argument left, failing unless there are at least `min` of them.
    fn remaining(&mut self, min: usize) -> Result<Vec<Bytes>, CommandError> {
        let rest: Vec<Bytes> = self.parts.by_ref().collect();
        if rest.len() < min {
            return Err(self.wrong_number_of_arguments());
        }
        Ok(rest)
    }

    /// Takes every argument left as a non-empty sequence of pairs.
    fn pairs(&mut self) -> Result<Vec<(Bytes, Bytes)>, CommandError> {
        if self.parts.len() == 0 || self.parts.len() % 2 != 0 {
            return Err(self.wrong_number_of_arguments());
        }
        Ok(self.parts.by_ref().tuples().collect())
    }

    /// Fails if any argument was left unread.
    fn finish(&mut self) -> Result<(), CommandError> {
        if self.parts.len() > 0 {
            return Err(self.wrong_number_of_arguments());
        }
        Ok(())
    }

    fn command(&self) -> &str {
        &self.command
    }
}

/// Errors a command reports back to the client. The `Display` text is the error reply.
#[derive(Debug, ThisError, PartialEq)]
pub enum CommandError {
    #[error("ERR wrong number of arguments for '{command}' command")]
    WrongNumberOfArguments { command: String },
    #[error("ERR syntax error")]
    Syntax,
    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongType,
    #[error("ERR value is not a valid float")]
    NotAFloat,
    #[error("ERR invalid expire time in '{command}' command")]
    InvalidExpireTime { command: String },
    #[error("ERR unknown command '{command}'")]
    UnknownCommand { command: String },
    #[error("ERR Protocol error: {0}")]
    Protocol(String),
}

/// Parses a sorted set score. Infinities are accepted, NaN is not.
fn parse_score(bytes: &[u8]) -> Result<f64, CommandError> {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|score| !score.is_nan())
        .ok_or(CommandError::NotAFloat)
}

#[cfg(test)]
pub(crate) fn request(parts: &[&str]) -> Frame {
    Frame::Array(
        parts
            .iter()
            .map(|part| Frame::Bulk(Bytes::copy_from_slice(part.as_bytes())))
            .collect(),
    )
}

#[cfg(test)]
pub(crate) fn parse(frame: Frame) -> Result<Command, CommandError> {
    crate::dispatch::Dispatcher::new().parse(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_score_accepts_floats_and_infinities() {
        assert_eq!(parse_score(b"1.5"), Ok(1.5));
        assert_eq!(parse_score(b"-3"), Ok(-3.0));
        assert_eq!(parse_score(b"+inf"), Ok(f64::INFINITY));
        assert_eq!(parse_score(b"-inf"), Ok(f64::NEG_INFINITY));
    }

    #[test]
    fn parse_score_rejects_garbage() {
        assert_eq!(parse_score(b"abc"), Err(CommandError::NotAFloat));
        assert_eq!(parse_score(b"nan"), Err(CommandError::NotAFloat));
        assert_eq!(parse_score(b""), Err(CommandError::NotAFloat));
    }

    #[test]
    fn parser_reports_arity_with_command_name() {
        let mut parser = CommandParser::new("HSET", vec![Bytes::from("k"), Bytes::from("f")]);

        parser.next_bytes().unwrap();

        assert_eq!(
            parser.pairs(),
            Err(CommandError::WrongNumberOfArguments {
                command: "hset".to_string()
            })
        );
    }

    #[test]
    fn parser_finish_rejects_extra_arguments() {
        let mut parser = CommandParser::new("GET", vec![Bytes::from("a"), Bytes::from("b")]);

        parser.next_bytes().unwrap();

        assert!(parser.finish().is_err());
    }

    #[test]
    fn command_error_replies() {
        assert_eq!(
            CommandError::WrongNumberOfArguments {
                command: "del".to_string()
            }
            .to_string(),
            "ERR wrong number of arguments for 'del' command"
        );
        assert_eq!(
            CommandError::UnknownCommand {
                command: "FOO".to_string()
            }
            .to_string(),
            "ERR unknown command 'FOO'"
        );
        assert_eq!(
            CommandError::WrongType.to_string(),
            "WRONGTYPE Operation against a key holding the wrong kind of value"
        );
    }
}
