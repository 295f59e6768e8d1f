//! Routes decoded requests to their command.
//!
//! The [`Dispatcher`] owns the name -> parser table, built once when it is created. Processing a
//! request never fails: every error becomes an error reply for the client.

use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::str;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::aof::CommandLog;
use crate::commands::del::Del;
use crate::commands::echo::Echo;
use crate::commands::executable::Executable;
use crate::commands::exists::Exists;
use crate::commands::get::Get;
use crate::commands::hdel::HDel;
use crate::commands::hget::HGet;
use crate::commands::hlen::HLen;
use crate::commands::hset::HSet;
use crate::commands::llen::LLen;
use crate::commands::lpop::LPop;
use crate::commands::lpush::LPush;
use crate::commands::ping::Ping;
use crate::commands::rpop::RPop;
use crate::commands::rpush::RPush;
use crate::commands::sadd::SAdd;
use crate::commands::scard::SCard;
use crate::commands::set::Set;
use crate::commands::sismember::SIsMember;
use crate::commands::srem::SRem;
use crate::commands::type_::Type;
use crate::commands::zadd::ZAdd;
use crate::commands::zcard::ZCard;
use crate::commands::zrem::ZRem;
use crate::commands::zscore::ZScore;
use crate::commands::{Command, CommandError, CommandParser};
use crate::frame::Frame;
use crate::store::Store;

type Handler = fn(&mut CommandParser) -> Result<Command, CommandError>;

pub struct Dispatcher {
    handlers: HashMap<&'static str, Handler>,
    log: Option<Arc<dyn CommandLog>>,
    /// Held across applying and logging a write so the log sees writes in the order applied.
    write_order: Mutex<()>,
}

impl Dispatcher {
    pub fn new() -> Dispatcher {
        let mut dispatcher = Dispatcher {
            handlers: HashMap::new(),
            log: None,
            write_order: Mutex::new(()),
        };

        dispatcher.register("PING", |p| Ping::try_from(p).map(Command::Ping));
        dispatcher.register("ECHO", |p| Echo::try_from(p).map(Command::Echo));

        dispatcher.register("SET", |p| Set::try_from(p).map(Command::Set));
        dispatcher.register("GET", |p| Get::try_from(p).map(Command::Get));
        dispatcher.register("DEL", |p| Del::try_from(p).map(Command::Del));
        dispatcher.register("EXISTS", |p| Exists::try_from(p).map(Command::Exists));
        dispatcher.register("TYPE", |p| Type::try_from(p).map(Command::Type));

        dispatcher.register("LPUSH", |p| LPush::try_from(p).map(Command::LPush));
        dispatcher.register("RPUSH", |p| RPush::try_from(p).map(Command::RPush));
        dispatcher.register("LPOP", |p| LPop::try_from(p).map(Command::LPop));
        dispatcher.register("RPOP", |p| RPop::try_from(p).map(Command::RPop));
        dispatcher.register("LLEN", |p| LLen::try_from(p).map(Command::LLen));

        dispatcher.register("HSET", |p| HSet::try_from(p).map(Command::HSet));
        dispatcher.register("HGET", |p| HGet::try_from(p).map(Command::HGet));
        dispatcher.register("HDEL", |p| HDel::try_from(p).map(Command::HDel));
        dispatcher.register("HLEN", |p| HLen::try_from(p).map(Command::HLen));

        dispatcher.register("SADD", |p| SAdd::try_from(p).map(Command::SAdd));
        dispatcher.register("SREM", |p| SRem::try_from(p).map(Command::SRem));
        dispatcher.register("SISMEMBER", |p| {
            SIsMember::try_from(p).map(Command::SIsMember)
        });
        dispatcher.register("SCARD", |p| SCard::try_from(p).map(Command::SCard));

        dispatcher.register("ZADD", |p| ZAdd::try_from(p).map(Command::ZAdd));
        dispatcher.register("ZSCORE", |p| ZScore::try_from(p).map(Command::ZScore));
        dispatcher.register("ZREM", |p| ZRem::try_from(p).map(Command::ZRem));
        dispatcher.register("ZCARD", |p| ZCard::try_from(p).map(Command::ZCard));

        dispatcher
    }

    /// Sends every successful write command to `log`.
    pub fn with_log(mut self, log: Arc<dyn CommandLog>) -> Dispatcher {
        self.log = Some(log);
        self
    }

    fn register(&mut self, name: &'static str, handler: Handler) {
        self.handlers.insert(name, handler);
    }

    /// Parses a request frame into a command, validating its arguments.
    pub fn parse(&self, frame: Frame) -> Result<Command, CommandError> {
        let parts = arguments(frame)?;
        self.parse_parts(parts)
    }

    /// Runs a request against `store` and returns the reply to send back.
    pub fn process(&self, frame: Frame, store: &Store) -> Frame {
        let reply = arguments(frame).and_then(|parts| {
            // Only write commands are logged, so keep the raw arguments around for them.
            let logged = self.log.as_ref().map(|_| parts.clone());
            let command = self.parse_parts(parts)?;

            match (&self.log, logged) {
                (Some(log), Some(parts)) if command.is_write() => {
                    let _guard = self.write_order.lock();
                    let reply = command.exec(store.clone())?;
                    log.append(&parts);
                    Ok(reply)
                }
                _ => command.exec(store.clone()),
            }
        });

        reply.unwrap_or_else(|err| {
            debug!(error = %err, "command failed");
            // Error replies are line based, client supplied names must not break the line.
            Frame::Error(err.to_string().replace(['\r', '\n'], " "))
        })
    }

    /// Re-executes previously logged commands against `store` without logging them again.
    /// Returns how many of them succeeded.
    pub fn replay<I>(&self, commands: I, store: &Store) -> usize
    where
        I: IntoIterator<Item = Vec<Bytes>>,
    {
        let mut replayed = 0;

        for parts in commands {
            let result = self
                .parse_parts(parts)
                .and_then(|command| command.exec(store.clone()));

            match result {
                Ok(_) => replayed += 1,
                Err(err) => warn!(error = %err, "failed to replay command, skipping"),
            }
        }

        info!(replayed, "replayed logged commands");
        replayed
    }

    fn parse_parts(&self, mut parts: Vec<Bytes>) -> Result<Command, CommandError> {
        if parts.is_empty() {
            return Err(CommandError::Protocol("empty command".to_string()));
        }

        let name = parts.remove(0);
        let name = String::from_utf8_lossy(&name);

        let handler = self
            .handlers
            .get(name.to_uppercase().as_str())
            .ok_or_else(|| CommandError::UnknownCommand {
                command: name.to_string(),
            })?;

        let parser = &mut CommandParser::new(&name, parts);
        handler(parser)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Clients send commands as non-empty arrays of bulk (or simple) strings.
fn arguments(frame: Frame) -> Result<Vec<Bytes>, CommandError> {
    let frames = match frame {
        Frame::Array(frames) if !frames.is_empty() => frames,
        Frame::Array(_) => return Err(CommandError::Protocol("empty command".to_string())),
        _ => {
            return Err(CommandError::Protocol(
                "expected an array of bulk strings".to_string(),
            ))
        }
    };

    frames
        .into_iter()
        .map(|frame| match frame {
            Frame::Bulk(bytes) => Ok(bytes),
            Frame::Simple(s) => Ok(Bytes::from(s)),
            _ => Err(CommandError::Protocol(
                "expected bulk string arguments".to_string(),
            )),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aof::MemoryLog;
    use crate::commands::request;
    use crate::store::Value;
    use std::thread;

    #[test]
    fn unknown_command() {
        let dispatcher = Dispatcher::new();

        assert_eq!(
            dispatcher.parse(request(&["FLUSHALL"])),
            Err(CommandError::UnknownCommand {
                command: "FLUSHALL".to_string()
            })
        );
    }

    #[test]
    fn names_are_case_insensitive() {
        let dispatcher = Dispatcher::new();

        assert!(dispatcher.parse(request(&["get", "k"])).is_ok());
        assert!(dispatcher.parse(request(&["GeT", "k"])).is_ok());
    }

    #[test]
    fn non_array_request() {
        let dispatcher = Dispatcher::new();

        assert!(matches!(
            dispatcher.parse(Frame::Bulk(Bytes::from("PING"))),
            Err(CommandError::Protocol(_))
        ));
        assert!(matches!(
            dispatcher.parse(Frame::Array(vec![])),
            Err(CommandError::Protocol(_))
        ));
        assert!(matches!(
            dispatcher.parse(Frame::Array(vec![
                Frame::Bulk(Bytes::from("GET")),
                Frame::Integer(1),
            ])),
            Err(CommandError::Protocol(_))
        ));
    }

    #[tokio::test]
    async fn errors_become_replies() {
        let dispatcher = Dispatcher::new();
        let store = Store::new();

        assert_eq!(
            dispatcher.process(request(&["DEL"]), &store),
            Frame::Error("ERR wrong number of arguments for 'del' command".to_string())
        );
        assert_eq!(
            dispatcher.process(request(&["NOPE"]), &store),
            Frame::Error("ERR unknown command 'NOPE'".to_string())
        );

        dispatcher.process(request(&["LPUSH", "k", "a"]), &store);
        assert_eq!(
            dispatcher.process(request(&["GET", "k"]), &store),
            Frame::Error(
                "WRONGTYPE Operation against a key holding the wrong kind of value".to_string()
            )
        );
    }

    #[tokio::test]
    async fn error_replies_stay_on_one_line() {
        let dispatcher = Dispatcher::new();
        let store = Store::new();

        assert_eq!(
            dispatcher.process(request(&["BAD\r\nNAME"]), &store),
            Frame::Error("ERR unknown command 'BAD  NAME'".to_string())
        );
    }

    #[tokio::test]
    async fn logs_successful_writes_only() {
        let log = Arc::new(MemoryLog::new());
        let dispatcher = Dispatcher::new().with_log(log.clone());
        let store = Store::new();

        dispatcher.process(request(&["SET", "k", "v"]), &store);
        dispatcher.process(request(&["GET", "k"]), &store);
        dispatcher.process(request(&["LPUSH", "k", "a"]), &store);
        dispatcher.process(request(&["SADD", "s", "a"]), &store);

        assert_eq!(
            log.entries(),
            vec![
                vec![Bytes::from("SET"), Bytes::from("k"), Bytes::from("v")],
                vec![Bytes::from("SADD"), Bytes::from("s"), Bytes::from("a")],
            ]
        );
    }

    #[tokio::test]
    async fn replay_rebuilds_store() {
        let log = Arc::new(MemoryLog::new());
        let dispatcher = Dispatcher::new().with_log(log.clone());
        let store = Store::new();

        dispatcher.process(request(&["RPUSH", "l", "a", "b"]), &store);
        dispatcher.process(request(&["ZADD", "z", "1", "m"]), &store);
        dispatcher.process(request(&["LPOP", "l"]), &store);

        let restored = Store::new();
        let replayed = Dispatcher::new().replay(log.entries(), &restored);

        assert_eq!(replayed, 3);
        assert_eq!(
            dispatcher.process(request(&["LLEN", "l"]), &restored),
            Frame::Integer(1)
        );
        assert_eq!(
            dispatcher.process(request(&["ZSCORE", "z", "m"]), &restored),
            Frame::Bulk(Bytes::from("1"))
        );
        // Replaying does not feed the log again.
        assert_eq!(log.len(), 3);
    }

    #[tokio::test]
    async fn replay_skips_failing_commands() {
        let store = Store::new();
        let commands = vec![
            vec![Bytes::from("SET"), Bytes::from("k"), Bytes::from("v")],
            vec![Bytes::from("LPUSH"), Bytes::from("k"), Bytes::from("a")],
            vec![Bytes::from("BOGUS")],
        ];

        assert_eq!(Dispatcher::new().replay(commands, &store), 1);
    }

    fn list_contents(store: &Store, key: &[u8]) -> Vec<Bytes> {
        match store.get(key) {
            Some(Value::List(list)) => list.to_vec(),
            other => panic!("unexpected value: {:?}", other),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn log_order_matches_apply_order() {
        const THREADS: usize = 4;
        const WRITES: usize = 200;

        let log = Arc::new(MemoryLog::new());
        let dispatcher = Dispatcher::new().with_log(log.clone());
        let store = Store::new();

        thread::scope(|scope| {
            for t in 0..THREADS {
                let dispatcher = &dispatcher;
                let store = &store;
                scope.spawn(move || {
                    for i in 0..WRITES {
                        let value = format!("{}-{}", t, i);
                        dispatcher.process(request(&["RPUSH", "l", &value]), store);
                        dispatcher.process(request(&["SET", "k", &value]), store);
                    }
                });
            }
        });

        let restored = Store::new();
        let replayed = Dispatcher::new().replay(log.entries(), &restored);

        assert_eq!(replayed, THREADS * WRITES * 2);
        assert_eq!(list_contents(&restored, b"l"), list_contents(&store, b"l"));
        assert_eq!(
            dispatcher.process(request(&["GET", "k"]), &restored),
            dispatcher.process(request(&["GET", "k"]), &store)
        );
    }
}
