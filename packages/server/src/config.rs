//! Command-line / environment configuration.

use clap::Parser;

use crate::domain::UserId;

/// Secret used when none is configured. Only suitable for local development.
pub const DEV_JWT_SECRET: &str = "tsudoi-dev-secret";

/// Upper bound of `--token-ttl-secs` (one year)
pub const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;

/// Display name registered at startup (`--user 1=alice`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSeed {
    pub id: UserId,
    pub name: String,
}

fn parse_user_seed(raw: &str) -> Result<UserSeed, String> {
    let (id, name) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ID=NAME, got '{}'", raw))?;
    let id = id.parse::<UserId>().map_err(|e| e.to_string())?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("display name for user {} is empty", id));
    }
    Ok(UserSeed {
        id,
        name: name.to_string(),
    })
}

#[derive(Parser, Debug, Clone)]
#[command(name = "tsudoi-server")]
#[command(about = "Real-time delivery server for room-based chat", long_about = None)]
pub struct ServerConfig {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "TSUDOI_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "TSUDOI_PORT", default_value = "8080")]
    pub port: u16,

    /// HS256 secret for bearer tokens
    #[arg(long, env = "TSUDOI_JWT_SECRET", default_value = DEV_JWT_SECRET, hide_env_values = true)]
    pub jwt_secret: String,

    /// Lifetime of issued tokens, in seconds (1 to one year)
    #[arg(
        long,
        env = "TSUDOI_TOKEN_TTL_SECS",
        default_value = "86400",
        value_parser = clap::value_parser!(i64).range(1..=MAX_TOKEN_TTL_SECS)
    )]
    pub token_ttl_secs: i64,

    /// Events that may wait in the dispatcher queue before producers are held back
    ///
    /// The default of 1024 is a provisional choice. No overload limit has been
    /// decided yet, so producers simply wait while the queue is full.
    #[arg(long, env = "TSUDOI_DISPATCH_QUEUE_CAPACITY", default_value = "1024")]
    pub dispatch_queue_capacity: usize,

    /// Envelopes buffered per session before it is dropped as too slow
    #[arg(long, env = "TSUDOI_SESSION_BUFFER", default_value = "64")]
    pub session_buffer: usize,

    /// Display name of a user, as ID=NAME (repeatable)
    #[arg(long = "user", value_name = "ID=NAME", value_parser = parse_user_seed)]
    pub users: Vec<UserSeed>,

    /// Print a token for the given user ID and exit
    #[arg(long, value_name = "USER_ID")]
    pub issue_token: Option<u64>,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, env = "TSUDOI_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "TSUDOI_JSON_LOGS")]
    pub json_logs: bool,
}

impl ServerConfig {
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::try_parse_from(["tsudoi-server"]).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.dispatch_queue_capacity, 1024);
        assert_eq!(config.session_buffer, 64);
        assert!(config.users.is_empty());
        assert!(config.uses_dev_secret());
    }

    #[test]
    fn test_user_seeds() {
        // テスト項目: --user を繰り返し指定できる
        // given (前提条件):
        let args = ["tsudoi-server", "--user", "1=alice", "--user", "2= bob "];

        // when (操作):
        let config = ServerConfig::try_parse_from(args).unwrap();

        // then (期待する結果):
        assert_eq!(
            config.users,
            vec![
                UserSeed {
                    id: UserId::new(1),
                    name: "alice".to_string(),
                },
                UserSeed {
                    id: UserId::new(2),
                    name: "bob".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_token_ttl_is_bounded() {
        // テスト項目: 0 以下や上限超えの有効期限は起動時に拒否される
        // given (前提条件):
        let parse =
            |raw: &str| ServerConfig::try_parse_from(["tsudoi-server", "--token-ttl-secs", raw]);

        // when (操作) / then (期待する結果):
        assert_eq!(parse("60").unwrap().token_ttl_secs, 60);
        assert_eq!(
            parse(MAX_TOKEN_TTL_SECS.to_string().as_str()).unwrap().token_ttl_secs,
            MAX_TOKEN_TTL_SECS
        );
        for raw in ["0", "-5", "9223372036854775807"] {
            assert!(parse(raw).is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn test_invalid_user_seed() {
        for raw in ["alice", "x=alice", "1="] {
            assert!(
                ServerConfig::try_parse_from(["tsudoi-server", "--user", raw]).is_err(),
                "{raw} should be rejected"
            );
        }
    }
}
