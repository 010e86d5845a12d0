//! Value Objects
//!
//! 識別子・メッセージ本文・時刻など、不変で自己検証する値を定義します。

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValueObjectError;

/// メッセージ本文の最大文字数
pub const MESSAGE_CONTENT_MAX_CHARS: usize = 4000;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub fn new(value: u64) -> Self {
                Self(value)
            }

            pub fn value(&self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl std::str::FromStr for $name {
            type Err = ValueObjectError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<u64>()
                    .map(Self)
                    .map_err(|_| ValueObjectError::InvalidId {
                        kind: $label,
                        raw: s.to_string(),
                    })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// チャットルームの識別子
    RoomId,
    "room_id"
);
numeric_id!(
    /// ユーザーの識別子（Auth Port が発行する）
    UserId,
    "user_id"
);
numeric_id!(
    /// メッセージの識別子（Persistence Port が単調増加で採番する）
    MessageId,
    "message_id"
);

/// WebSocket セッションの識別子
///
/// 同じユーザーが同じルームに複数接続しても、セッションごとに別の ID を持つ。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// 新しいセッション ID を生成
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// メッセージ本文
///
/// 文字数の上限のみを検証する。空文字列は添付ファイル付きメッセージで使われるため
/// ここでは許可し、空本文かつ添付なしの判定は `NewMessage` 側で行う。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MessageContent(String);

impl MessageContent {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let chars = value.chars().count();
        if chars > MESSAGE_CONTENT_MAX_CHARS {
            return Err(ValueObjectError::ContentTooLong {
                max: MESSAGE_CONTENT_MAX_CHARS,
                actual: chars,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// 本文中の `@name` から宛先のユーザー名を取り出す
    ///
    /// 名前は ASCII の英数字と `_` の並び。重複は最初の出現だけを残す。
    pub fn mentions(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for (i, _) in self.0.match_indices('@') {
            let name: String = self.0[i + 1..]
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
                .collect();
            if !name.is_empty() && !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

impl TryFrom<String> for MessageContent {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MessageContent> for String {
    fn from(content: MessageContent) -> Self {
        content.0
    }
}

/// Unix timestamp (milliseconds, UTC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// RFC 3339 形式（クライアントに送る固定フォーマット）
    pub fn to_rfc3339(&self) -> String {
        tsudoi_shared::time::timestamp_to_rfc3339(self.0)
    }
}
