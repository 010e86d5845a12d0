//! Auth Port
//!
//! Bearer 資格情報を検証してユーザー ID を得るためのインターフェース。

use super::{AuthError, UserId};

/// 資格情報の発行・検証
#[cfg_attr(test, mockall::automock)]
pub trait Authenticator: Send + Sync {
    /// 資格情報を検証し、ユーザー ID を返す
    ///
    /// `Bearer ` プレフィックス付きの値も受け付ける。
    fn verify(&self, token: &str) -> Result<UserId, AuthError>;

    /// ユーザー用の資格情報を発行
    fn issue(&self, user_id: UserId) -> Result<String, AuthError>;
}
