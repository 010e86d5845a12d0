//! Auth Port の実装

pub mod jwt;

pub use jwt::JwtAuthenticator;
