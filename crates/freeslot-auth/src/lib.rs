pub mod google;
pub mod oauth;
pub mod provider;
pub mod storage;

pub use google::{GoogleOAuth2Provider, GOOGLE_SERVICE_ID};
pub use oauth::{OAuth2Config, OAuth2Provider};
pub use provider::{GoogleTokenProvider, StaticTokenProvider, TokenProvider};
pub use storage::{TokenSet, TokenStore};
