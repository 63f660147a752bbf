pub mod client_config;
pub mod json_error;
pub mod login;
pub mod notify;
pub mod session;
pub mod sync;
pub mod update;

pub use self::client_config::{ClientConfig, ConfigError};
pub use self::json_error::ApiErrorBody;
pub use self::login::{LoginRequest, LoginResponse, UserInfo};
pub use self::notify::{NotifyDomain, NotifyRequest};
pub use self::session::{Role, SessionData};
pub use self::update::{ChannelUpdate, SubscribeMessage, UpdateBatch};
