pub mod config;
pub mod cookie;
pub mod cookie_parser;
pub mod exception;
pub mod jar;
pub mod middleware;
pub mod param;
pub mod request;
pub mod response;
pub mod util;

pub use config::Config;
pub use cookie::{Cookie, SameSite};
pub use cookie_parser::{CookieContext, CookieParser};
pub use exception::Exception;
pub use jar::CookieJar;
pub use middleware::{ContextRegistry, Handler, Middleware, Pipeline};
pub use param::{HttpRequestMethod, HttpVersion};
pub use request::Request;
pub use response::Response;
pub use util::http_date;
