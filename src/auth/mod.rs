/// Session authentication
///
/// Token signing and validation, the session cookie pair, and the request
/// extractors that gate protected handlers.

pub mod cookies;
pub mod extract;
pub mod token;

pub use extract::{AuthUser, MaybeAuthUser};
pub use token::{Claims, TokenCodec};
