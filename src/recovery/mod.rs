/// Password recovery
///
/// Single-use, time-limited reset tokens: issued on request, redeemed at
/// most once, and garbage-collected hourly by the background sweep.

mod manager;

pub use manager::PasswordResetManager;
