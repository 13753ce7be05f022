/// Background task implementations
use crate::{context::AppContext, error::ApiResult};

/// Delete expired and spent password reset tokens
pub async fn sweep_reset_tokens(ctx: &AppContext) -> ApiResult<u64> {
    ctx.recovery.sweep_expired().await
}
