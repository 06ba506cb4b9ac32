use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::DriverError;

/// Race `fut` against `ctx`. A token that is already cancelled short-circuits
/// before the engine is touched; a later cancellation drops the engine future.
pub(crate) async fn run<T, F>(ctx: &CancellationToken, fut: F) -> Result<T, DriverError>
where
    F: Future<Output = Result<T, DriverError>>,
{
    if ctx.is_cancelled() {
        return Err(DriverError::Cancelled);
    }
    tokio::select! {
        biased;
        () = ctx.cancelled() => Err(DriverError::Cancelled),
        res = fut => res,
    }
}
