// ── Element passes ──
//
// The loop shape shared by every relationship fetch and every publish:
// walk a collection in file order, keep each element's failure to itself,
// allow up to N requests in flight, and stop dispatching once cancelled.

use std::future::Future;

use futures_util::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;

/// Run `op` over `items`, at most `width` at a time.
///
/// Results come back in input order. Items not yet dispatched when `cancel`
/// fires yield `None`; work already in flight is allowed to finish so no
/// element is left half-done.
pub(crate) async fn run_ordered<T, R, F, Fut>(
    items: Vec<T>,
    width: usize,
    cancel: &CancellationToken,
    op: F,
) -> Vec<Option<R>>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = R>,
{
    stream::iter(items)
        .map(|item| {
            let pending = (!cancel.is_cancelled()).then(|| op(item));
            async move {
                match pending {
                    Some(fut) => Some(fut.await),
                    None => None,
                }
            }
        })
        .buffered(width.max(1))
        .collect()
        .await
}
