//! Concurrent fan-out/join primitive.
//!
//! Stage 1 and Stage 2 both fan one prompt out to every council member and
//! wait for all calls to settle, tolerating per-model failure. That pattern
//! is implemented once here, parameterized over the per-item operation and
//! the failure policy.

use std::future::Future;
use tokio::task::JoinSet;
use tracing::warn;

/// Run every future concurrently and wait for all of them to settle.
///
/// Results come back in input order regardless of completion order, so
/// downstream indexing stays deterministic. `recover` supplies a stand-in
/// result for a task that could not be joined (panicked or was aborted),
/// keeping the output length equal to the input length. `on_settled` fires
/// once per slot as it resolves, in completion order.
pub async fn settle_all<R, Fut>(
    futures: Vec<Fut>,
    recover: impl Fn(usize) -> R,
    mut on_settled: impl FnMut(usize, &R),
) -> Vec<R>
where
    Fut: Future<Output = R> + Send + 'static,
    R: Send + 'static,
{
    let total = futures.len();
    let mut join_set = JoinSet::new();
    for (index, future) in futures.into_iter().enumerate() {
        join_set.spawn(async move { (index, future.await) });
    }

    let mut slots: Vec<Option<R>> = std::iter::repeat_with(|| None).take(total).collect();
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((index, result)) => {
                on_settled(index, &result);
                slots[index] = Some(result);
            }
            Err(e) => warn!("fan-out task failed to join: {}", e),
        }
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.unwrap_or_else(|| {
                let result = recover(index);
                on_settled(index, &result);
                result
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_results_keep_input_order() {
        // Later items finish first; output order must still match input.
        let futures: Vec<_> = (0..4u64)
            .map(|i| async move {
                sleep(Duration::from_millis(40 - i * 10)).await;
                i
            })
            .collect();

        let results = settle_all(futures, |_| u64::MAX, |_, _| {}).await;
        assert_eq!(results, vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn test_on_settled_sees_every_slot() {
        let futures: Vec<_> = (0..3usize).map(|i| async move { i * 2 }).collect();

        let mut seen = Vec::new();
        let results = settle_all(futures, |_| 0, |index, value| seen.push((index, *value))).await;

        seen.sort();
        assert_eq!(seen, vec![(0, 0), (1, 2), (2, 4)]);
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn test_panicked_task_is_recovered() {
        let futures: Vec<_> = (0..3u32)
            .map(|i| async move {
                if i == 1 {
                    panic!("boom");
                }
                i
            })
            .collect();

        let results = settle_all(futures, |index| 100 + index as u32, |_, _| {}).await;
        assert_eq!(results, vec![0, 101, 2]);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let futures: Vec<std::future::Ready<u8>> = Vec::new();
        let results = settle_all(futures, |_| 0, |_, _| {}).await;
        assert!(results.is_empty());
    }
}
