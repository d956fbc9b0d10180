use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::event::ApmEvent;

/// An ordered collection of events. Insertion order is processing order.
pub type Batch = Vec<ApmEvent>;

/// Processes a batch of events, with the opportunity to modify, add or remove events.
///
/// Callers must not assume the batch is still valid once `process_batch` has returned. A
/// processor that needs to keep events around, or work on them asynchronously, has to copy
/// them first. Errors are opaque to callers and are propagated as-is.
#[async_trait]
pub trait BatchProcessor: Send + Sync {
    async fn process_batch(
        &self,
        cancel: &CancellationToken,
        batch: &mut Batch,
    ) -> anyhow::Result<()>;
}

/// Adapts a synchronous function into a [`BatchProcessor`].
pub struct ProcessBatchFn<F>(pub F);

#[async_trait]
impl<F> BatchProcessor for ProcessBatchFn<F>
where
    F: Fn(&CancellationToken, &mut Batch) -> anyhow::Result<()> + Send + Sync,
{
    async fn process_batch(
        &self,
        cancel: &CancellationToken,
        batch: &mut Batch,
    ) -> anyhow::Result<()> {
        (self.0)(cancel, batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::Processor;

    #[tokio::test]
    async fn process_batch_fn_can_rewrite_batch() {
        let processor = ProcessBatchFn(
            |_: &CancellationToken, batch: &mut Batch| -> anyhow::Result<()> {
                batch.retain(|e| e.processor.as_ref().is_some_and(Processor::is_span));
                batch.push(ApmEvent {
                    processor: Some(Processor::log()),
                    ..Default::default()
                });
                Ok(())
            },
        );

        let mut batch = vec![
            ApmEvent {
                processor: Some(Processor::transaction()),
                ..Default::default()
            },
            ApmEvent {
                processor: Some(Processor::span()),
                ..Default::default()
            },
        ];
        processor
            .process_batch(&CancellationToken::new(), &mut batch)
            .await
            .unwrap();

        let kinds: Vec<_> = batch
            .iter()
            .map(|e| e.processor.clone().unwrap())
            .collect();
        assert_eq!(kinds, vec![Processor::span(), Processor::log()]);
    }

    #[tokio::test]
    async fn errors_are_propagated_unchanged() {
        let processor = ProcessBatchFn(
            |_: &CancellationToken, _: &mut Batch| -> anyhow::Result<()> {
                Err(anyhow::anyhow!("queue full"))
            },
        );
        let err = processor
            .process_batch(&CancellationToken::new(), &mut Vec::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "queue full");
    }
}
