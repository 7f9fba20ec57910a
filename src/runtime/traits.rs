//! Observer abstraction for emitted steps
//!
//! The session awaits `on_step` before acting on the step, so observers see
//! steps in order and before the next model request.

use crate::step::Step;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Receives every step emitted during a run
#[async_trait]
pub trait StepObserver: Send + Sync {
    async fn on_step(&self, step: &Step);
}

#[async_trait]
impl<T: StepObserver + ?Sized> StepObserver for Arc<T> {
    async fn on_step(&self, step: &Step) {
        (**self).on_step(step).await;
    }
}

/// Event channel; a closed receiver is ignored
#[async_trait]
impl StepObserver for mpsc::UnboundedSender<Step> {
    async fn on_step(&self, step: &Step) {
        if self.send(step.clone()).is_err() {
            tracing::debug!("Step receiver dropped");
        }
    }
}

/// Bounded event channel; waits for capacity, which applies backpressure
/// to the run
#[async_trait]
impl StepObserver for mpsc::Sender<Step> {
    async fn on_step(&self, step: &Step) {
        if self.send(step.clone()).await.is_err() {
            tracing::debug!("Step receiver dropped");
        }
    }
}

/// Adapter for plain synchronous callbacks
pub struct FnObserver<F>(pub F);

#[async_trait]
impl<F> StepObserver for FnObserver<F>
where
    F: Fn(&Step) + Send + Sync,
{
    async fn on_step(&self, step: &Step) {
        (self.0)(step);
    }
}
