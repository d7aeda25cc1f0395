//! Backend worker: a dedicated thread owning a tokio runtime that executes
//! queued commands one at a time.

use std::{
    sync::Arc,
    thread::{self, JoinHandle},
};

use client_core::MarketplaceApi;
use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::backend_bridge::commands::{BackendCommand, BackendEvent};

/// Starts the worker. It stops once every command sender is dropped.
pub fn launch(
    api: Arc<dyn MarketplaceApi>,
    cmd_rx: Receiver<BackendCommand>,
    event_tx: Sender<BackendEvent>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                post(
                    &event_tx,
                    BackendEvent::WorkerFailed(format!(
                        "backend worker startup failure: failed to build runtime: {err}"
                    )),
                );
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            tracing::debug!("backend worker started");
            while let Ok(cmd) = cmd_rx.recv() {
                let cmd_name = cmd.name();
                let event = execute(api.as_ref(), cmd).await;
                tracing::debug!(command = cmd_name, "backend command finished");
                post(&event_tx, event);
            }
            tracing::debug!("command channel closed; backend worker exiting");
        });
    })
}

async fn execute(api: &dyn MarketplaceApi, cmd: BackendCommand) -> BackendEvent {
    match cmd {
        BackendCommand::Login {
            ticket,
            credentials,
            remember,
        } => BackendEvent::LoginFinished {
            ticket,
            result: api.login(&credentials, remember).await,
        },
        BackendCommand::LoadCategories => {
            BackendEvent::CategoriesLoaded(api.fetch_categories().await)
        }
        BackendCommand::LoadProfile => BackendEvent::ProfileLoaded(api.fetch_profile().await),
        BackendCommand::SubmitChildren { ticket, children } => BackendEvent::ChildrenSubmitted {
            ticket,
            result: api.put_children(&children).await,
        },
        BackendCommand::UpdateProfile { ticket, info } => BackendEvent::ProfileUpdated {
            ticket,
            result: api.update_profile(&info).await,
        },
    }
}

fn post(event_tx: &Sender<BackendEvent>, event: BackendEvent) {
    match event_tx.try_send(event) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) => {
            tracing::warn!("ui event queue is full; dropping backend result");
        }
        Err(TrySendError::Disconnected(_)) => {
            tracing::debug!("ui side is gone; dropping backend result");
        }
    }
}
