//! Provider watcher.
//!
//! Background task that polls the node for its network version and active
//! account and publishes a [`ProviderEvent`] whenever either changes. Events
//! go out on a broadcast channel so any number of consumers can subscribe.

use crate::LedgerService;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use xcert_types::{AccountId, ProviderEvent};

const EVENT_CAPACITY: usize = 16;

/// Spawns provider watch loops.
pub struct ProviderWatcher;

impl ProviderWatcher {
	/// Starts polling through `service` every `poll_interval`.
	///
	/// The service's provider options apply to every poll. The first poll happens immediately and reports the initial network
	/// and account as changes from nothing. Polling errors are logged and the
	/// loop keeps running.
	pub fn spawn(service: Arc<LedgerService>, poll_interval: Duration) -> WatcherHandle {
		let (events, _) = broadcast::channel(EVENT_CAPACITY);
		let (stop_tx, stop_rx) = mpsc::channel(1);
		let task = tokio::spawn(Self::watch_loop(
			service,
			events.clone(),
			stop_rx,
			poll_interval,
		));
		WatcherHandle {
			events,
			stop_signal: Some(stop_tx),
			task: Some(task),
		}
	}

	async fn watch_loop(
		service: Arc<LedgerService>,
		events: broadcast::Sender<ProviderEvent>,
		mut stop_rx: mpsc::Receiver<()>,
		poll_interval: Duration,
	) {
		let mut interval = tokio::time::interval(poll_interval);
		interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

		let mut network: Option<String> = None;
		let mut account: Option<AccountId> = None;

		loop {
			tokio::select! {
				_ = interval.tick() => {
					match service.network_version().await {
						Ok(current) if network.as_deref() != Some(current.as_str()) => {
							tracing::info!(new_network = %current, old_network = ?network, "Network changed");
							// No subscribers is not an error.
							let _ = events.send(ProviderEvent::NetworkChange {
								new_network: current.clone(),
								old_network: network.replace(current),
							});
						}
						Ok(_) => {}
						Err(e) => tracing::warn!(error = %e, "Failed to poll network version"),
					}

					match service.accounts().await {
						Ok(accounts) => {
							let current = accounts.first().copied();
							if current != account {
								tracing::info!(new_account = ?current, old_account = ?account, "Account changed");
								let _ = events.send(ProviderEvent::AccountChange {
									new_account: current,
									old_account: account,
								});
								account = current;
							}
						}
						Err(e) => tracing::warn!(error = %e, "Failed to poll accounts"),
					}
				}
				_ = stop_rx.recv() => {
					tracing::debug!("Provider watcher stopped");
					break;
				}
			}
		}
	}
}

/// Handle to a running watcher. Dropping it stops the task.
pub struct WatcherHandle {
	events: broadcast::Sender<ProviderEvent>,
	stop_signal: Option<mpsc::Sender<()>>,
	task: Option<JoinHandle<()>>,
}

impl WatcherHandle {
	/// New receiver for events published from now on.
	pub fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
		self.events.subscribe()
	}

	/// Stops the task and waits for it to finish.
	pub async fn stop(mut self) {
		if let Some(stop) = self.stop_signal.take() {
			let _ = stop.send(()).await;
		}
		if let Some(task) = self.task.take() {
			let _ = task.await;
		}
	}
}

impl Drop for WatcherHandle {
	fn drop(&mut self) {
		if let Some(task) = self.task.take() {
			task.abort();
		}
	}
}
