//! Background polling
//!
//! A single worker thread runs one poll cycle, then waits for the current
//! refresh interval on its command channel. The interval is re-read before
//! every wait, so a reconfigured `refresh` applies from the next cycle on.
//! Devices are polled one after the other; a slow gateway delays the rest of
//! the cycle but never aborts it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use item_bus::EventPublisher;
use parking_lot::RwLock;
use ted_client::TedClient;

use crate::device::DeviceRegistry;
use crate::dispatcher::process_live_data;
use crate::provider::BindingProvider;
use crate::settings::BindingSettings;

/// Name of the polling service, also used as the worker thread name
pub const SERVICE_NAME: &str = "The Energy Detective Refresh Service";

/// Outcome of one poll cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    /// Devices whose LiveData was fetched
    pub devices_polled: usize,
    /// Devices skipped because of a missing host or a failed request
    pub devices_failed: usize,
    /// Item updates published across all devices
    pub updates_published: usize,
}

/// State shared between the binding's public API and the poller thread
pub struct PollContext {
    pub(crate) registry: DeviceRegistry,
    refresh_ms: AtomicU64,
    providers: RwLock<Vec<Arc<dyn BindingProvider>>>,
    publisher: Arc<dyn EventPublisher>,
    client: TedClient,
}

impl PollContext {
    pub fn new(publisher: Arc<dyn EventPublisher>, settings: &BindingSettings) -> Self {
        Self {
            registry: DeviceRegistry::new(),
            refresh_ms: AtomicU64::new(duration_to_millis(settings.refresh)),
            providers: RwLock::new(Vec::new()),
            publisher,
            client: TedClient::with_timeout(settings.http_timeout),
        }
    }

    /// Current refresh interval
    pub fn refresh(&self) -> Duration {
        Duration::from_millis(self.refresh_ms.load(Ordering::Relaxed))
    }

    pub(crate) fn set_refresh(&self, refresh: Duration) {
        self.refresh_ms
            .store(duration_to_millis(refresh), Ordering::Relaxed);
    }

    pub(crate) fn add_provider(&self, provider: Arc<dyn BindingProvider>) {
        self.providers.write().push(provider);
    }

    pub(crate) fn remove_provider(&self, provider: &Arc<dyn BindingProvider>) {
        self.providers.write().retain(|p| !Arc::ptr_eq(p, provider));
    }

    pub(crate) fn provider_count(&self) -> usize {
        self.providers.read().len()
    }

    /// Run one poll cycle over every configured device
    pub fn execute(&self) -> PollSummary {
        let devices = self.registry.devices();
        let providers: Vec<Arc<dyn BindingProvider>> = self.providers.read().clone();
        let mut summary = PollSummary::default();

        tracing::debug!(devices = devices.len(), "{} cycle", SERVICE_NAME);

        for device in devices {
            let Some(host) = device.host.as_deref() else {
                tracing::warn!(device_id = %device.device_id, "no host configured, skipping device");
                summary.devices_failed += 1;
                continue;
            };

            tracing::debug!(
                "About to reload live data from {} {}:{}",
                device.device_id,
                host,
                device.port
            );

            match self.client.fetch_live_data(host, device.port) {
                Ok(body) => {
                    summary.devices_polled += 1;
                    summary.updates_published += process_live_data(
                        &device.device_id,
                        &body,
                        &providers,
                        self.publisher.as_ref(),
                    );
                }
                Err(e) => {
                    tracing::warn!(device_id = %device.device_id, "failed to fetch LiveData: {}", e);
                    summary.devices_failed += 1;
                }
            }
        }

        summary
    }
}

impl std::fmt::Debug for PollContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollContext")
            .field("registry", &self.registry)
            .field("refresh", &self.refresh())
            .field("providers", &self.provider_count())
            .finish()
    }
}

fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Commands sent from the binding to the poller thread
#[derive(Debug)]
pub(crate) enum Command {
    /// Run a cycle now instead of waiting for the interval
    PollNow,
    /// Stop the thread
    Shutdown,
}

/// Handle to the running poller thread
///
/// Dropping the handle stops the thread and waits for the current cycle to
/// finish.
#[derive(Debug)]
pub struct Poller {
    command_tx: mpsc::Sender<Command>,
    worker: Option<JoinHandle<()>>,
}

impl Poller {
    /// Start polling `context` on a new thread
    pub fn spawn(context: Arc<PollContext>) -> std::io::Result<Self> {
        let (command_tx, command_rx) = mpsc::channel();

        let worker = thread::Builder::new()
            .name(SERVICE_NAME.to_string())
            .spawn(move || run_poll_loop(context, command_rx))?;

        Ok(Self {
            command_tx,
            worker: Some(worker),
        })
    }

    /// Ask the poller to run a cycle immediately
    pub fn poll_now(&self) {
        if self.command_tx.send(Command::PollNow).is_err() {
            tracing::debug!("poller already stopped, poll request dropped");
        }
    }

    /// Stop the poller and wait for the thread to exit
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.command_tx.send(Command::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("{} thread panicked", SERVICE_NAME);
            }
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_poll_loop(context: Arc<PollContext>, command_rx: mpsc::Receiver<Command>) {
    tracing::info!("{} started", SERVICE_NAME);

    loop {
        let summary = context.execute();
        tracing::debug!(
            polled = summary.devices_polled,
            failed = summary.devices_failed,
            published = summary.updates_published,
            "poll cycle finished"
        );

        match command_rx.recv_timeout(context.refresh()) {
            Ok(Command::PollNow) | Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Ok(Command::Shutdown) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    tracing::info!("{} stopped", SERVICE_NAME);
}
