use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use item_bus::{ItemBus, ItemUpdate};
use ted_binding::logging::{init_logging, LoggingMode};
use ted_binding::{GenericBindingProvider, TedBinding};
use ted_daemon::{load_item_bindings, load_service_config, Config};
use tracing::{info, warn};

fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_logging(LoggingMode::for_level(&config.log_level), &config.log_level)?;

    info!("Service config: {}", config.config_path.display());
    info!("Items: {}", config.items_path.display());

    let service_config = load_service_config(&config.config_path)?;
    let items = load_item_bindings(&config.items_path)?;

    let bus = ItemBus::new();
    let binding = TedBinding::new(Arc::new(bus.clone()));

    let provider = Arc::new(GenericBindingProvider::new());
    let context = config.items_path.display().to_string();
    for rejected in &items.rejected {
        warn!("{}:{}: {}", context, rejected.line, rejected.reason);
    }
    for definition in &items.definitions {
        if let Err(e) =
            provider.process_binding_configuration(&context, &definition.item, &definition.binding_config)
        {
            warn!("{}:{}: {}", context, definition.line, e);
        }
    }
    info!("{} item(s) bound", provider.len());
    binding.add_binding_provider(provider);

    binding
        .updated(Some(&service_config))
        .context("Invalid service configuration")?;
    for device in binding.devices() {
        info!("{}", device);
    }

    if config.once {
        let summary = binding.execute();
        for update in bus.iter().try_iter() {
            print_update(&update);
        }
        info!(
            "Polled {} device(s), {} failed, {} update(s)",
            summary.devices_polled, summary.devices_failed, summary.updates_published
        );
        return Ok(());
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("Failed to install Ctrl+C handler")?;

    binding.activate().context("Failed to start polling")?;
    info!(
        "Polling every {}ms (Ctrl+C to quit)",
        binding.refresh_interval().as_millis()
    );

    let updates = bus.iter();
    while running.load(Ordering::SeqCst) {
        if let Some(update) = updates.recv_timeout(Duration::from_secs(1)) {
            print_update(&update);
        }
    }

    info!("Shutting down");
    binding.deactivate();
    Ok(())
}

fn print_update(update: &ItemUpdate) {
    println!("{} = {}", update.item_name, update.value);
}
