//! End-to-end polling tests against mocked TED gateways
//!
//! Each test starts one or more local mock servers serving LiveData documents,
//! configures the binding to point at them and checks what reaches the bus.

use std::collections::HashMap;
use std::sync::{mpsc, Arc, Mutex};
use std::time::{Duration, Instant};

use item_bus::{Item, ItemBus};
use mockito::{Mock, Server};
use ted_binding::{BindingProvider, BindingSettings, GenericBindingProvider, TedBinding};

const MAIN_LIVE_DATA: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<LiveData>
    <Power>
        <Total><PowerNow>1500</PowerNow><PowerTDY>12034</PowerTDY></Total>
        <MTU1><PowerNow>870</PowerNow></MTU1>
        <MTU1><PowerNow>5</PowerNow></MTU1>
    </Power>
    <Voltage>
        <Total><VoltageNow>1204</VoltageNow></Total>
    </Voltage>
</LiveData>"#;

const GARAGE_LIVE_DATA: &str = r#"<LiveData>
    <Power><Total><PowerNow>320</PowerNow></Total></Power>
</LiveData>"#;

fn mock_gateway(server: &mut Server, body: &str) -> Mock {
    server
        .mock("GET", "/api/LiveData.xml")
        .with_status(200)
        .with_header("content-type", "text/xml")
        .with_body(body)
        .create()
}

/// `<id>.host` / `<id>.port` entries pointing at a mock server
fn gateway_config(config: &mut HashMap<String, String>, device_id: &str, server: &Server) {
    let host_with_port = server.host_with_port();
    let (host, port) = host_with_port
        .rsplit_once(':')
        .expect("mock server address has a port");
    config.insert(format!("{}.host", device_id), host.to_string());
    config.insert(format!("{}.port", device_id), port.to_string());
}

fn provider(bindings: &[(&str, &str)]) -> Arc<GenericBindingProvider> {
    let provider = Arc::new(GenericBindingProvider::new());
    for (item, binding) in bindings {
        provider
            .process_binding_configuration("energy.items", &Item::number(*item), binding)
            .expect("valid binding");
    }
    provider
}

fn binding(bus: &ItemBus) -> TedBinding {
    let settings = BindingSettings::new().with_http_timeout(Duration::from_millis(1000));
    TedBinding::with_settings(Arc::new(bus.clone()), settings)
}

#[test]
fn test_single_cycle_publishes_bound_items() {
    let mut server = Server::new();
    let mock = mock_gateway(&mut server, MAIN_LIVE_DATA);

    let bus = ItemBus::new();
    let binding = binding(&bus);
    binding.add_binding_provider(provider(&[
        ("Power_Total", "main:Power.Total.PowerNow"),
        ("Power_Today", "main:Power.Total.PowerTDY"),
        ("Power_MTU1", "main:Power.MTU1.PowerNow"),
        ("Voltage", "main:Voltage.Total.VoltageNow"),
    ]));

    let mut config = HashMap::new();
    gateway_config(&mut config, "main", &server);
    binding.updated(Some(&config)).unwrap();

    let summary = binding.execute();

    assert_eq!(summary.devices_polled, 1);
    assert_eq!(summary.devices_failed, 0);
    assert_eq!(summary.updates_published, 4);
    assert_eq!(bus.state("Power_Total"), Some(1500));
    assert_eq!(bus.state("Power_Today"), Some(12034));
    assert_eq!(bus.state("Power_MTU1"), Some(870));
    assert_eq!(bus.state("Voltage"), Some(1204));
    mock.assert();
}

#[test]
fn test_items_are_routed_by_gateway() {
    let mut main = Server::new();
    let mut garage = Server::new();
    let _main_mock = mock_gateway(&mut main, MAIN_LIVE_DATA);
    let _garage_mock = mock_gateway(&mut garage, GARAGE_LIVE_DATA);

    let bus = ItemBus::new();
    let binding = binding(&bus);
    binding.add_binding_provider(provider(&[
        ("Main_Power", "main:Power.Total.PowerNow"),
        ("Garage_Power", "garage:Power.Total.PowerNow"),
    ]));

    let mut config = HashMap::new();
    gateway_config(&mut config, "main", &main);
    gateway_config(&mut config, "garage", &garage);
    binding.updated(Some(&config)).unwrap();

    let summary = binding.execute();

    assert_eq!(summary.devices_polled, 2);
    assert_eq!(bus.state("Main_Power"), Some(1500));
    assert_eq!(bus.state("Garage_Power"), Some(320));
}

#[test]
fn test_failing_gateway_does_not_block_others() {
    let mut broken = Server::new();
    let mut healthy = Server::new();
    let _broken_mock = broken
        .mock("GET", "/api/LiveData.xml")
        .with_status(500)
        .create();
    let _healthy_mock = mock_gateway(&mut healthy, GARAGE_LIVE_DATA);

    let bus = ItemBus::new();
    let binding = binding(&bus);
    binding.add_binding_provider(provider(&[
        ("Broken_Power", "broken:Power.Total.PowerNow"),
        ("Healthy_Power", "healthy:Power.Total.PowerNow"),
    ]));

    let mut config = HashMap::new();
    gateway_config(&mut config, "broken", &broken);
    gateway_config(&mut config, "healthy", &healthy);
    binding.updated(Some(&config)).unwrap();

    let summary = binding.execute();

    assert_eq!(summary.devices_failed, 1);
    assert_eq!(summary.devices_polled, 1);
    assert_eq!(bus.state("Broken_Power"), None);
    assert_eq!(bus.state("Healthy_Power"), Some(320));
}

#[test]
fn test_non_live_data_document_is_discarded() {
    let mut server = Server::new();
    let _mock = mock_gateway(
        &mut server,
        "<SystemOverview><Power><Total><PowerNow>1500</PowerNow></Total></Power></SystemOverview>",
    );

    let bus = ItemBus::new();
    let binding = binding(&bus);
    binding.add_binding_provider(provider(&[("Power_Total", "main:Power.Total.PowerNow")]));

    let mut config = HashMap::new();
    gateway_config(&mut config, "main", &server);
    binding.updated(Some(&config)).unwrap();

    let summary = binding.execute();

    assert_eq!(summary.devices_polled, 1);
    assert_eq!(summary.updates_published, 0);
    assert_eq!(bus.item_count(), 0);
}

#[test]
fn test_unbound_gateway_is_still_polled() {
    let mut server = Server::new();
    let mock = mock_gateway(&mut server, MAIN_LIVE_DATA);

    let bus = ItemBus::new();
    let binding = binding(&bus);

    let mut config = HashMap::new();
    gateway_config(&mut config, "main", &server);
    binding.updated(Some(&config)).unwrap();

    let summary = binding.execute();

    assert_eq!(summary.devices_polled, 1);
    assert_eq!(summary.updates_published, 0);
    mock.assert();
}

#[test]
fn test_removed_provider_stops_updates() {
    let mut server = Server::new();
    let _mock = mock_gateway(&mut server, MAIN_LIVE_DATA);

    let bus = ItemBus::new();
    let binding = binding(&bus);
    let provider: Arc<dyn BindingProvider> = provider(&[("Power_Total", "main:Power.Total.PowerNow")]);
    binding.add_binding_provider(Arc::clone(&provider));

    let mut config = HashMap::new();
    gateway_config(&mut config, "main", &server);
    binding.updated(Some(&config)).unwrap();

    assert_eq!(binding.execute().updates_published, 1);

    binding.remove_binding_provider(&provider);
    assert_eq!(binding.execute().updates_published, 0);
}

#[test]
fn test_active_binding_polls_in_background() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", "/api/LiveData.xml")
        .with_status(200)
        .with_body(MAIN_LIVE_DATA)
        .expect_at_least(2)
        .create();

    let bus = ItemBus::new();
    let binding = binding(&bus);
    binding.add_binding_provider(provider(&[("Power_Total", "main:Power.Total.PowerNow")]));

    let mut config = HashMap::new();
    gateway_config(&mut config, "main", &server);
    config.insert("refresh".to_string(), "50".to_string());
    binding.updated(Some(&config)).unwrap();
    binding.activate().unwrap();

    let updates = bus.iter();
    let first = updates.recv_timeout(Duration::from_secs(5)).expect("first update");
    let second = updates.recv_timeout(Duration::from_secs(5)).expect("second update");

    binding.deactivate();

    assert_eq!(first.item_name, "Power_Total");
    assert_eq!(first.value, 1500);
    assert_eq!(second.value, 1500);
    assert!(!binding.is_active());
}

#[test]
fn test_poll_now_cuts_a_long_wait_short() {
    let mut server = Server::new();
    let _mock = mock_gateway(&mut server, MAIN_LIVE_DATA);

    let bus = ItemBus::new();
    let binding = binding(&bus);
    binding.add_binding_provider(provider(&[("Power_Total", "main:Power.Total.PowerNow")]));

    let mut config = HashMap::new();
    gateway_config(&mut config, "main", &server);
    config.insert("refresh".to_string(), "3600000".to_string());
    binding.updated(Some(&config)).unwrap();
    binding.activate().unwrap();

    let updates = bus.iter();
    // The first cycle runs immediately on activation
    assert!(updates.recv_timeout(Duration::from_secs(5)).is_some());

    binding.poll_now();
    assert!(updates.recv_timeout(Duration::from_secs(5)).is_some());

    binding.deactivate();
}

#[test]
fn test_longer_refresh_is_picked_up_by_the_next_wait() {
    let mut server = Server::new();
    let _mock = mock_gateway(&mut server, MAIN_LIVE_DATA);

    let bus = ItemBus::new();
    let binding = binding(&bus);
    binding.add_binding_provider(provider(&[("Power_Total", "main:Power.Total.PowerNow")]));

    let mut config = HashMap::new();
    gateway_config(&mut config, "main", &server);
    config.insert("refresh".to_string(), "50".to_string());
    binding.updated(Some(&config)).unwrap();
    binding.activate().unwrap();

    let updates = bus.iter();
    assert!(updates.recv_timeout(Duration::from_secs(5)).is_some());
    assert!(updates.recv_timeout(Duration::from_secs(5)).is_some());

    binding
        .updated(Some(&HashMap::from([("refresh".to_string(), "3600000".to_string())])))
        .unwrap();

    // At most one more cycle from the wait that was already running
    std::thread::sleep(Duration::from_millis(300));
    let trailing = updates.try_iter().count();
    assert!(trailing <= 1, "{} cycles after refresh change", trailing);

    assert!(updates.recv_timeout(Duration::from_millis(500)).is_none());
    binding.deactivate();
}

#[test]
fn test_shorter_refresh_applies_after_the_current_wait() {
    let mut server = Server::new();
    let _mock = mock_gateway(&mut server, MAIN_LIVE_DATA);

    let bus = ItemBus::new();
    let binding = binding(&bus);
    binding.add_binding_provider(provider(&[("Power_Total", "main:Power.Total.PowerNow")]));

    let mut config = HashMap::new();
    gateway_config(&mut config, "main", &server);
    config.insert("refresh".to_string(), "400".to_string());
    binding.updated(Some(&config)).unwrap();
    binding.activate().unwrap();

    let updates = bus.iter();
    assert!(updates.recv_timeout(Duration::from_secs(5)).is_some());

    binding
        .updated(Some(&HashMap::from([("refresh".to_string(), "20".to_string())])))
        .unwrap();

    // The running 400 ms wait ends, then cycles follow every 20 ms
    let start = Instant::now();
    let mut cycles = 0;
    while cycles < 5 && start.elapsed() < Duration::from_secs(5) {
        if updates.recv_timeout(Duration::from_secs(1)).is_some() {
            cycles += 1;
        }
    }
    binding.deactivate();

    assert_eq!(cycles, 5);
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[test]
fn test_reconfiguration_during_cycle_applies_to_next_cycle() {
    let (request_tx, request_rx) = mpsc::channel();
    let request_tx = Mutex::new(request_tx);

    let mut slow = Server::new();
    let _slow_mock = slow
        .mock("GET", "/api/LiveData.xml")
        .with_status(200)
        .with_body_from_request(move |_| {
            let _ = request_tx.lock().map(|tx| tx.send(()));
            std::thread::sleep(Duration::from_millis(200));
            MAIN_LIVE_DATA.as_bytes().to_vec()
        })
        .create();
    let mut garage = Server::new();
    let _garage_mock = mock_gateway(&mut garage, GARAGE_LIVE_DATA);

    let bus = ItemBus::new();
    let binding = binding(&bus);
    binding.add_binding_provider(provider(&[
        ("Main_Power", "main:Power.Total.PowerNow"),
        ("Garage_Power", "garage:Power.Total.PowerNow"),
    ]));

    let mut config = HashMap::new();
    gateway_config(&mut config, "main", &slow);
    binding.updated(Some(&config)).unwrap();

    let in_flight = std::thread::scope(|s| {
        let cycle = s.spawn(|| binding.execute());

        request_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("gateway request started");
        let mut added = HashMap::new();
        gateway_config(&mut added, "garage", &garage);
        binding.updated(Some(&added)).unwrap();

        cycle.join().expect("poll cycle finished")
    });

    assert_eq!(in_flight.devices_polled, 1);
    assert_eq!(bus.state("Garage_Power"), None);

    let next = binding.execute();
    assert_eq!(next.devices_polled, 2);
    assert_eq!(bus.state("Garage_Power"), Some(320));
    assert_eq!(bus.state("Main_Power"), Some(1500));
}
