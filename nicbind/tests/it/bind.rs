use std::fs;

use nicbind::Error;
use nicbind_config::{ConfigError, NicBindConfig};
use nicbind_sys::Device;

use crate::helpers::{FakeHost, UNTOUCHED};

fn config(toml: &str) -> NicBindConfig {
    NicBindConfig::from_toml(toml).unwrap()
}

/// Two NICs, a bridge and a timer IRQ on an 8 CPU host.
fn host() -> FakeHost {
    let mut host = FakeHost::new(8);
    host.other_irq(0, "timer")
        .nic("eth0", &[40, 41, 42])
        .virtual_device("br0")
        .nic("eth1", &[50, 51, 52, 53]);
    host
}

const SPREAD: &str = r#"
[general]
reverse_queues = false

[general.cpu.8]
rx_queues_enable = true
rx_queues_begin = 2
rx_queues_end = 5
rx_queues_step = 1
rps_enable = true
rps_begin = 0
rps_end = 4
rps_step = 2

[general.cpu.64]
rx_queues_enable = false
rps_enable = false
"#;

#[test]
fn binds_irqs_and_rps() {
    let _ = tracing_subscriber::fmt::try_init();
    let host = host();

    let report = nicbind::run(&host.paths, &config(SPREAD)).unwrap();

    assert_eq!(report.cpu_count, 8);
    assert_eq!(
        report.devices,
        vec![Device::new("eth0", vec![40, 41, 42]), Device::new("eth1", vec![50, 51, 52, 53])]
    );
    assert_eq!(report.irqs, 7);
    assert_eq!(report.queues, 7);

    // CPUs 2 3 4 2 3 4 2 across both devices.
    let affinity: Vec<String> =
        [40, 41, 42, 50, 51, 52, 53].into_iter().map(|irq| host.affinity(irq)).collect();
    assert_eq!(affinity, ["4", "8", "10", "4", "8", "10", "4"]);
    assert_eq!(host.affinity(0), UNTOUCHED);

    // CPUs 0 2 0 2, restarting for every device.
    assert_eq!(host.rps("eth0", "rx-0"), "1");
    assert_eq!(host.rps("eth0", "rx-1"), "4");
    assert_eq!(host.rps("eth0", "rx-2"), "1");
    assert_eq!(host.rps("eth1", "rx-0"), "1");
    assert_eq!(host.rps("eth1", "rx-1"), "4");
    assert_eq!(host.rps("eth1", "rx-2"), "1");
    assert_eq!(host.rps("eth1", "rx-3"), "4");
    assert_eq!(host.rps("br0", "rx-0"), UNTOUCHED);
}

#[test]
fn reverse_queues_sweeps_back_and_forth() {
    let host = host();
    let config = config(&SPREAD.replace("reverse_queues = false", "reverse_queues = true"));

    nicbind::run(&host.paths, &config).unwrap();

    // CPUs 2 3 4 4 3 2 2
    let affinity: Vec<String> =
        [40, 41, 42, 50, 51, 52, 53].into_iter().map(|irq| host.affinity(irq)).collect();
    assert_eq!(affinity, ["4", "8", "10", "10", "8", "4", "4"]);
}

#[test]
fn disabled_features_clear_masks() {
    let host = host();
    let config = config(
        r#"
[general]
reverse_queues = true

[general.cpu.8]
rx_queues_enable = false
rx_queues_begin = 3
rx_queues_end = 7
rps_enable = false
rps_begin = 1
rps_end = 2
rps_step = 5
"#,
    );

    let report = nicbind::run(&host.paths, &config).unwrap();
    assert_eq!(report.irqs, 7);
    assert_eq!(report.queues, 7);

    for irq in [40, 41, 42, 50, 51, 52, 53] {
        assert_eq!(host.affinity(irq), "0", "irq {irq}");
    }
    for (device, queues) in [("eth0", 3), ("eth1", 4)] {
        for i in 0..queues {
            assert_eq!(host.rps(device, &format!("rx-{i}")), "0", "{device} rx-{i}");
        }
    }

    assert_eq!(host.affinity(0), UNTOUCHED);
    assert_eq!(host.rps("br0", "rx-0"), UNTOUCHED);
}

#[test]
fn disabled_features_ignore_inverted_ranges() {
    let host = host();
    let config = config(
        r#"
[general.cpu.8]
rx_queues_enable = false
rx_queues_begin = -1
rx_queues_end = 2
rps_enable = false
rps_begin = 3
rps_end = 2
"#,
    );

    let report = nicbind::run(&host.paths, &config).unwrap();
    assert_eq!(report.irqs, 7);
    assert_eq!(report.queues, 7);

    assert_eq!(host.affinity(40), "0");
    assert_eq!(host.affinity(53), "0");
    assert_eq!(host.rps("eth0", "rx-0"), "0");
    assert_eq!(host.rps("eth1", "rx-3"), "0");
}

#[test]
fn zero_end_uses_every_cpu_of_the_selected_tier() {
    let mut host = FakeHost::new(4);
    host.nic("eth0", &[10, 11, 12, 13, 14]);
    let config = config(
        r#"
[general.cpu.64]
rx_queues_enable = false

[general.cpu.4]
rx_queues_enable = true
rx_queues_begin = 1
rps_enable = true
rps_begin = 1
rps_step = 1
"#,
    );

    let report = nicbind::run(&host.paths, &config).unwrap();
    assert_eq!(report.nic.rx_queues_end, 4);
    assert_eq!(report.nic.rps_end, 4);

    // CPUs 1 2 3 1 2
    let affinity: Vec<String> = (10..15).map(|irq| host.affinity(irq)).collect();
    assert_eq!(affinity, ["2", "4", "8", "2", "4"]);

    // CPUs 1 2 3 1 2
    let rps: Vec<String> = (0..5).map(|i| host.rps("eth0", &format!("rx-{i}"))).collect();
    assert_eq!(rps, ["2", "4", "8", "2", "4"]);
}

#[test]
fn invalid_begin_binds_nothing() {
    let host = host();
    let config = config(&SPREAD.replace("rx_queues_begin = 2", "rx_queues_begin = 8"));

    let err = nicbind::run(&host.paths, &config).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::RangeTooLarge { begin: 8, .. })));

    for irq in [40, 41, 42, 50, 51, 52, 53] {
        assert_eq!(host.affinity(irq), UNTOUCHED);
    }
    assert_eq!(host.rps("eth0", "rx-0"), UNTOUCHED);
}

#[test]
fn missing_tier_binds_nothing() {
    let mut host = FakeHost::new(128);
    host.nic("eth0", &[40]);

    let err = nicbind::run(&host.paths, &config(SPREAD)).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::NoMatchingTier { cpu_count: 128 })));
    assert_eq!(host.affinity(40), UNTOUCHED);
}

#[test]
fn failed_write_stops_the_run() {
    let host = host();
    fs::remove_file(host.paths.smp_affinity(50)).unwrap();

    let err = nicbind::run(&host.paths, &config(SPREAD)).unwrap_err();
    assert!(matches!(err, Error::Sys(nicbind_sys::Error::Io { .. })));

    // Written before the failure.
    assert_eq!(host.affinity(40), "4");
    assert_eq!(host.affinity(42), "10");
    // Never reached.
    assert_eq!(host.affinity(51), UNTOUCHED);
    assert_eq!(host.rps("eth0", "rx-0"), UNTOUCHED);
}
