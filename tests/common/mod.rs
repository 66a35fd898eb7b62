//! Shared test infrastructure for record generation integration tests.

#![allow(dead_code)]

use std::net::IpAddr;

use mesos_records::state::{
    ContainerStatus, DiscoveryInfo, DiscoveryPort, DiscoveryPorts, Framework, IpAddress,
    NetworkInfo, Resources, Slave, Status, Task, Upid,
};
use mesos_records::{GeneratorConfig, RecordGenerator, RecordKind, State, StaticResolver};

// --- Constants ---

pub const DOMAIN: &str = "mesos.local.";
pub const LEADER: &str = "master@10.0.0.1:5050";

/// `short_hash("task-1")`
pub const TASK_1_HASH: &str = "yuqzm";
/// `short_hash("task-2")`
pub const TASK_2_HASH: &str = "gj9p9";

// --- State builder ---

/// Builds a cluster state snapshot one object at a time.
pub struct TestStateBuilder {
    state: State,
    slave_counter: u32,
}

impl TestStateBuilder {
    pub fn new() -> Self {
        Self {
            state: State {
                leader: LEADER.to_string(),
                ..Default::default()
            },
            slave_counter: 0,
        }
    }

    pub fn leader(mut self, leader: &str) -> Self {
        self.state.leader = leader.to_string();
        self
    }

    /// Add a framework whose scheduler listens on `host:port`.
    pub fn add_framework(&mut self, name: &str, host: &str, port: u16) -> usize {
        self.state.frameworks.push(Framework {
            name: name.to_string(),
            pid: Some(upid("scheduler(1)", host, port)),
            hostname: host.to_string(),
            tasks: Vec::new(),
        });
        self.state.frameworks.len() - 1
    }

    /// Add an agent at `ip`, returning its generated ID (`agent-N`).
    pub fn add_slave(&mut self, ip: &str) -> String {
        self.slave_counter += 1;
        let id = format!("agent-{}", self.slave_counter);
        self.state.slaves.push(Slave {
            id: id.clone(),
            hostname: ip.to_string(),
            pid: Some(upid("slave(1)", ip, 5051)),
        });
        id
    }

    pub fn add_task(&mut self, framework: usize, task: Task) {
        self.state.frameworks[framework].tasks.push(task);
    }

    pub fn build(self) -> State {
        self.state
    }
}

fn upid(id: &str, host: &str, port: u16) -> Upid {
    Upid {
        id: id.to_string(),
        host: host.to_string(),
        port,
    }
}

// --- Task builders ---

/// A running task on `slave_id` with a single resource port.
pub fn running_task(id: &str, name: &str, slave_id: &str, port: u16) -> Task {
    Task {
        id: id.to_string(),
        name: name.to_string(),
        slave_id: slave_id.to_string(),
        state: "TASK_RUNNING".to_string(),
        resources: Resources {
            port_ranges: format!("[{port}-{port}]"),
        },
        ..Default::default()
    }
}

/// Attach a running status reporting `ip` through container network info.
pub fn with_netinfo(mut task: Task, ip: &str) -> Task {
    task.statuses.push(Status {
        state: "TASK_RUNNING".to_string(),
        timestamp: 1.0,
        container_status: ContainerStatus {
            network_infos: vec![NetworkInfo {
                ip_addresses: vec![IpAddress {
                    ip_address: ip.to_string(),
                }],
                ..Default::default()
            }],
        },
        ..Default::default()
    });
    task
}

/// Attach discovery info with one named port.
pub fn with_discovery(mut task: Task, name: &str, port: u16, protocol: &str) -> Task {
    task.discovery = Some(DiscoveryInfo {
        name: name.to_string(),
        ports: DiscoveryPorts {
            discovery_ports: vec![DiscoveryPort {
                number: port,
                protocol: protocol.to_string(),
                name: "http".to_string(),
            }],
        },
    });
    task
}

// --- Generation helpers ---

pub fn test_config() -> GeneratorConfig {
    GeneratorConfig::with_domain(DOMAIN)
}

pub fn generate(state: &State) -> RecordGenerator {
    RecordGenerator::insert_state(state, &test_config(), &StaticResolver::new())
        .expect("generation failed")
}

pub fn ip(s: &str) -> IpAddr {
    s.parse().expect("invalid test IP")
}

// --- Assertions ---

/// Assert `name` holds exactly `expected` for `kind`.
pub fn assert_targets(generator: &RecordGenerator, name: &str, kind: RecordKind, expected: &[&str]) {
    let actual: Vec<&str> = generator
        .records(kind)
        .get(name)
        .map(|targets| targets.iter().map(String::as_str).collect())
        .unwrap_or_default();
    let mut expected = expected.to_vec();
    expected.sort_unstable();
    assert_eq!(actual, expected, "unexpected {kind} targets for {name}");
}

/// Assert the enumeration and the record store describe the same records.
pub fn assert_enumeration_consistent(generator: &RecordGenerator) {
    let enumeration = generator.enumeration();
    for (task, record) in enumeration.records() {
        assert!(
            generator.store().contains(&record.name, &record.host, record.rtype),
            "task {} enumerates {} {} -> {} missing from the store",
            task.id,
            record.rtype,
            record.name,
            record.host
        );
    }
}
