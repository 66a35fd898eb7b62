//! Leader and master records.
//!
//! - `leader.<domain>.` resolves to the leading master
//! - `master.<domain>.` resolves to every master
//! - `masterN.<domain>.` resolves to one master each
//!
//! `masterN` ordinals follow the order of the configured fallback masters and
//! are never sorted: a re-election must not renumber the surviving masters,
//! and adding or removing one master should shift as few names as possible.
//! The leader may be missing from the fallback list (masters get replaced
//! over time); it then gets the next free ordinal.

use crate::generator::{target_kind, Builder};
use crate::names::{parse_ip, split_host_port};
use crate::records::RecordKind;

impl Builder<'_> {
    pub(crate) fn master_records(&mut self, leader: &str) {
        let Some((_, leader_address)) = leader.split_once('@') else {
            self.error(format!("malformed leader {leader:?}"));
            return;
        };
        let (leader_host, leader_port) = match split_host_port(leader_address) {
            Ok(parts) => parts,
            Err(e) => {
                self.error(format!("malformed leader {leader:?}: {e}"));
                return;
            }
        };

        let leader_record = self.fqdn("leader");
        let all_masters_record = self.fqdn("master");

        let addrs = self.resolve(&leader_host, "the leader");
        let leader_target = match addrs.first() {
            Some(ip) => ip.to_string(),
            None => leader_host.clone(),
        };
        if addrs.is_empty() {
            // degraded, but better than no leader at all
            self.insert(&leader_record, &leader_host, RecordKind::A);
            self.insert(&all_masters_record, &leader_host, RecordKind::A);
        } else {
            for addr in addrs {
                self.insert_ip(&leader_record, addr);
                self.insert_ip(&all_masters_record, addr);
            }
        }

        let leader_srv = format!("{leader_record}:{leader_port}");
        for srv in [self.fqdn("_leader._tcp"), self.fqdn("_leader._udp")] {
            self.insert(&srv, &leader_srv, RecordKind::Srv);
        }

        let masters = self.config.masters.clone();
        let mut added_leader_ordinal = false;
        let mut idx = 0;
        for master in &masters {
            let master_host = match split_host_port(master) {
                Ok((host, _)) => host,
                Err(e) => {
                    self.error(format!("skipping fallback master {master:?}: {e}"));
                    continue;
                }
            };
            let is_leader = master == leader_address;
            let target = self.master_target(&master_host);

            if !is_leader && !self.insert(&all_masters_record, &target, target_kind(&target)) {
                self.warn(format!("duplicate master {master:?}"));
                continue;
            }
            if is_leader && added_leader_ordinal {
                self.warn(format!("duplicate leader {master:?} in masters list"));
                continue;
            }

            let record = self.fqdn(&format!("master{idx}"));
            self.insert(&record, &target, target_kind(&target));
            idx += 1;
            if is_leader {
                added_leader_ordinal = true;
            }
        }

        if !added_leader_ordinal {
            // only a flake if there were fallback masters configured
            if !masters.is_empty() {
                self.warn(format!("leader {leader:?} is not in master list"));
            }
            let record = self.fqdn(&format!("master{idx}"));
            self.insert(&record, &leader_target, target_kind(&leader_target));
        }
    }

    /// Address a fallback master entry is published under: the literal IP,
    /// its IPv4 address, or the host itself when it does not resolve.
    fn master_target(&mut self, host: &str) -> String {
        if let Some(ip) = parse_ip(host) {
            return ip.to_string();
        }
        self.resolve_ipv4(host, "a fallback master")
            .map_or_else(|| host.to_string(), |ip| ip.to_string())
    }
}
