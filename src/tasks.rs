//! Task records.
//!
//! Every running task on a known agent gets, per naming context:
//!
//! - `<task>.<framework>.<domain>.` A to the task address, shared by all
//!   tasks with the same name
//! - `<task>-<hash>-<agent>.<framework>.<domain>.` A to the task address,
//!   unique per task instance
//! - both names again under `.slave`, pointing at the agent address
//! - `_<task>._<proto>.<framework>[.slave].<domain>.` SRV per port
//!
//! Tasks referencing an agent missing from the snapshot are skipped.

use crate::enumeration::{EnumerableFramework, EnumerableTask};
use crate::generator::{target_kind, Builder};
use crate::labels::{domain_frag, SEP};
use crate::names::{short_hash, slave_id_tail};
use crate::records::RecordKind;
use crate::srv::SrvNames;
use crate::state::{Framework, State, Task};

/// Names and addresses shared by every record of one task context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TaskContext {
    /// Label the task is published under.
    pub(crate) task_name: String,
    /// Short hash of the task ID.
    pub(crate) task_hash: String,
    /// Trailing field of the agent ID.
    pub(crate) slave_tail: String,
    /// Address chosen for the task, if any source yielded one.
    pub(crate) task_ip: Option<String>,
    /// Representative agent address (or sanitized agent host).
    pub(crate) slave_ip: String,
}

impl TaskContext {
    /// `<task>-<hash>-<agent>`, unique per task instance.
    fn canonical(&self) -> String {
        format!("{}-{}-{}", self.task_name, self.task_hash, self.slave_tail)
    }
}

impl Builder<'_> {
    pub(crate) fn task_records(&mut self, state: &State) {
        for framework in &state.frameworks {
            let mut enum_framework = EnumerableFramework {
                name: framework.name.clone(),
                tasks: Vec::new(),
            };

            for task in &framework.tasks {
                let Some(slave_ip) = self.out.slave_ips.get(&task.slave_id).cloned() else {
                    continue;
                };
                if task.is_running() {
                    let enum_task = self.task_record(task, framework, slave_ip);
                    enum_framework.tasks.push(enum_task);
                }
            }

            self.out.enumeration.frameworks.push(enum_framework);
        }
    }

    fn task_record(
        &mut self,
        task: &Task,
        framework: &Framework,
        slave_ip: String,
    ) -> EnumerableTask {
        let mut enum_task = EnumerableTask {
            name: task.name.clone(),
            id: task.id.clone(),
            records: Vec::new(),
        };

        let mut ctx = TaskContext {
            task_name: self.spec.label(&task.name),
            task_hash: short_hash(&task.id),
            slave_tail: slave_id_tail(&task.slave_id),
            task_ip: task.ip(&self.config.ip_sources, &slave_ip),
            slave_ip,
        };

        match task.discovery_info() {
            Some(discovery) => {
                // Deprecated: the unsanitized discovery name is still
                // published until clients have migrated to the sanitized one.
                ctx.task_name = discovery.name.clone();
                self.task_context_records(&ctx, task, framework, &mut enum_task);

                ctx.task_name = self.spec.label(&discovery.name);
                self.task_context_records(&ctx, task, framework, &mut enum_task);
            }
            None => self.task_context_records(&ctx, task, framework, &mut enum_task),
        }

        enum_task
    }

    fn task_context_records(
        &mut self,
        ctx: &TaskContext,
        task: &Task,
        framework: &Framework,
        enum_task: &mut EnumerableTask,
    ) {
        let fname = domain_frag(&framework.name, SEP, self.spec);
        let tail = format!(".{}.", self.domain);

        let canonical = format!("{}.{fname}", ctx.canonical());
        let arec = format!("{}.{fname}", ctx.task_name);

        if let Some(task_ip) = &ctx.task_ip {
            let kind = target_kind(task_ip);
            self.insert_task(&format!("{arec}{tail}"), task_ip, kind, enum_task);
            self.insert_task(&format!("{canonical}{tail}"), task_ip, kind, enum_task);
        }

        let kind = target_kind(&ctx.slave_ip);
        self.insert_task(&format!("{arec}.slave{tail}"), &ctx.slave_ip, kind, enum_task);
        self.insert_task(&format!("{canonical}.slave{tail}"), &ctx.slave_ip, kind, enum_task);

        let discovery = task.discovery_info();
        let subdomains: &[&str] = if discovery.is_some() {
            &["slave"]
        } else {
            &["slave", ""]
        };

        let slave_host = format!("{canonical}.slave{tail}");
        for port in task.ports() {
            let target = format!("{slave_host}:{port}");
            let names = SrvNames::new(&ctx.task_name, self.spec)
                .protocol("", &fname)
                .subdomains(subdomains)
                .names();
            self.insert_task_srvs(&names, &tail, &target, enum_task);
        }

        let Some(discovery) = discovery else {
            return;
        };

        for port in &discovery.ports.discovery_ports {
            let target = format!("{canonical}{tail}:{}", port.number);
            let names = SrvNames::new(&ctx.task_name, self.spec)
                .protocol(&port.protocol, &fname)
                .named_port(&port.name)
                .names();
            self.insert_task_srvs(&names, &tail, &target, enum_task);
        }
    }

    fn insert_task(
        &mut self,
        name: &str,
        target: &str,
        kind: RecordKind,
        enum_task: &mut EnumerableTask,
    ) -> bool {
        self.out.records.insert_tracked(name, target, kind, enum_task)
    }

    fn insert_task_srvs(
        &mut self,
        names: &[String],
        tail: &str,
        target: &str,
        enum_task: &mut EnumerableTask,
    ) {
        for name in names {
            self.insert_task(&format!("{name}{tail}"), target, RecordKind::Srv, enum_task);
        }
    }
}
