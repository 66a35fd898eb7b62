//! RFC 2782 style SRV name construction.
//!
//! A [`SrvNames`] pipeline starts from a task label (`_web`) and applies its
//! [`Segment`]s in order, each one mapping the current list of names to a new
//! one. The resulting names are relative; callers append the domain.

use crate::labels::HostnameSpec;

/// One naming step of an SRV pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Append `._<protocol>.<framework>`. An empty protocol means both
    /// `tcp` and `udp`.
    Protocol {
        /// Sanitized protocol, or empty.
        protocol: String,
        /// Framework domain fragment.
        framework: String,
    },
    /// Append `.<subdomain>` once per subdomain; an empty subdomain leaves
    /// the name unchanged.
    Subdomains(Vec<String>),
    /// Keep each name and add a copy prefixed with `_<port>.`.
    NamedPort(String),
}

impl Segment {
    fn apply(&self, names: Vec<String>) -> Vec<String> {
        match self {
            Self::Protocol {
                protocol,
                framework,
            } => {
                let mut out = Vec::with_capacity(names.len() * 2);
                for name in &names {
                    if protocol.is_empty() {
                        out.push(format!("{name}._tcp.{framework}"));
                        out.push(format!("{name}._udp.{framework}"));
                    } else {
                        out.push(format!("{name}._{protocol}.{framework}"));
                    }
                }
                out
            }
            Self::Subdomains(subdomains) => subdomains
                .iter()
                .flat_map(|sub| {
                    names.iter().map(move |name| {
                        if sub.is_empty() {
                            name.clone()
                        } else {
                            format!("{name}.{sub}")
                        }
                    })
                })
                .collect(),
            Self::NamedPort(port) if port.is_empty() => names,
            Self::NamedPort(port) => {
                let prefixed: Vec<String> =
                    names.iter().map(|name| format!("_{port}.{name}")).collect();
                let mut out = names;
                out.extend(prefixed);
                out
            }
        }
    }
}

/// Ordered SRV naming pipeline for one task label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrvNames {
    label: String,
    segments: Vec<Segment>,
    spec: HostnameSpec,
}

impl SrvNames {
    /// Start a pipeline for `label`; names are seeded as `_<label>`.
    pub fn new(label: &str, spec: HostnameSpec) -> Self {
        Self {
            label: label.to_string(),
            segments: Vec::new(),
            spec,
        }
    }

    /// Add a protocol step. The protocol is lowercased and sanitized.
    pub fn protocol(mut self, protocol: &str, framework: &str) -> Self {
        let protocol = if protocol.is_empty() {
            String::new()
        } else {
            self.spec.label(&protocol.to_lowercase())
        };
        self.segments.push(Segment::Protocol {
            protocol,
            framework: framework.to_string(),
        });
        self
    }

    /// Add a subdomain fan-out step.
    pub fn subdomains(mut self, subdomains: &[&str]) -> Self {
        self.segments.push(Segment::Subdomains(
            subdomains.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    /// Add a named port step. The name is sanitized.
    pub fn named_port(mut self, port_name: &str) -> Self {
        let port_name = if port_name.is_empty() {
            String::new()
        } else {
            self.spec.label(port_name)
        };
        self.segments.push(Segment::NamedPort(port_name));
        self
    }

    /// The configured steps, in application order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Run the pipeline.
    pub fn names(&self) -> Vec<String> {
        self.segments
            .iter()
            .fold(vec![format!("_{}", self.label)], |names, segment| {
                segment.apply(names)
            })
    }
}
