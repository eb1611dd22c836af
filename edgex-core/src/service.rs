//! EdgeX microservice catalogue
//!
//! Every command targets one of the platform's microservices. Each service
//! has a canonical key (used in the configuration file) and a default port.

use serde::{Deserialize, Serialize};
use std::fmt;

/// EdgeX microservices reachable from the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Service {
    /// Events and readings
    CoreData,
    /// Devices, device services and device profiles
    CoreMetadata,
    /// Device command proxy
    CoreCommand,
    /// Notifications and subscriptions
    Notifications,
    /// Intervals and interval actions
    Scheduler,
    /// Centralised logging
    Logging,
    /// System management agent
    SystemManagement,
}

impl Service {
    /// All known services, in display order.
    pub fn all() -> &'static [Service] {
        &[
            Service::CoreData,
            Service::CoreMetadata,
            Service::CoreCommand,
            Service::Notifications,
            Service::Scheduler,
            Service::Logging,
            Service::SystemManagement,
        ]
    }

    /// Canonical service key
    pub fn key(&self) -> &'static str {
        match self {
            Service::CoreData => "core-data",
            Service::CoreMetadata => "core-metadata",
            Service::CoreCommand => "core-command",
            Service::Notifications => "support-notifications",
            Service::Scheduler => "support-scheduler",
            Service::Logging => "support-logging",
            Service::SystemManagement => "sys-mgmt-agent",
        }
    }

    /// Port the service listens on in a stock deployment
    pub fn default_port(&self) -> u16 {
        match self {
            Service::CoreData => 48080,
            Service::CoreMetadata => 48081,
            Service::CoreCommand => 48082,
            Service::Notifications => 48060,
            Service::Scheduler => 48085,
            Service::Logging => 48061,
            Service::SystemManagement => 48090,
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for Service {
    type Err = crate::EdgexError;

    /// Parse a service from its key.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::str::FromStr;
    /// use edgex_core::Service;
    ///
    /// assert_eq!(Service::from_str("core-data").unwrap(), Service::CoreData);
    /// assert!(Service::from_str("core-foo").is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Service::all()
            .iter()
            .copied()
            .find(|service| service.key() == key)
            .ok_or_else(|| crate::EdgexError::UnknownService(s.to_string()))
    }
}

/// Network location of one service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientEndpoint {
    /// URL scheme, `http` or `https`
    pub protocol: String,
    /// Host name or address
    pub host: String,
    /// TCP port
    pub port: u16,
}

impl ClientEndpoint {
    /// Endpoint for `service` on `host` using its default port.
    pub fn for_service(service: Service, protocol: &str, host: &str) -> Self {
        Self {
            protocol: protocol.to_string(),
            host: host.to_string(),
            port: service.default_port(),
        }
    }

    /// Base URL without trailing slash, e.g. `http://localhost:48080`
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }
}
