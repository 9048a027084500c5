//! Internal-service principal lifecycle: registration, credential exchange,
//! scope administration and access reporting.

pub mod registry;
pub mod types;

pub use registry::InternalServiceRegistry;
pub use types::{
    AccessStatistics, PermissionCheck, RegisterServiceRequest, RegisteredService, ScopeChange,
    ServiceInfo, ServiceList,
};
