//! Logical services addressed by the clients

use crate::impl_wire_name_conversions;

/// A logical service; each resolves to its own base URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// Identity provider (token and introspection endpoints)
    Iam,
    /// Identity resources (application clients)
    Idm,
    /// Event notification
    Notification,
    /// Clinical data repository (FHIR store)
    Cdr,
}

impl_wire_name_conversions!(Service {
    Iam => "iam",
    Idm => "idm",
    Notification => "notification",
    Cdr => "cdr",
});

impl Service {
    /// All services, in configuration order
    pub const ALL: [Self; 4] = [Self::Iam, Self::Idm, Self::Notification, Self::Cdr];
}
