//! Flutter-facing bindings over `relief_core`.

pub mod api;
