//! Flutter-facing bindings over `rotina_core`.

pub mod api;
