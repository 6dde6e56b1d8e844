// Domain layer: entities, coercion rules and ports. No HTTP or filesystem code here.

pub mod catalog;
pub mod coerce;
pub mod model;
pub mod nutrition;
pub mod ports;
pub mod session;
