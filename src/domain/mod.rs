// Domain layer: request-scoped models and the ports for the two external collaborators.

pub mod model;
pub mod ports;
