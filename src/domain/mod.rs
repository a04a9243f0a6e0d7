// Domain layer: portfolio data model and the ports to external collaborators.

pub mod model;
pub mod ports;
