// Domain layer: records mirrored from the API, request payloads and ports.

pub mod model;
pub mod photo;
pub mod ports;
pub mod requests;
