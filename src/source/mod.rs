// Remote tree access — the node source seam and its HTTP backend.

pub mod descriptor;
pub mod http_source;
pub mod traits;
