pub mod connectivity;
pub mod probe;

pub use connectivity::ConnectivityMonitor;
pub use probe::{HttpConnectivityProbe, ProbeHandle};
