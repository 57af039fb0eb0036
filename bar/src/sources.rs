//! Backend construction from a parsed selector.

use xbattbar_rs_core::{SourceKind, StatusSource};
use xbattbar_rs_debug::DebugSource;
use xbattbar_rs_upower::UPowerSource;

/// Create an uninitialized source for `kind`.
pub fn create_source(kind: SourceKind) -> Box<dyn StatusSource> {
    match kind {
        SourceKind::UPower => Box::new(UPowerSource::new()),
        SourceKind::Debug => Box::new(DebugSource::new()),
    }
}
