// Domain line-builders. Each turns a (possibly malformed) model payload into a
// line sequence; shape failures are replaced by a static fallback upstream of
// the renderers, so the layout core only ever sees well-formed lines.

pub mod calendar;
pub mod campaign;
pub mod identity_kit;
pub mod payload;

pub use payload::{from_value_or_fallback, Validated};
