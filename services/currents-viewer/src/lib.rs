//! Headless tidal currents viewer.
//!
//! Wires the workspace crates into a running session:
//! - [`config`]: view size, animation constants and field tunables
//! - [`settings`]: projection fit and values sized off the display bounds
//! - [`pipeline`]: staged initialization up to the first published field
//! - [`session`]: navigation, rebuilds and point queries
//! - [`animation`]: the particle frame loop and PNG export
//! - [`format`]: text for queried points

pub mod animation;
pub mod config;
pub mod format;
pub mod pipeline;
pub mod session;
pub mod settings;

pub use animation::{animate, AnimationOptions, AnimationReport};
pub use config::ViewerConfig;
pub use pipeline::{initialize, Initialized, Stage, ViewerInputs};
pub use session::{FieldReceiver, PointDetails, Session};
pub use settings::Settings;

/// Parse `x,y` pixel coordinates.
pub fn parse_point(s: &str) -> Result<(f64, f64), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got '{}'", s))?;
    let x = x.trim().parse().map_err(|e| format!("bad x in '{}': {}", s, e))?;
    let y = y.trim().parse().map_err(|e| format!("bad y in '{}': {}", s, e))?;
    Ok((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("120,45.5"), Ok((120.0, 45.5)));
        assert_eq!(parse_point(" 3 , 4 "), Ok((3.0, 4.0)));
        assert!(parse_point("12").is_err());
        assert!(parse_point("a,1").is_err());
    }
}
