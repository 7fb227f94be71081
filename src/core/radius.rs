pub const DEFAULT_RADIUS_METERS: u32 = 5000;
pub const MIN_RADIUS_METERS: i64 = 1000;
pub const MAX_RADIUS_METERS: i64 = 10000;

/// Search radius normalization.
///
/// Out-of-range input is reset to the default rather than clamped, so a
/// discovery call can always run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RadiusPolicy;

impl RadiusPolicy {
    pub fn normalize(&self, radius_meters: Option<i64>) -> u32 {
        match radius_meters {
            Some(r) if (MIN_RADIUS_METERS..=MAX_RADIUS_METERS).contains(&r) => r as u32,
            Some(r) => {
                tracing::debug!(requested = r, "Radius out of range, using default");
                DEFAULT_RADIUS_METERS
            }
            None => DEFAULT_RADIUS_METERS,
        }
    }
}
