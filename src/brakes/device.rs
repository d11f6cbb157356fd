//! Brake-capable devices.

/// A device whose brake mode can be switched (typically a motor controller).
///
/// Called from the tick thread (engage) and from a deferred timer (release),
/// so implementations must be thread-safe and return quickly.
pub trait BrakeDevice: Send + Sync + 'static {
    /// Engages (`true`) or releases (`false`) the brake.
    fn set_brake_mode(&self, enabled: bool);

    /// Device name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
