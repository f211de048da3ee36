//! GPIO pin abstractions
//!
//! The bridge only needs to hand a pin pair to the I2C block and control
//! the internal pull-ups on it.

/// SDA/SCL pin pair of one I2C channel
///
/// Implementations should handle the actual pad and function-select
/// register manipulation for the specific chip.
pub trait I2cPins {
    /// Route both pins to the I2C peripheral
    fn select_i2c_function(&mut self);

    /// Enable the internal pull-ups on both pins
    fn enable_pull_ups(&mut self);

    /// Disable pull-ups and pull-downs on both pins
    fn disable_pulls(&mut self);

    /// Set the pull-ups to a specific state
    fn set_pull_ups(&mut self, enabled: bool) {
        if enabled {
            self.enable_pull_ups();
        } else {
            self.disable_pulls();
        }
    }
}
