//! Battery and power source reading.

use battery::State;

use crate::core::system_monitor::BatteryReading;

/// Read the first battery, or [`BatteryReading::Absent`] when there is none.
///
/// A missing sensor is not an error: desktops simply report `Absent`. The
/// manager is opened per call so collectors stay `Send` on every platform.
pub fn read_battery() -> BatteryReading {
    let manager = match battery::Manager::new() {
        Ok(manager) => manager,
        Err(e) => {
            log::debug!("Battery manager unavailable: {}", e);
            return BatteryReading::Absent;
        }
    };

    let mut batteries = match manager.batteries() {
        Ok(batteries) => batteries,
        Err(e) => {
            log::debug!("Failed to enumerate batteries: {}", e);
            return BatteryReading::Absent;
        }
    };

    match batteries.next() {
        Some(Ok(battery)) => BatteryReading::Present {
            percent: charge_percent(battery.state_of_charge().get::<battery::units::ratio::percent>()),
            plugged: is_plugged(battery.state()),
        },
        Some(Err(e)) => {
            log::debug!("Failed to read battery: {}", e);
            BatteryReading::Absent
        }
        None => BatteryReading::Absent,
    }
}

/// Some drivers report a full pack slightly above 100% (or NaN while calibrating)
fn charge_percent(raw: f32) -> f32 {
    if raw.is_nan() {
        0.0
    } else {
        raw.clamp(0.0, 100.0)
    }
}

fn is_plugged(state: State) -> bool {
    !matches!(state, State::Discharging | State::Empty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plugged_states() {
        assert!(is_plugged(State::Charging));
        assert!(is_plugged(State::Full));
        assert!(!is_plugged(State::Discharging));
        assert!(!is_plugged(State::Empty));
    }

    #[test]
    fn test_charge_percent_is_bounded() {
        assert_eq!(charge_percent(57.5), 57.5);
        assert_eq!(charge_percent(100.4), 100.0);
        assert_eq!(charge_percent(-1.0), 0.0);
        assert_eq!(charge_percent(f32::NAN), 0.0);
    }

    #[test]
    fn test_read_battery_reports_valid_charge() {
        // CI machines usually have no battery, which is a valid reading too
        match read_battery() {
            BatteryReading::Present { percent, .. } => {
                assert!((0.0..=100.0).contains(&percent), "charge {}", percent);
            }
            BatteryReading::Absent => {}
        }
    }
}
