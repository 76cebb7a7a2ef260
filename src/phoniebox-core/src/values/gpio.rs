use super::{non_empty, InvalidConfig};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_HOLD_SECONDS: f64 = 1.0;

/// Pull resistor / polarity setup of a button line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PullMode {
    PullUp,
    PullDown,
    /// No internal resistor, line is active high.
    None,
    /// No internal resistor, line is active low.
    NoneInverted,
}

impl PullMode {
    const ALL: [PullMode; 4] = [
        PullMode::PullUp,
        PullMode::PullDown,
        PullMode::None,
        PullMode::NoneInverted,
    ];

    pub fn config_name(self) -> &'static str {
        match self {
            PullMode::PullUp => "pull_up",
            PullMode::PullDown => "pull_down",
            PullMode::None => "none",
            PullMode::NoneInverted => "none_invert",
        }
    }

    pub fn from_config_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.config_name() == name)
    }

    /// Internal pull resistor to enable: `Some(true)` pull-up, `Some(false)`
    /// pull-down, `None` floating.
    pub fn pull_up(self) -> Option<bool> {
        match self {
            PullMode::PullUp => Some(true),
            PullMode::PullDown => Some(false),
            PullMode::None | PullMode::NoneInverted => None,
        }
    }

    /// Explicit active level; only set for floating lines since a pull
    /// resistor already implies the polarity.
    pub fn active_high(self) -> Option<bool> {
        match self {
            PullMode::PullUp | PullMode::PullDown => None,
            PullMode::None => Some(true),
            PullMode::NoneInverted => Some(false),
        }
    }
}

impl fmt::Display for PullMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_name())
    }
}

/// Electrical setup of one GPIO line: `pull_mode[,bounce_time[,hold_time[,hold_repeat]]]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinElectricalConfig {
    pub pull_mode: PullMode,
    /// Debounce interval in milliseconds, always > 0 when set.
    pub bounce_ms: Option<u64>,
    /// Seconds a button must stay pressed to count as held, always > 0.
    pub hold_seconds: f64,
    pub hold_repeat: bool,
}

impl PinElectricalConfig {
    pub fn new(pull_mode: PullMode) -> Self {
        Self {
            pull_mode,
            bounce_ms: None,
            hold_seconds: DEFAULT_HOLD_SECONDS,
            hold_repeat: false,
        }
    }

    pub fn parse(raw: Option<&str>) -> Result<Option<Self>, InvalidConfig> {
        let Some(value) = non_empty(raw) else {
            return Ok(None);
        };

        let fields: Vec<&str> = value.split(',').map(str::trim).collect();
        if fields.len() > 4 {
            return Err(InvalidConfig::FieldCount {
                value: value.to_string(),
                expected: "1 to 4",
                found: fields.len(),
            });
        }

        let pull_mode = PullMode::from_config_name(fields[0])
            .ok_or_else(|| InvalidConfig::PullMode(fields[0].to_string()))?;
        let mut config = Self::new(pull_mode);

        if let Some(bounce) = fields.get(1) {
            config.bounce_ms = parse_bounce(bounce)?;
        }
        if let Some(hold) = fields.get(2) {
            config.hold_seconds = parse_hold(hold)?;
        }
        if let Some(repeat) = fields.get(3) {
            config.hold_repeat = parse_flag(repeat)?;
        }

        Ok(Some(config))
    }

    pub fn bounce(&self) -> Option<Duration> {
        self.bounce_ms.map(Duration::from_millis)
    }

    pub fn hold(&self) -> Duration {
        Duration::try_from_secs_f64(self.hold_seconds)
            .unwrap_or_else(|_| Duration::from_secs_f64(DEFAULT_HOLD_SECONDS))
    }
}

fn parse_bounce(field: &str) -> Result<Option<u64>, InvalidConfig> {
    if field.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    match field.parse::<i64>() {
        Ok(ms) if ms > 0 => Ok(Some(ms as u64)),
        _ => Err(InvalidConfig::BounceTime(field.to_string())),
    }
}

fn parse_hold(field: &str) -> Result<f64, InvalidConfig> {
    match field.parse::<f64>() {
        // must also fit in a Duration
        Ok(seconds) if seconds > 0.0 && Duration::try_from_secs_f64(seconds).is_ok() => {
            Ok(seconds)
        }
        _ => Err(InvalidConfig::HoldTime(field.to_string())),
    }
}

fn parse_flag(field: &str) -> Result<bool, InvalidConfig> {
    if field.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if field.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(InvalidConfig::HoldRepeat(field.to_string()))
    }
}

impl fmt::Display for PinElectricalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},", self.pull_mode)?;
        match self.bounce_ms {
            Some(ms) => write!(f, "{ms},")?,
            None => f.write_str("None,")?,
        }
        let repeat = if self.hold_repeat { "True" } else { "False" };
        write!(f, "{},{}", self.hold_seconds, repeat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<Option<PinElectricalConfig>, InvalidConfig> {
        PinElectricalConfig::parse(Some(raw))
    }

    #[test]
    fn parses_all_fields() {
        let config = parse("pull_up,150,2,False").unwrap().unwrap();
        assert_eq!(
            config,
            PinElectricalConfig {
                pull_mode: PullMode::PullUp,
                bounce_ms: Some(150),
                hold_seconds: 2.0,
                hold_repeat: false,
            }
        );

        let config = parse("pull_down,150,2.5,True").unwrap().unwrap();
        assert_eq!(config.pull_mode, PullMode::PullDown);
        assert_eq!(config.hold_seconds, 2.5);
        assert!(config.hold_repeat);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config = parse("pull_up").unwrap().unwrap();
        assert_eq!(config, PinElectricalConfig::new(PullMode::PullUp));
        assert_eq!(config.hold_seconds, 1.0);

        let config = parse("pull_up,150").unwrap().unwrap();
        assert_eq!(config.bounce_ms, Some(150));
        assert_eq!(config.hold_seconds, 1.0);
        assert!(!config.hold_repeat);
    }

    #[test]
    fn blank_values_are_not_configured() {
        assert_eq!(PinElectricalConfig::parse(None).unwrap(), None);
        assert_eq!(parse("").unwrap(), None);
        assert_eq!(parse("   ").unwrap(), None);
    }

    #[test]
    fn fields_are_trimmed() {
        let config = parse("   pull_up ,  150  , 2.50  ,  true").unwrap().unwrap();
        assert_eq!(config.pull_mode, PullMode::PullUp);
        assert_eq!(config.bounce_ms, Some(150));
        assert_eq!(config.hold_seconds, 2.5);
        assert!(config.hold_repeat);
    }

    #[test]
    fn pull_modes() {
        assert_eq!(parse("none").unwrap().unwrap().pull_mode, PullMode::None);
        assert_eq!(
            parse("none_invert").unwrap().unwrap().pull_mode,
            PullMode::NoneInverted
        );
        assert!(matches!(parse(",150"), Err(InvalidConfig::PullMode(_))));
        assert!(matches!(parse("pull"), Err(InvalidConfig::PullMode(_))));
        assert!(matches!(parse("Pull_Up"), Err(InvalidConfig::PullMode(_))));
    }

    #[test]
    fn bounce_time_must_be_positive_integer() {
        assert_eq!(parse("pull_up,None,2,False").unwrap().unwrap().bounce_ms, None);
        for bad in ["pull_up,0,2,False", "pull_up,-1,2,False", "pull_up,150.0", "pull_up,ten", "pull_up,,2", "pull_up,"] {
            assert!(
                matches!(parse(bad), Err(InvalidConfig::BounceTime(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn hold_time_must_be_positive() {
        for bad in ["pull_up,150,ten", "pull_up,150,None", "pull_up,150,-2", "pull_up,150,0", "pull_up,150,"] {
            assert!(
                matches!(parse(bad), Err(InvalidConfig::HoldTime(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn hold_time_must_fit_a_duration() {
        assert_eq!(
            parse("pull_up,150,1e300"),
            Err(InvalidConfig::HoldTime("1e300".into()))
        );
        let config = parse("pull_up,150,86400").unwrap().unwrap();
        assert_eq!(config.hold(), Duration::from_secs(86400));
    }

    #[test]
    fn hold_repeat_is_a_flag() {
        assert!(!parse("pull_up,150,2,false").unwrap().unwrap().hold_repeat);
        assert!(parse("pull_up,150,2,TRUE").unwrap().unwrap().hold_repeat);
        assert!(matches!(
            parse("pull_up,150,2,None"),
            Err(InvalidConfig::HoldRepeat(_))
        ));
        assert!(matches!(parse("pull_up,150,2,"), Err(InvalidConfig::HoldRepeat(_))));
    }

    #[test]
    fn too_many_fields() {
        assert!(matches!(
            parse("pull_up,150,2,False,"),
            Err(InvalidConfig::FieldCount { found: 5, .. })
        ));
    }

    #[test]
    fn serializes_canonical_form() {
        let config = parse("pull_up,150,2,False").unwrap().unwrap();
        assert_eq!(config.to_string(), "pull_up,150,2,False");

        let config = parse("pull_down,none,2.50,true").unwrap().unwrap();
        assert_eq!(config.to_string(), "pull_down,None,2.5,True");

        let reparsed = parse(&config.to_string()).unwrap().unwrap();
        assert_eq!(reparsed, config);
    }

    #[test]
    fn electrical_translation() {
        assert_eq!(PullMode::PullUp.pull_up(), Some(true));
        assert_eq!(PullMode::PullDown.pull_up(), Some(false));
        assert_eq!(PullMode::None.pull_up(), None);
        assert_eq!(PullMode::None.active_high(), Some(true));
        assert_eq!(PullMode::NoneInverted.active_high(), Some(false));

        let config = parse("pull_up,150,1.5").unwrap().unwrap();
        assert_eq!(config.bounce(), Some(Duration::from_millis(150)));
        assert_eq!(config.hold(), Duration::from_millis(1500));
    }
}
