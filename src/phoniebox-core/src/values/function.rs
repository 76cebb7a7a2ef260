use super::{non_empty, ArgValue, InvalidConfig};
use std::collections::BTreeMap;
use std::fmt;

/// Function bound to a button edge: `fn_type[,key=value]*`.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionConfig {
    pub fn_type: String,
    pub args: BTreeMap<String, ArgValue>,
}

impl FunctionConfig {
    pub fn new(fn_type: impl Into<String>) -> Self {
        Self {
            fn_type: fn_type.into(),
            args: BTreeMap::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: ArgValue) -> Self {
        self.args.insert(key.into(), value);
        self
    }

    pub fn parse(raw: Option<&str>) -> Result<Option<Self>, InvalidConfig> {
        let Some(value) = non_empty(raw) else {
            return Ok(None);
        };

        let mut fields = value.split(',');
        let fn_type = fields.next().unwrap_or_default().trim();
        if fn_type.is_empty() {
            return Err(InvalidConfig::EmptyFunction(value.to_string()));
        }

        let mut config = Self::new(fn_type);
        for pair in fields {
            let (key, literal) = pair
                .split_once('=')
                .ok_or_else(|| InvalidConfig::MissingAssignment(pair.trim().to_string()))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(InvalidConfig::EmptyArgumentName(pair.trim().to_string()));
            }
            // later duplicates replace earlier ones
            config
                .args
                .insert(key.to_string(), ArgValue::parse_literal(literal)?);
        }

        Ok(Some(config))
    }

    pub fn arg(&self, key: &str) -> Option<&ArgValue> {
        self.args.get(key)
    }
}

impl fmt::Display for FunctionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fn_type)?;
        for (key, value) in &self.args {
            write!(f, ",{key}={value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<Option<FunctionConfig>, InvalidConfig> {
        FunctionConfig::parse(Some(raw))
    }

    #[test]
    fn parses_name_without_args() {
        let config = parse("some_fn").unwrap().unwrap();
        assert_eq!(config.fn_type, "some_fn");
        assert!(config.args.is_empty());
    }

    #[test]
    fn parses_keyword_args() {
        let config = parse("some_fn,a=0,b = '1',c = 'bla'").unwrap().unwrap();
        assert_eq!(config.fn_type, "some_fn");
        assert_eq!(config.args.len(), 3);
        assert_eq!(config.arg("a"), Some(&ArgValue::Int(0)));
        assert_eq!(config.arg("b"), Some(&ArgValue::Str("1".into())));
        assert_eq!(config.arg("c"), Some(&ArgValue::Str("bla".into())));
    }

    #[test]
    fn last_duplicate_key_wins() {
        let config = parse("seek_fwd,seconds=5,seconds=10").unwrap().unwrap();
        assert_eq!(config.arg("seconds"), Some(&ArgValue::Int(10)));
    }

    #[test]
    fn blank_values_are_not_configured() {
        assert_eq!(FunctionConfig::parse(None).unwrap(), None);
        assert_eq!(parse("").unwrap(), None);
        assert_eq!(parse("   ").unwrap(), None);
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(matches!(parse(","), Err(InvalidConfig::EmptyFunction(_))));
        assert!(matches!(parse(",a=0"), Err(InvalidConfig::EmptyFunction(_))));
        assert!(matches!(parse("some_fn,"), Err(InvalidConfig::MissingAssignment(_))));
        assert!(matches!(parse("some_fn,a=0,"), Err(InvalidConfig::MissingAssignment(_))));
        assert!(matches!(parse("some_fn,a=bla"), Err(InvalidConfig::Literal(_))));
        assert!(matches!(parse("some_fn,=1"), Err(InvalidConfig::EmptyArgumentName(_))));
    }

    #[test]
    fn serializes_canonical_form() {
        assert_eq!(FunctionConfig::new("some_fn").to_string(), "some_fn");

        let config = FunctionConfig::new("some_fn")
            .with_arg("b", ArgValue::Str("blub".into()))
            .with_arg("a", ArgValue::Int(0));
        assert_eq!(config.to_string(), "some_fn,a=0,b='blub'");
    }

    #[test]
    fn serialized_form_reparses() {
        for raw in ["vol_up,vol_step=10", "seek_bwd, seconds = 2.5", "x,s=\"q\",flag=True"] {
            let parsed = parse(raw).unwrap().unwrap();
            let reparsed = parse(&parsed.to_string()).unwrap().unwrap();
            assert_eq!(reparsed, parsed, "{raw}");
        }
    }
}
