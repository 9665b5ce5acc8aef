use std::str::FromStr;

/// The deployments a scenario can be pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    Staging,
    Prod,
}

#[derive(Debug, Clone, derive_more::Error, derive_more::Display)]
#[display("Unknown environment [{name}], expected one of: local, staging, prod")]
pub struct UnknownEnvironmentError {
    name: String,
}

impl FromStr for Environment {
    type Err = UnknownEnvironmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Environment::Local),
            "staging" => Ok(Environment::Staging),
            "prod" => Ok(Environment::Prod),
            name => Err(UnknownEnvironmentError {
                name: name.to_string(),
            }),
        }
    }
}

impl Environment {
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Local => "http://localhost:3000",
            Environment::Staging => "https://feed-pulse-api-dev.onrender.com",
            Environment::Prod => "https://feed-pulse-api.onrender.com",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_environments_resolve() {
        assert_eq!(Environment::Local, "local".parse().unwrap());
        assert_eq!(Environment::Staging, "staging".parse().unwrap());
        assert_eq!(Environment::Prod, "prod".parse().unwrap());

        assert_eq!("http://localhost:3000", Environment::Local.base_url());
    }

    #[test]
    fn unknown_environment_is_an_error() {
        let err = "production".parse::<Environment>().unwrap_err();
        assert!(err.to_string().contains("Unknown environment [production]"));
    }
}
