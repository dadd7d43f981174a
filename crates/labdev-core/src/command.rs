use std::fmt::{Display, Formatter};
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimaryCommand {
    Init,
    Build,
    Develop,
    Link,
}

impl PrimaryCommand {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Build => "build",
            Self::Develop => "develop",
            Self::Link => "link",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandRef {
    pub primary: PrimaryCommand,
    pub selector: Option<String>,
}

impl CommandRef {
    pub fn canonical(&self) -> String {
        match &self.selector {
            Some(selector) => format!("{}:{}", self.primary.as_str(), selector),
            None => self.primary.as_str().to_string(),
        }
    }
}

impl Display for CommandRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

#[derive(Debug, Error)]
pub enum CommandParseError {
    #[error("unknown command '{0}'")]
    UnknownPrimary(String),
}

impl FromStr for CommandRef {
    type Err = CommandParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut parts = value.splitn(2, ':');
        let primary_text = parts.next().unwrap_or_default();
        let selector = parts.next().map(ToOwned::to_owned);

        let primary = match primary_text {
            "init" => PrimaryCommand::Init,
            "build" => PrimaryCommand::Build,
            "develop" => PrimaryCommand::Develop,
            "link" => PrimaryCommand::Link,
            _ => return Err(CommandParseError::UnknownPrimary(primary_text.to_string())),
        };

        Ok(Self { primary, selector })
    }
}
