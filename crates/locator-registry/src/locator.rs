use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::LocatorError;

const XPATH_PREFIX: &str = "xpath=";
const CSS_PREFIX: &str = "css=";

/// Declarative expression identifying one or more elements in the rendered document.
///
/// In configuration a locator is a plain string. An explicit `xpath=` or `css=`
/// prefix picks the flavour; without one, expressions starting with `/`, `./`
/// or `(` are XPath and everything else is treated as a CSS selector.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Locator {
    XPath(String),
    Css(String),
}

impl Locator {
    pub fn xpath(expression: impl Into<String>) -> Self {
        Locator::XPath(expression.into())
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn parse(raw: &str) -> Result<Self, LocatorError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(LocatorError::Empty);
        }

        if let Some(rest) = trimmed.strip_prefix(XPATH_PREFIX) {
            return non_empty(rest, raw).map(Locator::xpath);
        }
        if let Some(rest) = trimmed.strip_prefix(CSS_PREFIX) {
            return non_empty(rest, raw).map(Locator::css);
        }

        if trimmed.starts_with('/') || trimmed.starts_with("./") || trimmed.starts_with('(') {
            Ok(Locator::xpath(trimmed))
        } else {
            Ok(Locator::css(trimmed))
        }
    }

    /// Raw expression without the flavour prefix
    pub fn expression(&self) -> &str {
        match self {
            Locator::XPath(expr) | Locator::Css(expr) => expr,
        }
    }

    pub fn flavour(&self) -> &'static str {
        match self {
            Locator::XPath(_) => "xpath",
            Locator::Css(_) => "css",
        }
    }

    pub fn is_xpath(&self) -> bool {
        matches!(self, Locator::XPath(_))
    }
}

fn non_empty(rest: &str, raw: &str) -> Result<String, LocatorError> {
    let rest = rest.trim();
    if rest.is_empty() {
        Err(LocatorError::Invalid {
            raw: raw.to_string(),
            reason: "prefix without expression".to_string(),
        })
    } else {
        Ok(rest.to_string())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.flavour(), self.expression())
    }
}

impl FromStr for Locator {
    type Err = LocatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locator::parse(s)
    }
}

impl TryFrom<String> for Locator {
    type Error = LocatorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Locator::parse(&value)
    }
}

impl From<Locator> for String {
    fn from(locator: Locator) -> Self {
        match locator {
            Locator::XPath(expr) => format!("{XPATH_PREFIX}{expr}"),
            Locator::Css(expr) => format!("{CSS_PREFIX}{expr}"),
        }
    }
}
