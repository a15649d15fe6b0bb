//! Move call targets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::block::types::BlockError;

const SEPARATOR: &str = "::";

/// Fully qualified entry point: `package::module::function`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MoveTarget {
    package: String,
    module: String,
    function: String,
}

impl MoveTarget {
    /// Build a target from its three components.
    pub fn new(
        package: impl Into<String>,
        module: impl Into<String>,
        function: impl Into<String>,
    ) -> Result<Self, BlockError> {
        let target = Self {
            package: package.into(),
            module: module.into(),
            function: function.into(),
        };

        for part in [&target.package, &target.module, &target.function] {
            if part.is_empty() {
                return Err(BlockError::InvalidTarget {
                    target: target.to_string(),
                    reason: "empty component",
                });
            }
            if part.contains(':') || part.chars().any(char::is_whitespace) {
                return Err(BlockError::InvalidTarget {
                    target: target.to_string(),
                    reason: "component contains a separator or whitespace",
                });
            }
        }

        Ok(target)
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn function(&self) -> &str {
        &self.function
    }
}

impl FromStr for MoveTarget {
    type Err = BlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(SEPARATOR).collect();
        match parts.as_slice() {
            [package, module, function] => Self::new(*package, *module, *function).map_err(|e| {
                match e {
                    // Report the caller's original string rather than the re-joined one.
                    BlockError::InvalidTarget { reason, .. } => BlockError::InvalidTarget {
                        target: s.to_string(),
                        reason,
                    },
                    other => other,
                }
            }),
            _ => Err(BlockError::InvalidTarget {
                target: s.to_string(),
                reason: "expected exactly three `::`-separated components",
            }),
        }
    }
}

impl TryFrom<String> for MoveTarget {
    type Error = BlockError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MoveTarget> for String {
    fn from(target: MoveTarget) -> Self {
        target.to_string()
    }
}

impl fmt::Display for MoveTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            self.package, self.module, self.function
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target() {
        let target: MoveTarget = "0x2::oracle::authorize".parse().unwrap();
        assert_eq!(target.package(), "0x2");
        assert_eq!(target.module(), "oracle");
        assert_eq!(target.function(), "authorize");
        assert_eq!(target.to_string(), "0x2::oracle::authorize");
    }

    #[test]
    fn test_malformed_targets() {
        for bad in [
            "",
            "0x2::oracle",
            "0x2::oracle::authorize::extra",
            "0x2::::authorize",
            "::oracle::authorize",
            "0x2::oracle::",
            "0x2:::oracle::authorize",
            "0x2::ora cle::authorize",
        ] {
            let err = bad.parse::<MoveTarget>().unwrap_err();
            assert!(
                matches!(err, BlockError::InvalidTarget { ref target, .. } if target == bad),
                "expected InvalidTarget for {bad:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn test_serde_as_string() {
        let target = MoveTarget::new("0xabc", "interact", "interact").unwrap();
        let json = serde_json::to_string(&target).unwrap();
        assert_eq!(json, "\"0xabc::interact::interact\"");

        let err = serde_json::from_str::<MoveTarget>("\"0xabc::interact\"");
        assert!(err.is_err());
    }
}
