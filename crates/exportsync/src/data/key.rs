use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::RetrieveError;

/// Identifier scoping one logical retrieval, usually an application id.
///
/// Never empty or whitespace-only. Cloning is cheap.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey(Arc<str>);

impl ResourceKey {
    pub fn new(key: impl AsRef<str>) -> Result<Self, RetrieveError> {
        let key = key.as_ref();
        if key.trim().is_empty() {
            return Err(RetrieveError::InvalidKey(key.to_string()));
        }
        Ok(Self(Arc::from(key)))
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl FromStr for ResourceKey {
    type Err = RetrieveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { Self::new(s) }
}

impl Borrow<str> for ResourceKey {
    fn borrow(&self) -> &str { &self.0 }
}

impl AsRef<str> for ResourceKey {
    fn as_ref(&self) -> &str { &self.0 }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}
