use std::fmt;

/// Identifies a cached result: the endpoint plus its serialized arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    endpoint: String,
    args: String,
}

impl QueryKey {
    pub fn new(endpoint: impl Into<String>, args: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            args: args.into(),
        }
    }

    /// Key for an endpoint that takes no arguments
    pub fn endpoint(endpoint: impl Into<String>) -> Self {
        Self::new(endpoint, "")
    }

    pub fn endpoint_name(&self) -> &str {
        &self.endpoint
    }

    pub fn args(&self) -> &str {
        &self.args
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.endpoint, self.args)
    }
}

/// Entity-type label; invalidating a tag marks every entry carrying it stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag(&'static str);

impl Tag {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}
