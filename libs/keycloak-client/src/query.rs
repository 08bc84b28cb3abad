//! Query-string filters for list endpoints
//!
//! Every filter starts with `?max={max}` and appends the remaining fields in a
//! fixed order, skipping unset values and blank strings.

const DEFAULT_MAX: u32 = 100;

/// Incremental `?a=1&b=2` builder. Values are percent-encoded.
#[derive(Debug, Default)]
pub(crate) struct QueryBuilder {
    query: String,
}

impl QueryBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_max(max: u32) -> Self {
        let mut builder = Self::new();
        builder.push("max", &max.to_string());
        builder
    }

    fn push(&mut self, name: &str, value: &str) {
        self.query.push(if self.query.is_empty() { '?' } else { '&' });
        self.query.push_str(name);
        self.query.push('=');
        self.query.push_str(&urlencoding::encode(value));
    }

    pub(crate) fn text(mut self, name: &str, value: Option<&str>) -> Self {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            self.push(name, value);
        }
        self
    }

    pub(crate) fn flag(mut self, name: &str, value: Option<bool>) -> Self {
        if let Some(value) = value {
            self.push(name, if value { "true" } else { "false" });
        }
        self
    }

    pub(crate) fn number(mut self, name: &str, value: Option<u32>) -> Self {
        if let Some(value) = value {
            self.push(name, &value.to_string());
        }
        self
    }

    pub(crate) fn build(self) -> String {
        self.query
    }
}

/// Pagination and search shared by most list endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub max: u32,
    pub brief_representation: Option<bool>,
    pub first: Option<u32>,
    pub search: Option<String>,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            max: DEFAULT_MAX,
            brief_representation: None,
            first: None,
            search: None,
        }
    }
}

impl Filter {
    pub fn to_query(&self) -> String {
        QueryBuilder::with_max(self.max)
            .flag("briefRepresentation", self.brief_representation)
            .number("first", self.first)
            .text("search", self.search.as_deref())
            .build()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientFilter {
    pub max: u32,
    pub first: Option<u32>,
    pub search: Option<String>,
    /// Attribute query, `key1:value1 key2:value2`
    pub q: Option<String>,
    pub viewable_only: Option<bool>,
}

impl Default for ClientFilter {
    fn default() -> Self {
        Self {
            max: DEFAULT_MAX,
            first: None,
            search: None,
            q: None,
            viewable_only: None,
        }
    }
}

impl ClientFilter {
    pub fn to_query(&self) -> String {
        QueryBuilder::with_max(self.max)
            .number("first", self.first)
            .text("search", self.search.as_deref())
            .text("q", self.q.as_deref())
            .flag("viewableOnly", self.viewable_only)
            .build()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupFilter {
    pub max: u32,
    pub brief_representation: Option<bool>,
    pub first: Option<u32>,
    pub q: Option<String>,
    pub search: Option<String>,
    pub exact: Option<bool>,
    /// Only top-level groups
    pub top: Option<bool>,
}

impl Default for GroupFilter {
    fn default() -> Self {
        Self {
            max: DEFAULT_MAX,
            brief_representation: None,
            first: None,
            q: None,
            search: None,
            exact: None,
            top: None,
        }
    }
}

impl GroupFilter {
    pub fn to_query(&self) -> String {
        QueryBuilder::with_max(self.max)
            .flag("briefRepresentation", self.brief_representation)
            .number("first", self.first)
            .text("q", self.q.as_deref())
            .text("search", self.search.as_deref())
            .flag("exact", self.exact)
            .flag("top", self.top)
            .build()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFilter {
    pub max: u32,
    pub brief_representation: Option<bool>,
    pub email: Option<String>,
    pub email_verified: Option<bool>,
    pub enabled: Option<bool>,
    pub exact: Option<bool>,
    pub first: Option<u32>,
    pub first_name: Option<String>,
    pub idp_alias: Option<String>,
    pub idp_user_id: Option<String>,
    pub last_name: Option<String>,
    pub q: Option<String>,
    pub search: Option<String>,
    pub username: Option<String>,
}

impl Default for UserFilter {
    fn default() -> Self {
        Self {
            max: DEFAULT_MAX,
            brief_representation: None,
            email: None,
            email_verified: None,
            enabled: None,
            exact: None,
            first: None,
            first_name: None,
            idp_alias: None,
            idp_user_id: None,
            last_name: None,
            q: None,
            search: None,
            username: None,
        }
    }
}

impl UserFilter {
    pub fn to_query(&self) -> String {
        QueryBuilder::with_max(self.max)
            .flag("briefRepresentation", self.brief_representation)
            .text("email", self.email.as_deref())
            .flag("emailVerified", self.email_verified)
            .flag("enabled", self.enabled)
            .flag("exact", self.exact)
            .number("first", self.first)
            .text("firstName", self.first_name.as_deref())
            .text("idpAlias", self.idp_alias.as_deref())
            .text("idpUserId", self.idp_user_id.as_deref())
            .text("lastName", self.last_name.as_deref())
            .text("q", self.q.as_deref())
            .text("search", self.search.as_deref())
            .text("username", self.username.as_deref())
            .build()
    }
}
