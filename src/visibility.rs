use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identity token. Only compared for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    /// Readable by every caller, writable only by seeding.
    Public,
    User(UserId),
}

impl Owner {
    pub fn from_column(value: Option<String>) -> Self {
        match value {
            Some(id) => Owner::User(UserId(id)),
            None => Owner::Public,
        }
    }

    pub fn as_column(&self) -> Option<&str> {
        match self {
            Owner::Public => None,
            Owner::User(id) => Some(id.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    User(UserId),
}

impl Caller {
    /// Empty or whitespace-only tokens are treated as anonymous.
    pub fn from_token(token: Option<&str>) -> Self {
        match token.map(str::trim) {
            Some(id) if !id.is_empty() => Caller::User(UserId::new(id)),
            _ => Caller::Anonymous,
        }
    }

    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Caller::Anonymous => None,
            Caller::User(id) => Some(id),
        }
    }

    pub fn can_read(&self, owner: &Owner) -> bool {
        match owner {
            Owner::Public => true,
            Owner::User(id) => self.user_id() == Some(id),
        }
    }

    pub fn can_write(&self, owner: &Owner) -> bool {
        match owner {
            Owner::Public => false,
            Owner::User(id) => self.user_id() == Some(id),
        }
    }

    /// SQL form of [`Caller::can_read`] over `column`, reading the caller
    /// from numbered parameter `?{param}`, which must be bound to
    /// [`Caller::sql_param`]. Anonymous callers bind NULL, and `col = NULL`
    /// never holds, so only public rows survive.
    pub fn sql_filter(column: &str, param: usize) -> String {
        format!("({column} IS NULL OR {column} = ?{param})")
    }

    pub fn sql_param(&self) -> Option<&str> {
        self.user_id().map(UserId::as_str)
    }
}

pub trait OwnedRecord {
    fn owner(&self) -> &Owner;
}

pub fn visible_predicate<R: OwnedRecord>(caller: &Caller) -> impl Fn(&R) -> bool + '_ {
    move |record| caller.can_read(record.owner())
}
