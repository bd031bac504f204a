use serde::{Deserialize, Deserializer};

pub const CLOSED_ACTION: &str = "closed";
pub const PRODUCTION_BRANCH: &str = "production";

/// The slice of a pull request webhook payload that decides whether to
/// redeploy. Unknown fields are ignored and absent ones default to empty.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
pub struct PullRequestEvent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub action: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pull_request: PullRequest,
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
pub struct PullRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub merged: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub base: BranchRef,
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
pub struct BranchRef {
    #[serde(default, rename = "ref", deserialize_with = "null_as_default")]
    pub name: String,
}

/// An explicit `null` leaves the field at its zero value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl PullRequestEvent {
    /// Decodes the first JSON value in `body`; anything after it is ignored.
    /// A top-level `null` yields an empty event.
    pub fn from_slice(body: &[u8]) -> serde_json::Result<Self> {
        let first = serde_json::Deserializer::from_slice(body)
            .into_iter::<Option<Self>>()
            .next()
            .unwrap_or_else(|| {
                Err(serde::de::Error::custom(
                    "EOF while parsing a value: empty body",
                ))
            })?;
        Ok(first.unwrap_or_default())
    }

    pub fn merged(&self) -> bool {
        self.pull_request.merged
    }

    pub fn base_branch(&self) -> &str {
        &self.pull_request.base.name
    }

    /// True only for a pull request that was closed by merging it into the
    /// production branch.
    pub fn is_production_merge(&self) -> bool {
        self.action == CLOSED_ACTION && self.merged() && self.base_branch() == PRODUCTION_BRANCH
    }
}
