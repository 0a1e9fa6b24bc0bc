//! Child environment policy.
//!
//! Decides which variables, beyond the CGI ones, every child process gets.

use std::ffi::OsString;

/// Extra environment handed to every CGI child.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChildEnvironmentPolicy {
    /// Nothing beyond what the CGI layer injects.
    #[default]
    Inherit,
    /// The server's own environment, captured when the policy was resolved.
    CopyParent(Vec<(OsString, OsString)>),
    /// Exactly these `key=value` entries, kept as given.
    Explicit(Vec<String>),
}

impl ChildEnvironmentPolicy {
    /// Resolve the policy from the `copyenv` flag and the `withenv` list.
    ///
    /// A non-empty `with_env` always wins over `copy_parent`.
    pub fn resolve(copy_parent: bool, with_env: &str) -> Self {
        if !with_env.is_empty() {
            let entries = with_env.split(',').map(str::to_string).collect();
            Self::Explicit(entries)
        } else if copy_parent {
            Self::CopyParent(std::env::vars_os().collect())
        } else {
            Self::Inherit
        }
    }

    /// Variables this policy contributes, in order.
    ///
    /// Explicit entries split on their first `=`. An entry without one
    /// becomes a variable with an empty value; empty entries are dropped.
    pub fn vars(&self) -> Vec<(OsString, OsString)> {
        match self {
            Self::Inherit => Vec::new(),
            Self::CopyParent(vars) => vars.clone(),
            Self::Explicit(entries) => entries
                .iter()
                .filter(|entry| !entry.is_empty())
                .map(|entry| {
                    let (key, value) = entry.split_once('=').unwrap_or((entry.as_str(), ""));
                    (OsString::from(key), OsString::from(value))
                })
                .collect(),
        }
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Inherit => "inherit",
            Self::CopyParent(_) => "copy-parent",
            Self::Explicit(_) => "explicit",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(policy: &ChildEnvironmentPolicy) -> Vec<(String, String)> {
        policy
            .vars()
            .into_iter()
            .map(|(k, v)| (k.into_string().unwrap(), v.into_string().unwrap()))
            .collect()
    }

    #[test]
    fn test_defaults_to_inherit() {
        let policy = ChildEnvironmentPolicy::resolve(false, "");
        assert_eq!(policy, ChildEnvironmentPolicy::Inherit);
        assert!(policy.vars().is_empty());
    }

    #[test]
    fn test_explicit_list() {
        let policy = ChildEnvironmentPolicy::resolve(false, "A=1,B=2");
        assert_eq!(
            policy,
            ChildEnvironmentPolicy::Explicit(vec!["A=1".into(), "B=2".into()])
        );
        assert_eq!(
            pairs(&policy),
            vec![("A".into(), "1".into()), ("B".into(), "2".into())]
        );
    }

    #[test]
    fn test_explicit_wins_over_copy() {
        let policy = ChildEnvironmentPolicy::resolve(true, "A=1");
        assert!(matches!(policy, ChildEnvironmentPolicy::Explicit(_)));
    }

    #[test]
    fn test_split_on_first_equals_only() {
        let policy = ChildEnvironmentPolicy::resolve(false, "URL=a=b");
        assert_eq!(pairs(&policy), vec![("URL".into(), "a=b".into())]);
    }

    #[test]
    fn test_malformed_entries_are_not_errors() {
        let policy = ChildEnvironmentPolicy::resolve(false, "NOVALUE,,X=");
        assert_eq!(
            pairs(&policy),
            vec![("NOVALUE".into(), String::new()), ("X".into(), String::new())]
        );
    }

    #[test]
    fn test_copy_parent_snapshots_environment() {
        let policy = ChildEnvironmentPolicy::resolve(true, "");
        assert_eq!(policy.name(), "copy-parent");

        let vars = policy.vars();
        for (key, value) in std::env::vars_os() {
            assert!(vars.contains(&(key, value)));
        }
    }
}
