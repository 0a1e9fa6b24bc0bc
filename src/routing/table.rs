//! Route table construction and lookup.
//!
//! # Responsibilities
//! - Map each executable to a resource path (`/<basename>`, or `/` for `_`)
//! - Register the root executable as the wildcard fallback when enabled
//! - Resolve a request path to a route or an explicit no-match
//! - Produce the operator mapping report
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) exact lookup via HashMap; the wildcard lives outside the map
//! - Duplicate resource paths: last registration wins
//! - `/` is only ever matched exactly, never through the wildcard

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::PathBuf;

use crate::routing::discovery::ExecutableDescriptor;

/// Resource path of the root resource.
pub const ROOT_RESOURCE: &str = "/";

/// Basename of the executable that handles [`ROOT_RESOURCE`].
pub const ROOT_EXEC_NAME: &str = "_";

/// How the report renders the wildcard mapping.
const WILDCARD_REPR: &str = "*";

/// How a route entry was registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Exact,
    Root,
    Wildcard,
}

/// A resolved route: the resource it answers for and the executable behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    resource_path: String,
    executable: ExecutableDescriptor,
    kind: RouteKind,
}

impl RouteEntry {
    pub fn resource_path(&self) -> &str {
        &self.resource_path
    }

    pub fn executable(&self) -> &ExecutableDescriptor {
        &self.executable
    }

    pub fn kind(&self) -> RouteKind {
        self.kind
    }
}

/// Immutable mapping from resource paths to executables.
#[derive(Debug, Default)]
pub struct RoutingTable {
    routes: HashMap<String, RouteEntry>,
    wildcard: Option<RouteEntry>,
    /// `(resource, executable path)` in registration order.
    mappings: Vec<(String, PathBuf)>,
}

impl RoutingTable {
    /// Build the table from discovered executables.
    pub fn build(executables: impl IntoIterator<Item = ExecutableDescriptor>, wildcard: bool) -> Self {
        let mut table = Self::default();
        let mut wildcard_mapping = None;

        for executable in executables {
            let (resource_path, kind) = if executable.basename() == ROOT_EXEC_NAME {
                if wildcard {
                    wildcard_mapping = Some(executable.path().to_path_buf());
                    table.wildcard = Some(RouteEntry {
                        resource_path: WILDCARD_REPR.to_string(),
                        executable: executable.clone(),
                        kind: RouteKind::Wildcard,
                    });
                }
                (ROOT_RESOURCE.to_string(), RouteKind::Root)
            } else {
                (format!("{}{}", ROOT_RESOURCE, executable.basename()), RouteKind::Exact)
            };

            table
                .mappings
                .push((resource_path.clone(), executable.path().to_path_buf()));

            let entry = RouteEntry {
                resource_path: resource_path.clone(),
                executable,
                kind,
            };
            if let Some(previous) = table.routes.insert(resource_path, entry) {
                tracing::debug!(
                    resource = %previous.resource_path,
                    replaced = %previous.executable.path().display(),
                    "Resource registered twice, keeping the later executable"
                );
            }
        }

        // The wildcard line always comes last in the report.
        if let Some(path) = wildcard_mapping {
            table.mappings.push((WILDCARD_REPR.to_string(), path));
        }

        table
    }

    /// Resolve a decoded request path.
    ///
    /// Exact match first (this is also how `/` reaches the root executable),
    /// then the wildcard entry if one is registered.
    pub fn resolve(&self, path: &str) -> Option<&RouteEntry> {
        self.routes.get(path).or(self.wildcard.as_ref())
    }

    /// Exact entry for `path`, ignoring the wildcard.
    pub fn get(&self, path: &str) -> Option<&RouteEntry> {
        self.routes.get(path)
    }

    pub fn wildcard(&self) -> Option<&RouteEntry> {
        self.wildcard.as_ref()
    }

    /// Number of distinct resource paths (the wildcard is not counted).
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Tab-aligned `resource -> executable path` lines.
    pub fn report(&self) -> String {
        let width = self
            .mappings
            .iter()
            .map(|(resource, _)| resource.chars().count())
            .max()
            .unwrap_or(0)
            + 1;

        let mut out = String::new();
        for (resource, path) in &self.mappings {
            let _ = writeln!(out, "{:<width$}{:<3}{}", resource, "->", path.display());
        }
        out
    }
}
