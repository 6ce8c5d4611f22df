//! Merged tool catalog for one model call

use std::collections::HashMap;
use std::sync::Arc;

use super::registry::{LocalTool, LocalToolRegistry};
use crate::logging::Logger;
use crate::servers::RemoteTool;
use crate::types::ToolSpec;

/// Where a catalog entry is executed
#[derive(Clone)]
pub enum ToolOrigin {
    /// Bound directly to an in-process executor
    Local(Arc<dyn LocalTool>),
    /// Owned by the named tool server
    Remote { server: String },
}

impl std::fmt::Debug for ToolOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolOrigin::Local(tool) => f.debug_tuple("Local").field(&tool.name()).finish(),
            ToolOrigin::Remote { server } => f.debug_struct("Remote").field("server", server).finish(),
        }
    }
}

/// A tool available for the current call
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub spec: ToolSpec,
    pub origin: ToolOrigin,
}

impl ToolDescriptor {
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn is_local(&self) -> bool {
        matches!(self.origin, ToolOrigin::Local(_))
    }
}

/// Deduplicated catalog of local and remote tools
///
/// Local tools are listed first, then remote tools in server order. Names are
/// unique: a local tool shadows a remote tool of the same name, and between
/// servers the first one listed keeps the name. Every dropped duplicate is
/// logged.
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    entries: Vec<ToolDescriptor>,
    index: HashMap<String, usize>,
}

impl ToolCatalog {
    /// Merge the local registry with the remote catalog
    pub fn merge(local: &LocalToolRegistry, remote: Vec<RemoteTool>, logger: &Arc<dyn Logger>) -> Self {
        let mut catalog = Self::default();

        for tool in local.iter() {
            catalog.insert(ToolDescriptor {
                spec: tool.spec(),
                origin: ToolOrigin::Local(Arc::clone(tool)),
            });
        }

        for RemoteTool { server, spec } in remote {
            if let Some(existing) = catalog.get(&spec.name) {
                let holder = match &existing.origin {
                    ToolOrigin::Local(_) => "a local tool".to_string(),
                    ToolOrigin::Remote { server } => format!("server '{}'", server),
                };
                logger.warn(&format!(
                    "[ToolCatalog] Ignoring '{}' from server '{}': name already provided by {}",
                    spec.name, server, holder
                ));
                continue;
            }
            catalog.insert(ToolDescriptor {
                spec,
                origin: ToolOrigin::Remote { server },
            });
        }

        catalog
    }

    fn insert(&mut self, descriptor: ToolDescriptor) {
        self.index.insert(descriptor.spec.name.clone(), self.entries.len());
        self.entries.push(descriptor);
    }

    /// Look up a tool by name
    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.index.get(name).and_then(|&i| self.entries.get(i))
    }

    /// Definitions to present to the model
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.entries.iter().map(|d| d.spec.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{LogLevel, MemoryLogger, NoOpLogger};

    fn logger() -> Arc<dyn Logger> {
        Arc::new(NoOpLogger::new())
    }

    fn remote(server: &str, name: &str) -> RemoteTool {
        RemoteTool {
            server: server.to_string(),
            spec: ToolSpec::new(name, format!("{name} from {server}")),
        }
    }

    #[test]
    fn test_merge_counts_local_plus_remote() {
        let local = LocalToolRegistry::with_builtin_tools();
        let catalog = ToolCatalog::merge(
            &local,
            vec![remote("alpha", "echo"), remote("alpha", "search"), remote("beta", "fetch")],
            &logger(),
        );

        assert_eq!(catalog.len(), local.len() + 3);
        assert!(catalog.get("read_file").unwrap().is_local());
        assert!(matches!(
            catalog.get("fetch").unwrap().origin,
            ToolOrigin::Remote { ref server } if server == "beta"
        ));
    }

    #[test]
    fn test_local_wins_collision() {
        let local = LocalToolRegistry::with_builtin_tools();
        let memory = Arc::new(MemoryLogger::new());
        let shared: Arc<dyn Logger> = memory.clone();
        let catalog = ToolCatalog::merge(&local, vec![remote("alpha", "read_file")], &shared);

        assert_eq!(catalog.len(), local.len());
        let warnings = memory.messages(LogLevel::Warn);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("'read_file' from server 'alpha'"));
        assert!(warnings[0].contains("a local tool"));
        assert!(catalog.get("read_file").unwrap().is_local());
        assert_eq!(catalog.specs().iter().filter(|s| s.name == "read_file").count(), 1);
    }

    #[test]
    fn test_first_server_wins_collision() {
        let catalog = ToolCatalog::merge(
            &LocalToolRegistry::new(),
            vec![remote("alpha", "echo"), remote("beta", "echo")],
            &logger(),
        );

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("echo").unwrap().spec.description, "echo from alpha");
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = ToolCatalog::merge(&LocalToolRegistry::new(), Vec::new(), &logger());
        assert!(catalog.is_empty());
        assert!(catalog.get("anything").is_none());
    }
}
