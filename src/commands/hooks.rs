//! Callbacks run between parsing and dispatch.

use super::namespace::Namespace;

/// A hook sees, and may rewrite, the parsed result.
pub type AfterParseHook = Box<dyn Fn(&mut Namespace) -> anyhow::Result<()>>;

/// Ordered list of after-parse hooks.
///
/// Hooks run in registration order. The first failure stops the chain and
/// the handler is not called.
#[derive(Default)]
pub struct HookChain {
    hooks: Vec<AfterParseHook>,
}

impl HookChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, hook: F)
    where
        F: Fn(&mut Namespace) -> anyhow::Result<()> + 'static,
    {
        self.hooks.push(Box::new(hook));
    }

    pub fn run(&self, ns: &mut Namespace) -> anyhow::Result<()> {
        for (index, hook) in self.hooks.iter().enumerate() {
            tracing::trace!(hook = index, "running after-parse hook");
            hook(ns)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl std::fmt::Debug for HookChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookChain")
            .field("hooks", &self.hooks.len())
            .finish()
    }
}
