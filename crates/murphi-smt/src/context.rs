//! The symbolic context: a lexically scoped mapping from AST node
//! identity to generated symbol names.
//!
//! Re-registering an id already bound in the current scope overwrites the
//! binding with a freshly minted name. That overwrite is what implements
//! single-static-assignment renaming: the translation registers a new
//! symbol on every write, and later reads resolve to the newest name.

use murphi_syntax::{Error, Location, NodeId, Result};
use std::collections::HashMap;

/// A stack of symbol tables mapping AST unique ids to generated names.
#[derive(Debug, Clone)]
pub struct SymContext {
    /// Stack of scopes, innermost last.
    scope: Vec<HashMap<NodeId, String>>,
    /// Monotonic counter used for minting symbols.
    counter: usize,
    /// Retain bindings of closed scopes in `archived`.
    archive_on_close: bool,
    archived: Vec<(NodeId, String)>,
}

impl SymContext {
    /// A fresh context with one open scope.
    pub fn new() -> Self {
        Self {
            scope: vec![HashMap::new()],
            counter: 0,
            archive_on_close: false,
            archived: Vec::new(),
        }
    }

    /// Enter a variable scope.
    pub fn open_scope(&mut self) {
        self.scope.push(HashMap::new());
    }

    /// Leave the innermost variable scope, discarding its bindings (or
    /// archiving them, if archival is enabled).
    pub fn close_scope(&mut self) {
        if self.scope.len() <= 1 {
            return;
        }
        if let Some(frame) = self.scope.pop() {
            if self.archive_on_close {
                let mut bindings: Vec<_> = frame.into_iter().collect();
                bindings.sort_unstable_by_key(|(id, _)| *id);
                self.archived.extend(bindings);
            }
        }
    }

    /// Retain bindings of closed scopes for later inspection.
    pub fn set_archive_on_close(&mut self, archive: bool) {
        self.archive_on_close = archive;
    }

    /// Bindings of closed scopes, in closing order. Empty unless archival
    /// was enabled.
    pub fn archived(&self) -> &[(NodeId, String)] {
        &self.archived
    }

    /// Bind a freshly minted name to `id` in the innermost scope and
    /// return it.
    ///
    /// An existing binding for `id` in the innermost scope is shadowed;
    /// bindings in outer scopes are untouched.
    pub fn register_symbol(&mut self, id: NodeId) -> String {
        let s = self.make_symbol();
        if let Some(frame) = self.scope.last_mut() {
            frame.insert(id, s.clone());
        }
        s
    }

    /// Look up a previously registered id, searching scopes from innermost
    /// to outermost.
    ///
    /// `origin` is the location of the node that caused the lookup, used
    /// for diagnostics.
    pub fn lookup_symbol(&self, id: NodeId, origin: &Location) -> Result<String> {
        for frame in self.scope.iter().rev() {
            if let Some(s) = frame.get(&id) {
                return Ok(s.clone());
            }
        }
        // any symbol encountered in a well-formed AST has been registered
        // by a previously encountered definition
        Err(Error::UnknownSymbol {
            message: "symbol encountered with no registered definition; translating an \
                      unvalidated AST?"
                .to_string(),
            loc: origin.clone(),
        })
    }

    fn make_symbol(&mut self) -> String {
        let s = format!("s{}", self.counter);
        self.counter += 1;
        s
    }
}

impl Default for SymContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shadowing_and_unwinding() {
        let mut ctx = SymContext::new();
        let here = Location::dummy();

        assert_eq!(ctx.register_symbol(7), "s0");
        assert_eq!(ctx.register_symbol(8), "s1");

        ctx.open_scope();
        assert_eq!(ctx.register_symbol(7), "s2");
        assert_eq!(ctx.lookup_symbol(7, &here).unwrap(), "s2");
        assert_eq!(ctx.lookup_symbol(8, &here).unwrap(), "s1");

        ctx.close_scope();
        assert_eq!(ctx.lookup_symbol(7, &here).unwrap(), "s0");
    }

    #[test]
    fn reregistration_in_the_same_scope_overwrites() {
        let mut ctx = SymContext::new();
        let here = Location::dummy();

        assert_eq!(ctx.register_symbol(3), "s0");
        assert_eq!(ctx.register_symbol(3), "s1");
        assert_eq!(ctx.lookup_symbol(3, &here).unwrap(), "s1");
    }

    #[test]
    fn lookup_of_unregistered_id_fails() {
        let ctx = SymContext::new();
        let err = ctx.lookup_symbol(42, &Location::dummy()).unwrap_err();
        assert!(matches!(err, Error::UnknownSymbol { .. }));
    }

    #[test]
    fn closing_the_outermost_scope_is_a_no_op() {
        let mut ctx = SymContext::new();
        ctx.register_symbol(1);
        ctx.close_scope();
        assert!(ctx.lookup_symbol(1, &Location::dummy()).is_ok());
    }

    #[test]
    fn archival_retains_closed_bindings() {
        let mut ctx = SymContext::new();
        ctx.set_archive_on_close(true);

        ctx.open_scope();
        ctx.register_symbol(5);
        ctx.register_symbol(6);
        ctx.close_scope();

        assert_eq!(
            ctx.archived(),
            &[(5, "s0".to_string()), (6, "s1".to_string())]
        );
        assert!(ctx.lookup_symbol(5, &Location::dummy()).is_err());
    }
}
