//! Lexical environment: value bindings, type aliases, and classes.

use magus_core::Atom;
use magus_hir::{ClassId, TypeAnn, TypeId, TypeParamAnn};
use rustc_hash::FxHashMap;

/// A registered `type Name<...> = ...` declaration.
///
/// Non-generic aliases are resolved eagerly at the declaration site and
/// cached; generic aliases keep their body annotation and re-resolve per
/// application with the type arguments bound.
#[derive(Clone, Copy)]
pub struct AliasDef<'a> {
    pub type_params: &'a [TypeParamAnn<'a>],
    pub body: &'a TypeAnn<'a>,
    pub resolved: Option<TypeId>,
}

#[derive(Default)]
struct Scope<'a> {
    values: FxHashMap<Atom, TypeId>,
    aliases: FxHashMap<Atom, AliasDef<'a>>,
    classes: FxHashMap<Atom, ClassId>,
}

/// A stack of lexical scopes. Lookup walks innermost to outermost.
pub struct Environment<'a> {
    scopes: Vec<Scope<'a>>,
}

impl<'a> Environment<'a> {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    pub fn pop_scope(&mut self) {
        debug_assert!(self.scopes.len() > 1);
        self.scopes.pop();
    }

    pub fn bind_value(&mut self, name: Atom, ty: TypeId) {
        self.scopes.last_mut().unwrap().values.insert(name, ty);
    }

    pub fn lookup_value(&self, name: Atom) -> Option<TypeId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|s| s.values.get(&name).copied())
    }

    pub fn bind_alias(&mut self, name: Atom, def: AliasDef<'a>) {
        self.scopes.last_mut().unwrap().aliases.insert(name, def);
    }

    pub fn lookup_alias(&self, name: Atom) -> Option<AliasDef<'a>> {
        self.scopes
            .iter()
            .rev()
            .find_map(|s| s.aliases.get(&name).copied())
    }

    pub fn bind_class(&mut self, name: Atom, class: ClassId) {
        self.scopes.last_mut().unwrap().classes.insert(name, class);
    }

    pub fn lookup_class(&self, name: Atom) -> Option<ClassId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|s| s.classes.get(&name).copied())
    }
}

impl<'a> Default for Environment<'a> {
    fn default() -> Self {
        Self::new()
    }
}
