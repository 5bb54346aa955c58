//! Type representation: the interned type table and class registry.
//!
//! Every type the checker reasons about lives in a [`TypeTable`], a flat
//! arena of [`Type`] nodes addressed by [`TypeId`]. Nodes are interned by
//! structural shape, so two structurally identical types always share one
//! `TypeId` and structural equality is an integer comparison. Nodes are
//! never mutated after construction; derived types allocate new nodes.

use indexmap::IndexMap;
use magus_core::{Atom, StringInterner};
use magus_hir::{ClassId, TypeFlags, TypeId};
use rustc_hash::{FxHashMap, FxHashSet};

/// Maximum recursion depth when printing a type.
const MAX_PRINT_DEPTH: usize = 20;

/// The built-in non-literal types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntrinsicKind {
    Unknown,
    Never,
    String,
    Number,
    Boolean,
    Null,
    Undefined,
    Void,
}

impl IntrinsicKind {
    pub fn name(self) -> &'static str {
        match self {
            IntrinsicKind::Unknown => "unknown",
            IntrinsicKind::Never => "never",
            IntrinsicKind::String => "string",
            IntrinsicKind::Number => "number",
            IntrinsicKind::Boolean => "boolean",
            IntrinsicKind::Null => "null",
            IntrinsicKind::Undefined => "undefined",
            IntrinsicKind::Void => "void",
        }
    }
}

/// Whether an object type tolerates extra fields on the source side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Exactness {
    /// `{| x: T |}`: rejects values with fields beyond those declared.
    Exact,
    /// `{ x: T }`: tolerates extra fields.
    Inexact,
}

/// A declared type parameter with an optional upper bound.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeParam {
    pub name: Atom,
    pub constraint: Option<TypeId>,
}

/// The shape of a single type node.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Intrinsic(IntrinsicKind),
    StringLiteral(Atom),
    NumberLiteral(f64),
    BooleanLiteral(bool),
    /// Field order is insertion order; it drives `$Keys`/`$Values`/`$Pick`/
    /// `$Omit` output ordering but never subtyping.
    Object {
        fields: IndexMap<Atom, TypeId>,
        exactness: Exactness,
    },
    /// Members are deduplicated; a single-member union collapses on
    /// construction, so a `Union` node always has two or more members.
    Union { members: Vec<TypeId> },
    Intersection { members: Vec<TypeId> },
    Function {
        params: Vec<TypeId>,
        return_type: TypeId,
        type_params: Vec<TypeParam>,
        thrown: Option<TypeId>,
    },
    /// A class instance type. Nominal: subtyping walks the class chain.
    Class { class: ClassId },
    /// The `$Class<I>` counterpart: the constructor value's type.
    ClassConstructor { class: ClassId },
    Array { element: TypeId },
    /// The immutable qualifier. Never double-wrapped.
    Readonly { inner: TypeId },
    TypeParameter {
        name: Atom,
        constraint: Option<TypeId>,
    },
    /// A generic target applied to arguments, instantiation pending.
    GenericApplication { target: TypeId, args: Vec<TypeId> },
}

/// A type node: its id, classification flags, and shape.
#[derive(Debug, Clone)]
pub struct Type {
    pub id: TypeId,
    pub flags: TypeFlags,
    pub kind: TypeKind,
}

/// Hashable interning key mirroring [`TypeKind`].
///
/// Number literals key on the bit pattern so `f64` can participate in
/// `Eq`/`Hash`; object fields key on iteration order, so two objects with
/// the same fields in different insertion order intern separately (order is
/// observable through `$Keys`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum TypeKey {
    Intrinsic(IntrinsicKind),
    StringLiteral(Atom),
    NumberLiteral(u64),
    BooleanLiteral(bool),
    Object(Vec<(Atom, TypeId)>, Exactness),
    Union(Vec<TypeId>),
    Intersection(Vec<TypeId>),
    Function(Vec<TypeId>, TypeId, Vec<(Atom, Option<TypeId>)>, Option<TypeId>),
    Class(ClassId),
    ClassConstructor(ClassId),
    Array(TypeId),
    Readonly(TypeId),
    TypeParameter(Atom, Option<TypeId>),
    GenericApplication(TypeId, Vec<TypeId>),
}

fn key_of(kind: &TypeKind) -> TypeKey {
    match kind {
        TypeKind::Intrinsic(k) => TypeKey::Intrinsic(*k),
        TypeKind::StringLiteral(v) => TypeKey::StringLiteral(*v),
        TypeKind::NumberLiteral(v) => TypeKey::NumberLiteral(v.to_bits()),
        TypeKind::BooleanLiteral(v) => TypeKey::BooleanLiteral(*v),
        TypeKind::Object { fields, exactness } => TypeKey::Object(
            fields.iter().map(|(k, v)| (*k, *v)).collect(),
            *exactness,
        ),
        TypeKind::Union { members } => TypeKey::Union(members.clone()),
        TypeKind::Intersection { members } => TypeKey::Intersection(members.clone()),
        TypeKind::Function {
            params,
            return_type,
            type_params,
            thrown,
        } => TypeKey::Function(
            params.clone(),
            *return_type,
            type_params
                .iter()
                .map(|tp| (tp.name, tp.constraint))
                .collect(),
            *thrown,
        ),
        TypeKind::Class { class } => TypeKey::Class(*class),
        TypeKind::ClassConstructor { class } => TypeKey::ClassConstructor(*class),
        TypeKind::Array { element } => TypeKey::Array(*element),
        TypeKind::Readonly { inner } => TypeKey::Readonly(*inner),
        TypeKind::TypeParameter { name, constraint } => {
            TypeKey::TypeParameter(*name, *constraint)
        }
        TypeKind::GenericApplication { target, args } => {
            TypeKey::GenericApplication(*target, args.clone())
        }
    }
}

fn flags_of(kind: &TypeKind) -> TypeFlags {
    match kind {
        TypeKind::Intrinsic(IntrinsicKind::Unknown) => TypeFlags::UNKNOWN,
        TypeKind::Intrinsic(IntrinsicKind::Never) => TypeFlags::NEVER,
        TypeKind::Intrinsic(IntrinsicKind::String) => TypeFlags::STRING,
        TypeKind::Intrinsic(IntrinsicKind::Number) => TypeFlags::NUMBER,
        TypeKind::Intrinsic(IntrinsicKind::Boolean) => TypeFlags::BOOLEAN,
        TypeKind::Intrinsic(IntrinsicKind::Null) => TypeFlags::NULL,
        TypeKind::Intrinsic(IntrinsicKind::Undefined) => TypeFlags::UNDEFINED,
        TypeKind::Intrinsic(IntrinsicKind::Void) => TypeFlags::VOID,
        TypeKind::StringLiteral(_) => TypeFlags::STRING_LITERAL,
        TypeKind::NumberLiteral(_) => TypeFlags::NUMBER_LITERAL,
        TypeKind::BooleanLiteral(_) => TypeFlags::BOOLEAN_LITERAL,
        TypeKind::Object { .. } => TypeFlags::OBJECT,
        TypeKind::Union { .. } => TypeFlags::UNION,
        TypeKind::Intersection { .. } => TypeFlags::INTERSECTION,
        TypeKind::Function { .. } => TypeFlags::FUNCTION,
        TypeKind::Class { .. } => TypeFlags::CLASS,
        TypeKind::ClassConstructor { .. } => TypeFlags::CLASS_CONSTRUCTOR,
        TypeKind::Array { .. } => TypeFlags::ARRAY,
        TypeKind::Readonly { .. } => TypeFlags::READONLY,
        TypeKind::TypeParameter { .. } => TypeFlags::TYPE_PARAMETER,
        TypeKind::GenericApplication { .. } => TypeFlags::GENERIC_APPLICATION,
    }
}

/// A registered class declaration.
#[derive(Debug, Clone)]
pub struct ClassDef {
    pub name: Atom,
    pub superclass: Option<ClassId>,
    /// The structural instance shape (always an `Object` type node).
    pub shape: TypeId,
    pub type_params: Vec<TypeParam>,
}

/// The type table: a flat arena of interned type nodes plus the class
/// registry, shared by one checking pass.
pub struct TypeTable {
    types: Vec<Type>,
    intern: FxHashMap<TypeKey, TypeId>,
    classes: Vec<ClassDef>,
    strings: StringInterner,

    pub unknown: TypeId,
    pub never: TypeId,
    pub string: TypeId,
    pub number: TypeId,
    pub boolean: TypeId,
    pub null: TypeId,
    pub undefined: TypeId,
    pub void: TypeId,
}

impl TypeTable {
    pub fn new(strings: StringInterner) -> Self {
        let mut table = Self {
            types: Vec::new(),
            intern: FxHashMap::default(),
            classes: Vec::new(),
            strings,
            unknown: TypeId::INVALID,
            never: TypeId::INVALID,
            string: TypeId::INVALID,
            number: TypeId::INVALID,
            boolean: TypeId::INVALID,
            null: TypeId::INVALID,
            undefined: TypeId::INVALID,
            void: TypeId::INVALID,
        };
        table.unknown = table.add(TypeKind::Intrinsic(IntrinsicKind::Unknown));
        table.never = table.add(TypeKind::Intrinsic(IntrinsicKind::Never));
        table.string = table.add(TypeKind::Intrinsic(IntrinsicKind::String));
        table.number = table.add(TypeKind::Intrinsic(IntrinsicKind::Number));
        table.boolean = table.add(TypeKind::Intrinsic(IntrinsicKind::Boolean));
        table.null = table.add(TypeKind::Intrinsic(IntrinsicKind::Null));
        table.undefined = table.add(TypeKind::Intrinsic(IntrinsicKind::Undefined));
        table.void = table.add(TypeKind::Intrinsic(IntrinsicKind::Void));
        table
    }

    pub fn strings(&self) -> &StringInterner {
        &self.strings
    }

    /// Add a type node, returning the existing id if an identical shape was
    /// already interned.
    pub fn add(&mut self, kind: TypeKind) -> TypeId {
        let key = key_of(&kind);
        if let Some(&existing) = self.intern.get(&key) {
            return existing;
        }
        let id = TypeId(self.types.len() as u32);
        let flags = flags_of(&kind);
        self.types.push(Type { id, flags, kind });
        self.intern.insert(key, id);
        id
    }

    #[inline]
    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: TypeId) -> &TypeKind {
        &self.types[id.index()].kind
    }

    #[inline]
    pub fn flags(&self, id: TypeId) -> TypeFlags {
        self.types[id.index()].flags
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    // ------------------------------------------------------------------
    // Constructors
    // ------------------------------------------------------------------

    pub fn string_literal(&mut self, value: Atom) -> TypeId {
        self.add(TypeKind::StringLiteral(value))
    }

    pub fn string_literal_str(&mut self, value: &str) -> TypeId {
        let atom = self.strings.intern(value);
        self.string_literal(atom)
    }

    pub fn number_literal(&mut self, value: f64) -> TypeId {
        self.add(TypeKind::NumberLiteral(value))
    }

    pub fn boolean_literal(&mut self, value: bool) -> TypeId {
        self.add(TypeKind::BooleanLiteral(value))
    }

    pub fn object(&mut self, fields: IndexMap<Atom, TypeId>, exactness: Exactness) -> TypeId {
        self.add(TypeKind::Object { fields, exactness })
    }

    pub fn array(&mut self, element: TypeId) -> TypeId {
        self.add(TypeKind::Array { element })
    }

    /// Wrap a type in the immutable qualifier. Idempotent: wrapping an
    /// already-readonly type returns it unchanged.
    pub fn readonly(&mut self, inner: TypeId) -> TypeId {
        if self.flags(inner).contains(TypeFlags::READONLY) {
            return inner;
        }
        self.add(TypeKind::Readonly { inner })
    }

    /// Build a union: flattens nested unions, deduplicates members in first-
    /// occurrence order, collapses a single member, and yields `never` for
    /// an empty member list.
    pub fn union_of(&mut self, members: impl IntoIterator<Item = TypeId>) -> TypeId {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        let mut stack: Vec<TypeId> = members.into_iter().collect();
        stack.reverse();
        while let Some(id) = stack.pop() {
            if let TypeKind::Union { members } = self.kind(id) {
                for &m in members.iter().rev() {
                    stack.push(m);
                }
                continue;
            }
            if seen.insert(id) {
                out.push(id);
            }
        }
        match out.len() {
            0 => self.never,
            1 => out[0],
            _ => self.add(TypeKind::Union { members: out }),
        }
    }

    pub fn intersection_of(&mut self, members: Vec<TypeId>) -> TypeId {
        match members.len() {
            0 => self.unknown,
            1 => members[0],
            _ => self.add(TypeKind::Intersection { members }),
        }
    }

    pub fn function(
        &mut self,
        params: Vec<TypeId>,
        return_type: TypeId,
        type_params: Vec<TypeParam>,
        thrown: Option<TypeId>,
    ) -> TypeId {
        self.add(TypeKind::Function {
            params,
            return_type,
            type_params,
            thrown,
        })
    }

    // ------------------------------------------------------------------
    // Class registry
    // ------------------------------------------------------------------

    pub fn add_class(&mut self, def: ClassDef) -> ClassId {
        let id = ClassId(self.classes.len() as u32);
        self.classes.push(def);
        id
    }

    #[inline]
    pub fn class(&self, id: ClassId) -> &ClassDef {
        &self.classes[id.index()]
    }

    pub fn instance_type(&mut self, class: ClassId) -> TypeId {
        self.add(TypeKind::Class { class })
    }

    pub fn constructor_type(&mut self, class: ClassId) -> TypeId {
        self.add(TypeKind::ClassConstructor { class })
    }

    /// Whether `sub`'s superclass chain reaches `sup` (inclusive of `sub`
    /// itself).
    pub fn is_class_derived_from(&self, sub: ClassId, sup: ClassId) -> bool {
        let mut current = Some(sub);
        while let Some(id) = current {
            if id == sup {
                return true;
            }
            current = self.classes[id.index()].superclass;
        }
        false
    }

    // ------------------------------------------------------------------
    // Substitution
    // ------------------------------------------------------------------

    /// Replace type parameters by name throughout `ty`, rebuilding the
    /// affected nodes. Types without matched parameters are returned as-is.
    pub fn substitute(&mut self, ty: TypeId, map: &FxHashMap<Atom, TypeId>) -> TypeId {
        if map.is_empty() {
            return ty;
        }
        let kind = self.kind(ty).clone();
        match kind {
            TypeKind::TypeParameter { name, .. } => map.get(&name).copied().unwrap_or(ty),
            TypeKind::Object { fields, exactness } => {
                let substituted: IndexMap<Atom, TypeId> = fields
                    .into_iter()
                    .map(|(name, field)| (name, self.substitute(field, map)))
                    .collect();
                self.object(substituted, exactness)
            }
            TypeKind::Union { members } => {
                let substituted: Vec<TypeId> =
                    members.into_iter().map(|m| self.substitute(m, map)).collect();
                self.union_of(substituted)
            }
            TypeKind::Intersection { members } => {
                let substituted: Vec<TypeId> =
                    members.into_iter().map(|m| self.substitute(m, map)).collect();
                self.intersection_of(substituted)
            }
            TypeKind::Array { element } => {
                let element = self.substitute(element, map);
                self.array(element)
            }
            TypeKind::Readonly { inner } => {
                let inner = self.substitute(inner, map);
                self.readonly(inner)
            }
            TypeKind::Function {
                params,
                return_type,
                type_params,
                thrown,
            } => {
                // Parameters shadowed by this function's own type parameters
                // stay untouched.
                let shadowed: FxHashMap<Atom, TypeId> = map
                    .iter()
                    .filter(|(name, _)| !type_params.iter().any(|tp| tp.name == **name))
                    .map(|(k, v)| (*k, *v))
                    .collect();
                let params = params
                    .into_iter()
                    .map(|p| self.substitute(p, &shadowed))
                    .collect();
                let return_type = self.substitute(return_type, &shadowed);
                let thrown = thrown.map(|t| self.substitute(t, &shadowed));
                self.function(params, return_type, type_params, thrown)
            }
            TypeKind::GenericApplication { target, args } => {
                let target = self.substitute(target, map);
                let args = args.into_iter().map(|a| self.substitute(a, map)).collect();
                self.add(TypeKind::GenericApplication { target, args })
            }
            _ => ty,
        }
    }

    // ------------------------------------------------------------------
    // Printing
    // ------------------------------------------------------------------

    /// Render a type shape for diagnostics.
    pub fn type_to_string(&self, id: TypeId) -> String {
        self.print(id, 0)
    }

    fn print(&self, id: TypeId, depth: usize) -> String {
        if depth > MAX_PRINT_DEPTH {
            return "...".to_string();
        }
        match self.kind(id) {
            TypeKind::Intrinsic(k) => k.name().to_string(),
            TypeKind::StringLiteral(v) => format!("\"{}\"", self.strings.resolve(*v)),
            TypeKind::NumberLiteral(v) => format_number(*v),
            TypeKind::BooleanLiteral(v) => v.to_string(),
            TypeKind::Object { fields, exactness } => {
                let body = fields
                    .iter()
                    .map(|(name, field)| {
                        format!(
                            "{}: {}",
                            self.strings.resolve(*name),
                            self.print(*field, depth + 1)
                        )
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                match exactness {
                    Exactness::Exact => format!("{{| {} |}}", body),
                    Exactness::Inexact => format!("{{ {} }}", body),
                }
            }
            TypeKind::Union { members } => members
                .iter()
                .map(|m| self.print(*m, depth + 1))
                .collect::<Vec<_>>()
                .join(" | "),
            TypeKind::Intersection { members } => members
                .iter()
                .map(|m| self.print(*m, depth + 1))
                .collect::<Vec<_>>()
                .join(" & "),
            TypeKind::Function {
                params,
                return_type,
                type_params,
                ..
            } => {
                let tp = if type_params.is_empty() {
                    String::new()
                } else {
                    format!(
                        "<{}>",
                        type_params
                            .iter()
                            .map(|p| self.strings.resolve(p.name).to_string())
                            .collect::<Vec<_>>()
                            .join(", ")
                    )
                };
                let ps = params
                    .iter()
                    .map(|p| self.print(*p, depth + 1))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}({}) => {}", tp, ps, self.print(*return_type, depth + 1))
            }
            TypeKind::Class { class } => self.strings.resolve(self.class(*class).name).to_string(),
            TypeKind::ClassConstructor { class } => {
                format!("Class<{}>", self.strings.resolve(self.class(*class).name))
            }
            TypeKind::Array { element } => format!("Array<{}>", self.print(*element, depth + 1)),
            TypeKind::Readonly { inner } => {
                format!("$Immutable<{}>", self.print(*inner, depth + 1))
            }
            TypeKind::TypeParameter { name, .. } => self.strings.resolve(*name).to_string(),
            TypeKind::GenericApplication { target, args } => {
                let rendered = args
                    .iter()
                    .map(|a| self.print(*a, depth + 1))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}<{}>", self.print(*target, depth + 1), rendered)
            }
        }
    }
}

fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.is_finite() && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}
