//! GraphQL schema composition.
//!
//! Every [`Fragment`] contributes type definitions (as SDL text) along with
//! [`Resolvers`] of some fields. [`compose()`] merges the fragments in order
//! into a single [`Composition`], validating the result as a whole: either
//! all the fragments fit together, or every found [`Problem`] is reported at
//! once.

use std::{
    collections::{btree_map, BTreeMap, HashMap},
    fmt,
};

use derive_more::{Display, Error as StdError};
use graphql_parser::schema::{self as ast, Definition};
use itertools::Itertools as _;

/// Scalars defined by GraphQL itself.
const BUILTIN_SCALARS: [&str; 5] = ["Boolean", "Float", "ID", "Int", "String"];

/// Schema fragment contributed by a single domain.
#[derive(Clone, Debug)]
pub struct Fragment<R> {
    /// Name of this [`Fragment`], used for attributing [`Problem`]s.
    pub name: String,

    /// Type definitions of this [`Fragment`] in SDL.
    ///
    /// Types defined by other [`Fragment`]s may be extended with the
    /// `extend type` syntax.
    pub type_defs: String,

    /// [`Resolvers`] of this [`Fragment`].
    pub resolvers: Resolvers<R>,
}

impl<R> Fragment<R> {
    /// Creates a new [`Fragment`] without any [`Resolvers`].
    #[must_use]
    pub fn new(name: impl Into<String>, type_defs: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_defs: type_defs.into(),
            resolvers: Resolvers::default(),
        }
    }

    /// Adds the provided `resolver` of the `ty.field` to this [`Fragment`].
    #[must_use]
    pub fn resolve(
        mut self,
        ty: impl Into<String>,
        field: impl Into<String>,
        resolver: R,
    ) -> Self {
        _ = self.resolvers.insert(ty, field, resolver);
        self
    }
}

/// Resolvers map: type name → field name → resolver.
#[derive(Clone, Debug)]
pub struct Resolvers<R>(BTreeMap<String, BTreeMap<String, R>>);

impl<R> Default for Resolvers<R> {
    fn default() -> Self {
        Self(BTreeMap::new())
    }
}

impl<R> Resolvers<R> {
    /// Inserts the `resolver` of the `ty.field`, returning the replaced one,
    /// if any.
    pub fn insert(
        &mut self,
        ty: impl Into<String>,
        field: impl Into<String>,
        resolver: R,
    ) -> Option<R> {
        self.0
            .entry(ty.into())
            .or_default()
            .insert(field.into(), resolver)
    }

    /// Returns the resolver of the `ty.field`, if any.
    #[must_use]
    pub fn get(&self, ty: &str, field: &str) -> Option<&R> {
        self.0.get(ty)?.get(field)
    }

    /// Consumes these [`Resolvers`] returning all the `(type, field,
    /// resolver)` entries.
    fn into_entries(self) -> impl Iterator<Item = (String, String, R)> {
        self.0.into_iter().flat_map(|(ty, fields)| {
            fields.into_iter().map(move |(f, r)| (ty.clone(), f, r))
        })
    }
}

/// Policy of resolving the same field by several [`Fragment`]s.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Conflicts {
    /// Resolver of the later merged [`Fragment`] wins for that field only.
    #[default]
    Override,

    /// Resolving the same field twice is a [`Problem::Conflict`].
    Reject,
}

/// Composes the provided [`Fragment`]s in order.
///
/// Type definitions of all the [`Fragment`]s are concatenated (with the type
/// extensions applied afterwards), and their [`Resolvers`] are deep-merged
/// field by field following the [`Conflicts`] policy.
///
/// # Errors
///
/// With all the [`Problem`]s found, if any.
pub fn compose<R>(
    fragments: impl IntoIterator<Item = Fragment<R>>,
    conflicts: Conflicts,
) -> Result<Composition<R>, Error> {
    let mut problems = vec![];
    let mut model = Model::default();
    let mut extensions = vec![];
    let mut sources = vec![];

    for Fragment {
        name,
        type_defs,
        resolvers,
    } in fragments
    {
        if type_defs.trim().is_empty() {
            sources.push((name, resolvers));
            continue;
        }
        match ast::parse_schema::<&str>(&type_defs) {
            Ok(doc) => {
                extensions.extend(model.load(&name, &doc, &mut problems));
                sources.push((name, resolvers));
            }
            Err(e) => problems.push(Problem::Syntax {
                fragment: name,
                message: e.to_string(),
            }),
        }
    }
    model.apply(extensions, &mut problems);
    model.check(&mut problems);

    let mut resolvers = BTreeMap::<String, BTreeMap<String, Resolved<R>>>::new();
    for (fragment, source) in sources {
        for (ty, field, resolver) in source.into_entries() {
            if !model.has_field(&ty, &field) {
                problems.push(Problem::UndefinedResolver {
                    fragment: fragment.clone(),
                    ty,
                    field,
                });
                continue;
            }

            let resolved = Resolved {
                fragment: fragment.clone(),
                resolver,
            };
            match resolvers.entry(ty.clone()).or_default().entry(field.clone())
            {
                btree_map::Entry::Vacant(e) => {
                    _ = e.insert(resolved);
                }
                btree_map::Entry::Occupied(mut e) => match conflicts {
                    Conflicts::Override => {
                        tracing::warn!(
                            overridden = %e.get().fragment,
                            by = %fragment,
                            "`{ty}.{field}` resolver is overridden",
                        );
                        _ = e.insert(resolved);
                    }
                    Conflicts::Reject => {
                        problems.push(Problem::Conflict {
                            ty,
                            field,
                            first: e.get().fragment.clone(),
                            second: fragment.clone(),
                        });
                    }
                },
            }
        }
    }

    if problems.is_empty() {
        Ok(Composition { model, resolvers })
    } else {
        Err(Error { problems })
    }
}

/// Result of composing [`Fragment`]s.
#[derive(Clone, Debug)]
pub struct Composition<R> {
    /// Composed type definitions.
    model: Model,

    /// Merged resolvers.
    resolvers: BTreeMap<String, BTreeMap<String, Resolved<R>>>,
}

/// Resolver along with the [`Fragment`] providing it.
#[derive(Clone, Debug)]
struct Resolved<R> {
    /// Name of the [`Fragment`] providing the `resolver`.
    fragment: String,

    /// Resolver itself.
    resolver: R,
}

impl<R> Composition<R> {
    /// Returns the composed schema in SDL.
    #[must_use]
    pub fn sdl(&self) -> String {
        self.model.to_string()
    }

    /// Returns names of all the composed object types.
    pub fn object_types(&self) -> impl Iterator<Item = &str> {
        self.model
            .types
            .iter()
            .filter(|t| matches!(t.kind, Kind::Object { .. }))
            .map(|t| t.name.as_str())
    }

    /// Returns names of the fields of the provided object or interface `ty`.
    #[must_use]
    pub fn fields(&self, ty: &str) -> Vec<&str> {
        self.model
            .fields(ty)
            .map(|fs| fs.iter().map(|f| f.name.as_str()).collect())
            .unwrap_or_default()
    }

    /// Returns the merged resolver of the `ty.field`, if any.
    #[must_use]
    pub fn resolver(&self, ty: &str, field: &str) -> Option<&R> {
        Some(&self.resolvers.get(ty)?.get(field)?.resolver)
    }

    /// Returns the name of the [`Fragment`] the resolver of the `ty.field`
    /// comes from, if any.
    #[must_use]
    pub fn resolved_by(&self, ty: &str, field: &str) -> Option<&str> {
        Some(&self.resolvers.get(ty)?.get(field)?.fragment)
    }

    /// Verifies that the schema described by the provided `sdl` implements
    /// this [`Composition`].
    ///
    /// An implementation may return stricter output types (non-null where
    /// nullable is declared) and accept looser argument types, but must not
    /// miss or add fields, nor require undeclared arguments.
    ///
    /// # Errors
    ///
    /// With all the found mismatches.
    pub fn verify(&self, sdl: &str) -> Result<(), Error> {
        const IMPLEMENTATION: &str = "implementation";

        let mut problems = vec![];
        let doc = ast::parse_schema::<&str>(sdl).map_err(|e| Error {
            problems: vec![Problem::Syntax {
                fragment: IMPLEMENTATION.into(),
                message: e.to_string(),
            }],
        })?;
        let mut actual = Model::default();
        let extensions = actual.load(IMPLEMENTATION, &doc, &mut problems);
        actual.apply(extensions, &mut problems);

        for expected in &self.model.types {
            let Some(found) = actual.get(&expected.name) else {
                problems.push(Problem::MissingType {
                    name: expected.name.clone(),
                });
                continue;
            };
            expected.verify(found, &mut problems);
        }
        for found in &actual.types {
            if matches!(found.kind, Kind::Object { .. })
                && self.model.get(&found.name).is_none()
            {
                problems.push(Problem::Undeclared {
                    location: found.name.clone(),
                });
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error { problems })
        }
    }
}

/// Error of composing [`Fragment`]s.
#[derive(Clone, Debug, Display, StdError)]
#[display("schema composition failed:\n  {}", problems.iter().format("\n  "))]
pub struct Error {
    /// All the found [`Problem`]s.
    #[error(not(source))]
    problems: Vec<Problem>,
}

impl Error {
    /// Returns all the [`Problem`]s of this [`Error`].
    #[must_use]
    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }
}

/// Single problem found while composing [`Fragment`]s.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum Problem {
    /// Type definitions can't be parsed.
    #[display("fragment `{fragment}` has a syntax error: {message}")]
    Syntax {
        /// Name of the malformed [`Fragment`].
        fragment: String,

        /// Parsing error message.
        message: String,
    },

    /// Type is defined twice.
    #[display("fragment `{fragment}` redefines `{name}` type of `{first}`")]
    DuplicateType {
        /// Name of the redefining [`Fragment`].
        fragment: String,

        /// Name of the redefined type.
        name: String,

        /// Name of the [`Fragment`] defining the type first.
        first: String,
    },

    /// Type member (field, argument or value) is defined twice.
    #[display("fragment `{fragment}` redefines `{ty}.{member}`")]
    DuplicateField {
        /// Name of the redefining [`Fragment`].
        fragment: String,

        /// Name of the type.
        ty: String,

        /// Name of the redefined member.
        member: String,
    },

    /// Extended type is not defined.
    #[display("fragment `{fragment}` extends undefined `{name}` type")]
    UndefinedExtension {
        /// Name of the extending [`Fragment`].
        fragment: String,

        /// Name of the extended type.
        name: String,
    },

    /// Type is extended with members of another kind.
    #[display("fragment `{fragment}` extends `{name}` type as another kind")]
    InvalidExtension {
        /// Name of the extending [`Fragment`].
        fragment: String,

        /// Name of the extended type.
        name: String,
    },

    /// Referenced type is not defined.
    #[display("`{location}` references undefined `{name}` type")]
    UndefinedType {
        /// Location of the reference.
        location: String,

        /// Name of the referenced type.
        name: String,
    },

    /// Schema is defined twice.
    #[display("fragment `{fragment}` redefines the schema")]
    DuplicateSchema {
        /// Name of the redefining [`Fragment`].
        fragment: String,
    },

    /// Root operation type has a non-conventional name.
    #[display("`{operation}` root type must be `{expected}`, not `{name}`")]
    InvalidRootType {
        /// Root operation.
        operation: &'static str,

        /// Expected name of the root type.
        expected: &'static str,

        /// Actual name of the root type.
        name: String,
    },

    /// `Query` root type is not defined.
    #[display("`Query` root type is not defined")]
    MissingQuery,

    /// Resolved field is not defined.
    #[display("fragment `{fragment}` resolves undefined `{ty}.{field}`")]
    UndefinedResolver {
        /// Name of the resolving [`Fragment`].
        fragment: String,

        /// Name of the type.
        ty: String,

        /// Name of the field.
        field: String,
    },

    /// Field is resolved by several [`Fragment`]s.
    #[display("`{ty}.{field}` is resolved by both `{first}` and `{second}`")]
    Conflict {
        /// Name of the type.
        ty: String,

        /// Name of the field.
        field: String,

        /// Name of the [`Fragment`] resolving the field first.
        first: String,

        /// Name of the [`Fragment`] resolving the field again.
        second: String,
    },

    /// Declared type is not implemented.
    #[display("`{name}` type is not implemented")]
    MissingType {
        /// Name of the type.
        name: String,
    },

    /// Declared type is implemented as another kind.
    #[display("`{name}` is implemented as `{actual}` instead of `{expected}`")]
    KindMismatch {
        /// Name of the type.
        name: String,

        /// Declared kind.
        expected: &'static str,

        /// Implemented kind.
        actual: &'static str,
    },

    /// Declared field is not implemented.
    #[display("`{location}` is not implemented")]
    MissingField {
        /// Location of the field.
        location: String,
    },

    /// Implemented type or field is not declared.
    #[display("`{location}` is not declared")]
    Undeclared {
        /// Location of the type or field.
        location: String,
    },

    /// Implemented type is incompatible with the declared one.
    #[display("`{location}` is `{actual}`, incompatible with `{expected}`")]
    TypeMismatch {
        /// Location of the field or argument.
        location: String,

        /// Declared type.
        expected: String,

        /// Implemented type.
        actual: String,
    },

    /// Declared argument is not accepted.
    #[display("`{location}` argument is not accepted")]
    MissingArgument {
        /// Location of the argument.
        location: String,
    },

    /// Undeclared argument is required.
    #[display("`{location}` argument is required, but not declared")]
    ExtraRequiredArgument {
        /// Location of the argument.
        location: String,
    },

    /// Members of an enum or union differ.
    #[display("`{name}` has `{actual}` members instead of `{expected}`")]
    MembersMismatch {
        /// Name of the type.
        name: String,

        /// Declared members.
        expected: String,

        /// Implemented members.
        actual: String,
    },
}

/// Reference to a GraphQL type.
#[derive(Clone, Debug, Eq, PartialEq)]
enum TypeRef {
    /// Nullable named type.
    Named(String),

    /// Nullable list.
    List(Box<TypeRef>),

    /// Non-null wrapper.
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    /// Returns the name of the innermost named type.
    fn name(&self) -> &str {
        match self {
            Self::Named(n) => n,
            Self::List(t) | Self::NonNull(t) => t.name(),
        }
    }

    /// Checks whether a value of this [`TypeRef`] is always a valid value of
    /// the `other` one.
    fn is_subtype_of(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NonNull(a), Self::NonNull(b)) | (Self::List(a), Self::List(b)) => {
                a.is_subtype_of(b)
            }
            (Self::NonNull(a), b) => a.is_subtype_of(b),
            (Self::Named(a), Self::Named(b)) => a == b,
            (Self::Named(_) | Self::List(_), Self::NonNull(_))
            | (Self::Named(_), Self::List(_))
            | (Self::List(_), Self::Named(_)) => false,
        }
    }
}

impl<'a> From<&ast::Type<'a, &'a str>> for TypeRef {
    fn from(ty: &ast::Type<'a, &'a str>) -> Self {
        match ty {
            ast::Type::NamedType(n) => Self::Named((*n).to_owned()),
            ast::Type::ListType(t) => Self::List(Box::new(t.as_ref().into())),
            ast::Type::NonNullType(t) => {
                Self::NonNull(Box::new(t.as_ref().into()))
            }
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(n) => write!(f, "{n}"),
            Self::List(t) => write!(f, "[{t}]"),
            Self::NonNull(t) => write!(f, "{t}!"),
        }
    }
}

/// Named member of a type definition.
trait Member: fmt::Display {
    /// Returns the name of this [`Member`].
    fn name(&self) -> &str;
}

impl Member for String {
    fn name(&self) -> &str {
        self
    }
}

/// Field of an object or interface type.
#[derive(Clone, Debug)]
struct Field {
    /// Name of this [`Field`].
    name: String,

    /// [`Argument`]s of this [`Field`].
    arguments: Vec<Argument>,

    /// Output type of this [`Field`].
    ty: TypeRef,
}

impl<'a> From<&ast::Field<'a, &'a str>> for Field {
    fn from(field: &ast::Field<'a, &'a str>) -> Self {
        Self {
            name: field.name.to_owned(),
            arguments: field.arguments.iter().map(Into::into).collect(),
            ty: (&field.field_type).into(),
        }
    }
}

impl Member for Field {
    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.arguments.is_empty() {
            write!(f, "({})", self.arguments.iter().format(", "))?;
        }
        write!(f, ": {}", self.ty)
    }
}

/// Argument of a [`Field`] or a field of an input type.
#[derive(Clone, Debug)]
struct Argument {
    /// Name of this [`Argument`].
    name: String,

    /// Input type of this [`Argument`].
    ty: TypeRef,

    /// Default value of this [`Argument`] in SDL, if any.
    default: Option<String>,
}

impl Argument {
    /// Checks whether this [`Argument`] must be always provided.
    fn is_required(&self) -> bool {
        matches!(self.ty, TypeRef::NonNull(_)) && self.default.is_none()
    }
}

impl<'a> From<&ast::InputValue<'a, &'a str>> for Argument {
    fn from(arg: &ast::InputValue<'a, &'a str>) -> Self {
        Self {
            name: arg.name.to_owned(),
            ty: (&arg.value_type).into(),
            default: arg.default_value.as_ref().map(ToString::to_string),
        }
    }
}

impl Member for Argument {
    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.ty)?;
        if let Some(default) = &self.default {
            write!(f, " = {default}")?;
        }
        Ok(())
    }
}

/// Kind of a type definition along with its members.
#[derive(Clone, Debug)]
enum Kind {
    /// Scalar type.
    Scalar,

    /// Object type.
    Object {
        /// Names of the implemented interfaces.
        interfaces: Vec<String>,

        /// Fields of the object.
        fields: Vec<Field>,
    },

    /// Interface type.
    Interface(Vec<Field>),

    /// Union of object types.
    Union(Vec<String>),

    /// Enum type.
    Enum(Vec<String>),

    /// Input object type.
    Input(Vec<Argument>),
}

impl Kind {
    /// Returns the SDL keyword of this [`Kind`].
    fn keyword(&self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Object { .. } => "type",
            Self::Interface(_) => "interface",
            Self::Union(_) => "union",
            Self::Enum(_) => "enum",
            Self::Input(_) => "input",
        }
    }

    /// Returns the same [`Kind`] without any members.
    fn emptied(&self) -> Self {
        match self {
            Self::Scalar => Self::Scalar,
            Self::Object { .. } => Self::Object {
                interfaces: vec![],
                fields: vec![],
            },
            Self::Interface(_) => Self::Interface(vec![]),
            Self::Union(_) => Self::Union(vec![]),
            Self::Enum(_) => Self::Enum(vec![]),
            Self::Input(_) => Self::Input(vec![]),
        }
    }

    /// Converts the provided type definition into its name and [`Kind`].
    fn of_definition<'a>(
        def: &ast::TypeDefinition<'a, &'a str>,
    ) -> (String, Self) {
        use ast::TypeDefinition as D;

        match def {
            D::Scalar(s) => (s.name.to_owned(), Self::Scalar),
            D::Object(o) => (
                o.name.to_owned(),
                Self::Object {
                    interfaces: owned_names(&o.implements_interfaces),
                    fields: o.fields.iter().map(Into::into).collect(),
                },
            ),
            D::Interface(i) => (
                i.name.to_owned(),
                Self::Interface(i.fields.iter().map(Into::into).collect()),
            ),
            D::Union(u) => (u.name.to_owned(), Self::Union(owned_names(&u.types))),
            D::Enum(e) => (
                e.name.to_owned(),
                Self::Enum(e.values.iter().map(|v| v.name.to_owned()).collect()),
            ),
            D::InputObject(i) => (
                i.name.to_owned(),
                Self::Input(i.fields.iter().map(Into::into).collect()),
            ),
        }
    }

    /// Converts the provided type extension into the extended type name and
    /// the [`Kind`] of the added members.
    fn of_extension<'a>(
        ext: &ast::TypeExtension<'a, &'a str>,
    ) -> (String, Self) {
        use ast::TypeExtension as E;

        match ext {
            E::Scalar(s) => (s.name.to_owned(), Self::Scalar),
            E::Object(o) => (
                o.name.to_owned(),
                Self::Object {
                    interfaces: owned_names(&o.implements_interfaces),
                    fields: o.fields.iter().map(Into::into).collect(),
                },
            ),
            E::Interface(i) => (
                i.name.to_owned(),
                Self::Interface(i.fields.iter().map(Into::into).collect()),
            ),
            E::Union(u) => (u.name.to_owned(), Self::Union(owned_names(&u.types))),
            E::Enum(e) => (
                e.name.to_owned(),
                Self::Enum(e.values.iter().map(|v| v.name.to_owned()).collect()),
            ),
            E::InputObject(i) => (
                i.name.to_owned(),
                Self::Input(i.fields.iter().map(Into::into).collect()),
            ),
        }
    }
}

/// Converts borrowed names into owned ones.
fn owned_names(names: &[&str]) -> Vec<String> {
    names.iter().map(|&n| n.to_owned()).collect()
}

/// Type definition.
#[derive(Clone, Debug)]
struct TypeDef {
    /// Name of this [`TypeDef`].
    name: String,

    /// Name of the [`Fragment`] defining this [`TypeDef`].
    fragment: String,

    /// [`Kind`] and members of this [`TypeDef`].
    kind: Kind,
}

impl TypeDef {
    /// Adds the members of the provided [`Kind`] to this [`TypeDef`].
    #[expect(clippy::wildcard_enum_match_arm, reason = "any other is mismatch")]
    fn extend_with(
        &mut self,
        fragment: &str,
        kind: Kind,
        problems: &mut Vec<Problem>,
    ) {
        let ty = self.name.as_str();
        match (&mut self.kind, kind) {
            (Kind::Scalar, Kind::Scalar) => {}
            (
                Kind::Object { interfaces, fields },
                Kind::Object {
                    interfaces: new_interfaces,
                    fields: new_fields,
                },
            ) => {
                merge(fragment, ty, interfaces, new_interfaces, problems);
                merge(fragment, ty, fields, new_fields, problems);
            }
            (Kind::Interface(fields), Kind::Interface(new)) => {
                merge(fragment, ty, fields, new, problems);
            }
            (Kind::Union(members), Kind::Union(new))
            | (Kind::Enum(members), Kind::Enum(new)) => {
                merge(fragment, ty, members, new, problems);
            }
            (Kind::Input(fields), Kind::Input(new)) => {
                merge(fragment, ty, fields, new, problems);
            }
            _ => problems.push(Problem::InvalidExtension {
                fragment: fragment.to_owned(),
                name: ty.to_owned(),
            }),
        }
    }

    /// Verifies that the `found` [`TypeDef`] implements this one.
    #[expect(clippy::wildcard_enum_match_arm, reason = "any other is mismatch")]
    fn verify(&self, found: &Self, problems: &mut Vec<Problem>) {
        let name = &self.name;
        match (&self.kind, &found.kind) {
            (Kind::Scalar, Kind::Scalar) => {}
            (
                Kind::Object {
                    fields: expected, ..
                },
                Kind::Object { fields: actual, .. },
            )
            | (Kind::Interface(expected), Kind::Interface(actual)) => {
                verify_fields(name, expected, actual, problems);
            }
            (Kind::Union(expected), Kind::Union(actual))
            | (Kind::Enum(expected), Kind::Enum(actual)) => {
                let expected = expected.iter().sorted().join(", ");
                let actual = actual.iter().sorted().join(", ");
                if expected != actual {
                    problems.push(Problem::MembersMismatch {
                        name: name.clone(),
                        expected,
                        actual,
                    });
                }
            }
            (Kind::Input(expected), Kind::Input(actual)) => {
                verify_arguments(name, expected, actual, problems);
            }
            (expected, actual) => problems.push(Problem::KindMismatch {
                name: name.clone(),
                expected: expected.keyword(),
                actual: actual.keyword(),
            }),
        }
    }
}

impl fmt::Display for TypeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        /// Writes the provided `members` as an SDL block.
        fn block(
            f: &mut fmt::Formatter<'_>,
            members: &[impl fmt::Display],
        ) -> fmt::Result {
            writeln!(f, " {{")?;
            for m in members {
                writeln!(f, "  {m}")?;
            }
            writeln!(f, "}}")
        }

        let Self { name, kind, .. } = self;
        match kind {
            Kind::Scalar => writeln!(f, "scalar {name}"),
            Kind::Object { interfaces, fields } => {
                write!(f, "type {name}")?;
                if !interfaces.is_empty() {
                    write!(f, " implements {}", interfaces.iter().format(" & "))?;
                }
                block(f, fields)
            }
            Kind::Interface(fields) => {
                write!(f, "interface {name}")?;
                block(f, fields)
            }
            Kind::Union(members) => {
                writeln!(f, "union {name} = {}", members.iter().format(" | "))
            }
            Kind::Enum(values) => {
                write!(f, "enum {name}")?;
                block(f, values)
            }
            Kind::Input(fields) => {
                write!(f, "input {name}")?;
                block(f, fields)
            }
        }
    }
}

/// Merges the provided `members` into the existing ones of the `ty`,
/// reporting the duplicates.
fn merge<M: Member>(
    fragment: &str,
    ty: &str,
    existing: &mut Vec<M>,
    members: Vec<M>,
    problems: &mut Vec<Problem>,
) {
    for m in members {
        if existing.iter().any(|e| e.name() == m.name()) {
            problems.push(Problem::DuplicateField {
                fragment: fragment.to_owned(),
                ty: ty.to_owned(),
                member: m.name().to_owned(),
            });
        } else {
            existing.push(m);
        }
    }
}

/// Verifies that the `actual` fields of the `ty` implement the `expected`
/// ones.
fn verify_fields(
    ty: &str,
    expected: &[Field],
    actual: &[Field],
    problems: &mut Vec<Problem>,
) {
    for e in expected {
        let location = format!("{ty}.{}", e.name);
        let Some(a) = actual.iter().find(|a| a.name == e.name) else {
            problems.push(Problem::MissingField { location });
            continue;
        };
        if !a.ty.is_subtype_of(&e.ty) {
            problems.push(Problem::TypeMismatch {
                location: location.clone(),
                expected: e.ty.to_string(),
                actual: a.ty.to_string(),
            });
        }
        verify_arguments(&location, &e.arguments, &a.arguments, problems);
    }
    for a in actual {
        if !expected.iter().any(|e| e.name == a.name) {
            problems.push(Problem::Undeclared {
                location: format!("{ty}.{}", a.name),
            });
        }
    }
}

/// Verifies that the `actual` arguments accept all the values of the
/// `expected` ones.
fn verify_arguments(
    location: &str,
    expected: &[Argument],
    actual: &[Argument],
    problems: &mut Vec<Problem>,
) {
    for e in expected {
        let location = format!("{location}({})", e.name);
        let Some(a) = actual.iter().find(|a| a.name == e.name) else {
            problems.push(Problem::MissingArgument { location });
            continue;
        };
        if !e.ty.is_subtype_of(&a.ty) {
            problems.push(Problem::TypeMismatch {
                location,
                expected: e.ty.to_string(),
                actual: a.ty.to_string(),
            });
        }
    }
    for a in actual {
        if a.is_required() && !expected.iter().any(|e| e.name == a.name) {
            problems.push(Problem::ExtraRequiredArgument {
                location: format!("{location}({})", a.name),
            });
        }
    }
}

/// Root operation types of a schema.
#[derive(Clone, Debug, Default)]
struct Roots {
    /// Name of the query root type.
    query: Option<String>,

    /// Name of the mutation root type.
    mutation: Option<String>,

    /// Name of the subscription root type.
    subscription: Option<String>,
}

impl Roots {
    /// Returns all the root operation types along with their conventional
    /// names.
    fn operations(&self) -> [(&'static str, &'static str, Option<&str>); 3] {
        [
            ("query", "Query", self.query.as_deref()),
            ("mutation", "Mutation", self.mutation.as_deref()),
            ("subscription", "Subscription", self.subscription.as_deref()),
        ]
    }
}

/// Type extension waiting for all the types being defined.
#[derive(Clone, Debug)]
struct Extension {
    /// Name of the extending [`Fragment`].
    fragment: String,

    /// Name of the extended type.
    name: String,

    /// [`Kind`] of the added members.
    kind: Kind,
}

/// Model of a schema.
#[derive(Clone, Debug, Default)]
struct Model {
    /// Root operation types, if defined explicitly.
    schema: Option<Roots>,

    /// Type definitions in the order of their appearance.
    types: Vec<TypeDef>,

    /// Indices of the `types` by their names.
    index: HashMap<String, usize>,
}

impl Model {
    /// Returns the [`TypeDef`] with the provided `name`, if any.
    fn get(&self, name: &str) -> Option<&TypeDef> {
        self.index.get(name).map(|&i| &self.types[i])
    }

    /// Returns fields of the object or interface `ty`, if any.
    fn fields(&self, ty: &str) -> Option<&[Field]> {
        match &self.get(ty)?.kind {
            Kind::Object { fields, .. } | Kind::Interface(fields) => {
                Some(fields)
            }
            Kind::Scalar | Kind::Union(_) | Kind::Enum(_) | Kind::Input(_) => {
                None
            }
        }
    }

    /// Checks whether the `ty` has the provided `field`.
    fn has_field(&self, ty: &str, field: &str) -> bool {
        self.fields(ty)
            .is_some_and(|fs| fs.iter().any(|f| f.name == field))
    }

    /// Checks whether the type with the provided `name` is defined.
    fn is_defined(&self, name: &str) -> bool {
        BUILTIN_SCALARS.contains(&name) || self.index.contains_key(name)
    }

    /// Loads definitions of the provided [`Fragment`] document into this
    /// [`Model`], returning its type extensions to be applied later.
    fn load<'a>(
        &mut self,
        fragment: &str,
        doc: &ast::Document<'a, &'a str>,
        problems: &mut Vec<Problem>,
    ) -> Vec<Extension> {
        let mut extensions = vec![];
        for def in &doc.definitions {
            match def {
                Definition::SchemaDefinition(s) => {
                    if self.schema.is_some() {
                        problems.push(Problem::DuplicateSchema {
                            fragment: fragment.to_owned(),
                        });
                    } else {
                        self.schema = Some(Roots {
                            query: s.query.map(str::to_owned),
                            mutation: s.mutation.map(str::to_owned),
                            subscription: s.subscription.map(str::to_owned),
                        });
                    }
                }
                Definition::TypeDefinition(d) => {
                    let (name, kind) = Kind::of_definition(d);
                    self.define(fragment, name, kind, problems);
                }
                Definition::TypeExtension(e) => {
                    let (name, kind) = Kind::of_extension(e);
                    extensions.push(Extension {
                        fragment: fragment.to_owned(),
                        name,
                        kind,
                    });
                }
                Definition::DirectiveDefinition(_) => {}
            }
        }
        extensions
    }

    /// Defines a new type in this [`Model`].
    fn define(
        &mut self,
        fragment: &str,
        name: String,
        kind: Kind,
        problems: &mut Vec<Problem>,
    ) {
        if let Some(existing) = self.get(&name) {
            problems.push(Problem::DuplicateType {
                fragment: fragment.to_owned(),
                first: existing.fragment.clone(),
                name,
            });
            return;
        }

        let mut def = TypeDef {
            name: name.clone(),
            fragment: fragment.to_owned(),
            kind: kind.emptied(),
        };
        def.extend_with(fragment, kind, problems);
        _ = self.index.insert(name, self.types.len());
        self.types.push(def);
    }

    /// Applies the provided type [`Extension`]s.
    fn apply(&mut self, extensions: Vec<Extension>, problems: &mut Vec<Problem>) {
        for Extension {
            fragment,
            name,
            kind,
        } in extensions
        {
            if let Some(&i) = self.index.get(&name) {
                self.types[i].extend_with(&fragment, kind, problems);
            } else {
                problems.push(Problem::UndefinedExtension { fragment, name });
            }
        }
    }

    /// Checks type references and root operation types of this [`Model`].
    fn check(&self, problems: &mut Vec<Problem>) {
        if let Some(roots) = &self.schema {
            for (operation, expected, name) in roots.operations() {
                if let Some(name) = name.filter(|&n| n != expected) {
                    problems.push(Problem::InvalidRootType {
                        operation,
                        expected,
                        name: name.to_owned(),
                    });
                }
            }
        }

        let mut undefined = |location: String, name: &str| {
            if !self.is_defined(name) {
                problems.push(Problem::UndefinedType {
                    location,
                    name: name.to_owned(),
                });
            }
        };

        for def in &self.types {
            let ty = &def.name;
            match &def.kind {
                Kind::Scalar | Kind::Enum(_) => {}
                Kind::Object { interfaces, fields } => {
                    for i in interfaces {
                        undefined(ty.clone(), i);
                    }
                    for f in fields {
                        undefined(format!("{ty}.{}", f.name), f.ty.name());
                        for a in &f.arguments {
                            undefined(
                                format!("{ty}.{}({})", f.name, a.name),
                                a.ty.name(),
                            );
                        }
                    }
                }
                Kind::Interface(fields) => {
                    for f in fields {
                        undefined(format!("{ty}.{}", f.name), f.ty.name());
                    }
                }
                Kind::Union(members) => {
                    for m in members {
                        undefined(ty.clone(), m);
                    }
                }
                Kind::Input(fields) => {
                    for f in fields {
                        undefined(format!("{ty}.{}", f.name), f.ty.name());
                    }
                }
            }
        }

        if let Some(roots) = &self.schema {
            for (_, _, name) in roots.operations() {
                if let Some(name) = name {
                    undefined("schema".into(), name);
                }
            }
        }
        if !matches!(
            self.get("Query").map(|t| &t.kind),
            Some(Kind::Object { .. }),
        ) {
            problems.push(Problem::MissingQuery);
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(roots) = &self.schema {
            writeln!(f, "schema {{")?;
            for (operation, _, name) in roots.operations() {
                if let Some(name) = name {
                    writeln!(f, "  {operation}: {name}")?;
                }
            }
            writeln!(f, "}}")?;
        }
        for (i, def) in self.types.iter().enumerate() {
            if i > 0 || self.schema.is_some() {
                writeln!(f)?;
            }
            write!(f, "{def}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod spec {
    use super::{compose, Conflicts, Fragment, Problem};

    const ROOT: &str = r#"
        schema {
          query: Query
          mutation: Mutation
        }

        type Query {
          ping: String
        }

        type Mutation {
          touch(id: Int!): Boolean
        }
    "#;

    fn root() -> Fragment<&'static str> {
        Fragment::new("root", ROOT)
            .resolve("Query", "ping", "root.ping")
            .resolve("Mutation", "touch", "root.touch")
    }

    fn problems<R>(
        fragments: Vec<Fragment<R>>,
        conflicts: Conflicts,
    ) -> Vec<Problem> {
        compose(fragments, conflicts)
            .map(drop)
            .unwrap_err()
            .problems()
            .to_vec()
    }

    #[test]
    fn merges_disjoint_fragments() {
        let books = Fragment::new(
            "books",
            "type Book { title: String! }
             extend type Query { books: [Book!]! }",
        )
        .resolve("Query", "books", "books.list")
        .resolve("Book", "title", "books.title");
        let authors = Fragment::new(
            "authors",
            "type Author { name: String! }
             extend type Query { authors: [Author] }",
        )
        .resolve("Query", "authors", "authors.list");

        let composition =
            compose([root(), books, authors], Conflicts::Reject).unwrap();

        assert_eq!(composition.fields("Query"), ["ping", "books", "authors"]);
        assert_eq!(composition.resolver("Query", "ping"), Some(&"root.ping"));
        assert_eq!(composition.resolved_by("Query", "books"), Some("books"));
        assert_eq!(
            composition.resolver("Query", "authors"),
            Some(&"authors.list"),
        );
        assert_eq!(
            composition.object_types().collect::<Vec<_>>(),
            ["Query", "Mutation", "Book", "Author"],
        );
    }

    #[test]
    fn later_resolver_overrides_single_field() {
        let root = Fragment::new(
            "root",
            "type Query { a: Int b: Int }",
        )
        .resolve("Query", "a", "root.a")
        .resolve("Query", "b", "root.b");
        let domain =
            Fragment::new("domain", "").resolve("Query", "a", "domain.a");

        let composition =
            compose([root, domain], Conflicts::Override).unwrap();

        assert_eq!(composition.resolver("Query", "a"), Some(&"domain.a"));
        assert_eq!(composition.resolver("Query", "b"), Some(&"root.b"));
        assert_eq!(composition.resolved_by("Query", "a"), Some("domain"));
    }

    #[test]
    fn rejects_conflicting_resolvers() {
        let root = Fragment::new("root", "type Query { a: Int }")
            .resolve("Query", "a", "root.a");
        let domain =
            Fragment::new("domain", "").resolve("Query", "a", "domain.a");

        assert_eq!(
            problems(vec![root, domain], Conflicts::Reject),
            [Problem::Conflict {
                ty: "Query".into(),
                field: "a".into(),
                first: "root".into(),
                second: "domain".into(),
            }],
        );
    }

    #[test]
    fn reports_all_problems_at_once() {
        let broken = Fragment::<&str>::new("broken", "type Query {");
        let duplicate = Fragment::new(
            "duplicate",
            "type Query { a: Missing }
             type Query { b: Int }
             extend type Unknown { c: Int }",
        )
        .resolve("Query", "nope", "duplicate.nope");

        let found = problems(vec![broken, duplicate], Conflicts::Reject);

        assert!(matches!(
            &found[0],
            Problem::Syntax { fragment, .. } if fragment == "broken",
        ));
        assert!(found.contains(&Problem::DuplicateType {
            fragment: "duplicate".into(),
            name: "Query".into(),
            first: "duplicate".into(),
        }));
        assert!(found.contains(&Problem::UndefinedExtension {
            fragment: "duplicate".into(),
            name: "Unknown".into(),
        }));
        assert!(found.contains(&Problem::UndefinedType {
            location: "Query.a".into(),
            name: "Missing".into(),
        }));
        assert!(found.contains(&Problem::UndefinedResolver {
            fragment: "duplicate".into(),
            ty: "Query".into(),
            field: "nope".into(),
        }));
    }

    #[test]
    fn rejects_duplicate_fields() {
        let extension = Fragment::<&str>::new(
            "extension",
            "extend type Query { ping: Int }",
        );

        assert_eq!(
            problems(vec![root(), extension], Conflicts::Reject),
            [Problem::DuplicateField {
                fragment: "extension".into(),
                ty: "Query".into(),
                member: "ping".into(),
            }],
        );
    }

    #[test]
    fn validates_schema_definition() {
        let renamed = Fragment::<&str>::new(
            "renamed",
            "schema { query: Root } type Root { a: Int }",
        );
        let found = problems(vec![renamed], Conflicts::Reject);
        assert!(found.contains(&Problem::InvalidRootType {
            operation: "query",
            expected: "Query",
            name: "Root".into(),
        }));
        assert!(found.contains(&Problem::MissingQuery));

        let twice = Fragment::<&str>::new("twice", "schema { query: Query }");
        assert_eq!(
            problems(vec![root(), twice], Conflicts::Reject),
            [Problem::DuplicateSchema {
                fragment: "twice".into(),
            }],
        );
    }

    #[test]
    fn prints_reparsable_sdl() {
        let enums = Fragment::<&str>::new(
            "enums",
            "enum Color { RED GREEN }
             input Filter { color: Color = RED, limit: Int }
             extend type Query { paint(filter: Filter!, times: Int = 1): [Color!] }",
        );

        let composition = compose([root(), enums], Conflicts::Reject).unwrap();
        let sdl = composition.sdl();

        assert!(sdl.starts_with("schema {\n  query: Query\n"));
        assert!(sdl.contains(
            "  paint(filter: Filter!, times: Int = 1): [Color!]\n",
        ));
        let reparsed = compose(
            [Fragment::<&str>::new("reparsed", sdl.as_str())],
            Conflicts::Reject,
        )
        .unwrap();
        assert_eq!(reparsed.sdl(), sdl);
    }

    #[test]
    fn verifies_conforming_implementation() {
        let composition = compose([root()], Conflicts::Reject).unwrap();

        composition
            .verify(
                "type Query { ping: String! }
                 type Mutation { touch(id: Int, force: Boolean): Boolean! }",
            )
            .unwrap();
    }

    #[test]
    fn reports_implementation_mismatches() {
        let composition = compose([root()], Conflicts::Reject).unwrap();

        let err = composition
            .verify(
                "type Query { ping: Int, extra: Int }
                 type Mutation { touch(id: Int!, force: Boolean!): Boolean }
                 type Unknown { a: Int }",
            )
            .unwrap_err();

        let found = err.problems();
        assert!(found.contains(&Problem::TypeMismatch {
            location: "Query.ping".into(),
            expected: "String".into(),
            actual: "Int".into(),
        }));
        assert!(found.contains(&Problem::Undeclared {
            location: "Query.extra".into(),
        }));
        assert!(found.contains(&Problem::ExtraRequiredArgument {
            location: "Mutation.touch(force)".into(),
        }));
        assert!(found.contains(&Problem::Undeclared {
            location: "Unknown".into(),
        }));
        assert_eq!(found.len(), 4, "{err}");
    }

    #[test]
    fn rejects_looser_output_and_stricter_arguments() {
        let strict = Fragment::<&str>::new(
            "strict",
            "type Query { items(limit: Int): [Int!]! }",
        );
        let composition = compose([strict], Conflicts::Reject).unwrap();

        let err = composition
            .verify("type Query { items(limit: Int!): [Int] }")
            .unwrap_err();

        assert_eq!(err.problems().len(), 2, "{err}");
    }
}
