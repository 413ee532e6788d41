//! Behavior bound to definition units.
//!
//! Resolvers are plain async functions over an owned [`ResolverArgs`]; they do
//! not see async-graphql's resolver context, so units stay independent of the
//! compiler that eventually executes them.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_graphql::Value;
use futures_util::future::{BoxFuture, FutureExt};
use futures_util::stream::{BoxStream, Stream, StreamExt};
use indexmap::IndexMap;

/// Async field resolver.
pub type Resolver =
    Arc<dyn Fn(ResolverArgs) -> BoxFuture<'static, async_graphql::Result<Value>> + Send + Sync>;

/// Source of events for a subscription field.
pub type Subscriber =
    Arc<dyn Fn(ResolverArgs) -> BoxStream<'static, async_graphql::Result<Value>> + Send + Sync>;

/// Maps a value of an interface or union type to its concrete object type name.
pub type TypeResolver = Arc<dyn Fn(&Value) -> Option<String> + Send + Sync>;

/// A scalar conversion hook.
pub type ScalarFn = Arc<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>;

/// Decorates the resolver of a field carrying the visitor's directive.
pub type DirectiveVisitor = Arc<dyn Fn(&DirectiveSite, Resolver) -> Resolver + Send + Sync>;

/// Input handed to a [`Resolver`].
#[derive(Debug, Clone, Default)]
pub struct ResolverArgs {
    /// The value resolved for the parent object (`Null` on root types).
    pub parent: Value,
    /// Field arguments, keyed after argument aliases are applied.
    pub args: IndexMap<String, Value>,
}

impl ResolverArgs {
    /// Returns an argument by (aliased) name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.args.get(name)
    }

    /// Returns an integer argument.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Returns a string argument.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// How a field of the assembled schema is resolved.
#[derive(Clone)]
pub enum FieldBinding {
    /// An explicit resolver.
    Resolver(Resolver),
    /// Default resolution reading this key from the parent value.
    Alias(String),
}

impl fmt::Debug for FieldBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolver(_) => f.write_str("Resolver(..)"),
            Self::Alias(key) => f.debug_tuple("Alias").field(key).finish(),
        }
    }
}

impl FieldBinding {
    /// Turns the binding into a resolver, materializing default resolution.
    #[must_use]
    pub fn into_resolver(self) -> Resolver {
        match self {
            Self::Resolver(resolver) => resolver,
            Self::Alias(key) => default_resolver(key),
        }
    }
}

/// Wraps an async function into a [`Resolver`].
pub fn resolver_fn<F, Fut>(f: F) -> Resolver
where
    F: Fn(ResolverArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = async_graphql::Result<Value>> + Send + 'static,
{
    Arc::new(move |args| f(args).boxed())
}

/// Wraps a stream factory into a [`Subscriber`].
pub fn subscriber_fn<F, S>(f: F) -> Subscriber
where
    F: Fn(ResolverArgs) -> S + Send + Sync + 'static,
    S: Stream<Item = async_graphql::Result<Value>> + Send + 'static,
{
    Arc::new(move |args| f(args).boxed())
}

/// Resolver reading `key` from the parent object, `Null` when absent.
pub fn default_resolver(key: impl Into<String>) -> Resolver {
    let key = key.into();
    Arc::new(move |args: ResolverArgs| {
        let value = lookup(&args.parent, &key);
        async move { Ok::<_, async_graphql::Error>(value) }.boxed()
    })
}

pub(crate) fn lookup(parent: &Value, key: &str) -> Value {
    match parent {
        Value::Object(fields) => fields.get(key).cloned().unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

/// Conversion hooks of a custom scalar.
#[derive(Clone, Default)]
pub struct ScalarHooks {
    /// Converts a resolved value to its output form.
    pub serialize: Option<ScalarFn>,
    /// Validates and converts a variable value.
    pub parse_value: Option<ScalarFn>,
    /// Validates and converts a literal written in the query.
    pub parse_literal: Option<ScalarFn>,
}

impl fmt::Debug for ScalarHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarHooks")
            .field("serialize", &self.serialize.is_some())
            .field("parse_value", &self.parse_value.is_some())
            .field("parse_literal", &self.parse_literal.is_some())
            .finish()
    }
}

impl ScalarHooks {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn serialize(
        mut self,
        f: impl Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        self.serialize = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn parse_value(
        mut self,
        f: impl Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        self.parse_value = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn parse_literal(
        mut self,
        f: impl Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        self.parse_literal = Some(Arc::new(f));
        self
    }

    /// Returns whether an input value is accepted by the parse hooks.
    ///
    /// Variables and literals reach the compiled schema as the same value
    /// type, so a value is accepted when any present parse hook accepts it.
    pub fn accepts(&self, value: &Value) -> bool {
        let hooks: Vec<&ScalarFn> = [&self.parse_literal, &self.parse_value]
            .into_iter()
            .flatten()
            .collect();
        hooks.is_empty() || hooks.iter().any(|hook| hook(value).is_ok())
    }
}

/// Where a directive visitor is applied.
#[derive(Debug, Clone)]
pub struct DirectiveSite {
    /// Directive name, without `@`.
    pub directive: String,
    pub type_name: String,
    pub field_name: String,
    /// Arguments written on the directive.
    pub arguments: IndexMap<String, Value>,
}

/// Native return type hint for a field bound to a built-in scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeType {
    Int,
    Float,
    String,
    Boolean,
    Id,
}

impl NativeType {
    /// Name of the built-in scalar this native type maps to.
    #[must_use]
    pub fn graphql_name(self) -> &'static str {
        match self {
            Self::Int => "Int",
            Self::Float => "Float",
            Self::String => "String",
            Self::Boolean => "Boolean",
            Self::Id => "ID",
        }
    }
}
