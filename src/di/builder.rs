use std::any::{type_name, Any};
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::{debug, instrument};

use super::cache::{restore, ResolutionCache, Synthesizer};
use super::capability::{Capability, CapabilityId};
use super::error::ContainerError;
use super::synthetic::{SyntheticEntry, SyntheticFactory};

/// A concrete type the container can construct from its dependencies.
///
/// `parameters` lists the constructor dependencies in declared order;
/// `construct` receives them in the same order through [`Arguments::next`].
///
/// ```rust
/// use std::rc::Rc;
/// use autofake::{Arguments, ContainerError, Injectable, Parameter};
///
/// pub trait Greeter {
///     fn greet(&self) -> String;
/// }
///
/// struct Welcome {
///     greeter: Rc<dyn Greeter>,
/// }
///
/// impl Injectable for Welcome {
///     fn parameters() -> Vec<Parameter> {
///         vec![Parameter::provided::<dyn Greeter>()]
///     }
///
///     fn construct(args: &mut Arguments) -> Result<Self, ContainerError> {
///         Ok(Self { greeter: args.next()? })
///     }
/// }
/// ```
pub trait Injectable: Sized + 'static {
    fn parameters() -> Vec<Parameter>;
    fn construct(args: &mut Arguments) -> Result<Self, ContainerError>;
}

type Constructor = fn(&mut BuildSession<'_>) -> Result<Rc<dyn Any>, ContainerError>;

#[derive(Clone, Copy)]
enum Strategy {
    /// Fall back to a fake
    Synthesize(Synthesizer),
    /// Must have been provided
    ProvidedOnly,
    /// Build recursively from its own parameters
    Construct(Constructor),
}

/// One declared constructor parameter
#[derive(Clone, Copy)]
pub struct Parameter {
    id: CapabilityId,
    strategy: Strategy,
}

impl Parameter {
    /// A capability that is faked unless configured otherwise
    pub fn capability<C: Capability + ?Sized>() -> Self {
        Self {
            id: CapabilityId::of::<C>(),
            strategy: Strategy::Synthesize(SyntheticFactory::create::<C>),
        }
    }

    /// A dependency with no synthesis strategy; it must be provided
    pub fn provided<T: ?Sized + 'static>() -> Self {
        Self {
            id: CapabilityId::of::<T>(),
            strategy: Strategy::ProvidedOnly,
        }
    }

    /// A concrete dependency built from its own parameters unless provided
    pub fn injectable<T: Injectable>() -> Self {
        Self {
            id: CapabilityId::of::<T>(),
            strategy: Strategy::Construct(construct_erased::<T>),
        }
    }

    pub fn id(&self) -> CapabilityId {
        self.id
    }
}

impl std::fmt::Debug for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let strategy = match self.strategy {
            Strategy::Synthesize(_) => "synthesize",
            Strategy::ProvidedOnly => "provided",
            Strategy::Construct(_) => "construct",
        };
        f.debug_struct("Parameter")
            .field("id", &self.id)
            .field("strategy", &strategy)
            .finish()
    }
}

fn construct_erased<T: Injectable>(
    session: &mut BuildSession<'_>,
) -> Result<Rc<dyn Any>, ContainerError> {
    let value: Rc<T> = Rc::new(session.construct::<T>()?);
    Ok(Rc::new(value))
}

/// Resolved constructor arguments, consumed in declared order
pub struct Arguments {
    target: &'static str,
    values: Vec<(CapabilityId, Rc<dyn Any>)>,
    position: usize,
}

impl Arguments {
    fn new(target: &'static str, values: Vec<(CapabilityId, Rc<dyn Any>)>) -> Self {
        Self {
            target,
            values,
            position: 0,
        }
    }

    /// Take the next argument, which must have been declared as `T`
    pub fn next<T: ?Sized + 'static>(&mut self) -> Result<Rc<T>, ContainerError> {
        let expected = CapabilityId::of::<T>();
        match self.values.get(self.position) {
            Some((id, value)) if *id == expected => {
                self.position += 1;
                restore::<T>(id, value)
            }
            _ => Err(ContainerError::ParameterMismatch {
                target: self.target,
                position: self.position,
                expected: expected.name(),
            }),
        }
    }
}

/// State of one `build` call. Fakes minted here only reach the registry if
/// the whole graph is constructed.
struct BuildSession<'a> {
    cache: &'a mut ResolutionCache,
    staged: IndexMap<CapabilityId, SyntheticEntry>,
    used: Vec<CapabilityId>,
    stack: Vec<&'static str>,
}

impl BuildSession<'_> {
    fn construct<T: Injectable>(&mut self) -> Result<T, ContainerError> {
        let target = type_name::<T>();
        if self.stack.contains(&target) {
            let mut chain = self.stack.clone();
            chain.push(target);
            return Err(ContainerError::CircularDependency { chain });
        }

        self.stack.push(target);
        let result = self.construct_unchecked::<T>(target);
        self.stack.pop();
        result
    }

    fn construct_unchecked<T: Injectable>(
        &mut self,
        target: &'static str,
    ) -> Result<T, ContainerError> {
        let parameters = T::parameters();
        let mut values = Vec::with_capacity(parameters.len());
        for parameter in &parameters {
            let value = self.resolve_parameter(parameter, target)?;
            values.push((parameter.id, value));
        }

        T::construct(&mut Arguments::new(target, values))
    }

    fn resolve_parameter(
        &mut self,
        parameter: &Parameter,
        target: &'static str,
    ) -> Result<Rc<dyn Any>, ContainerError> {
        let id = parameter.id;
        if let Some(existing) = self.cache.lookup_erased(&id) {
            self.used.push(id);
            return Ok(existing);
        }
        if let Some(staged) = self.staged.get(&id) {
            return Ok(Rc::clone(&staged.exposed));
        }

        match parameter.strategy {
            Strategy::Synthesize(synthesize) => {
                let entry = self.cache.mint(synthesize);
                let exposed = Rc::clone(&entry.exposed);
                self.staged.insert(id, entry);
                self.used.push(id);
                Ok(exposed)
            }
            Strategy::ProvidedOnly => Err(ContainerError::UnresolvableCapability {
                capability: id.name(),
                target,
            }),
            Strategy::Construct(construct) => construct(self),
        }
    }
}

/// Constructs targets by resolving their parameters through a [`ResolutionCache`]
pub struct DependencyGraphBuilder<'a> {
    cache: &'a mut ResolutionCache,
}

impl<'a> DependencyGraphBuilder<'a> {
    pub fn new(cache: &'a mut ResolutionCache) -> Self {
        Self { cache }
    }

    /// Build `T`, committing newly synthesized fakes only on success
    #[instrument(skip(self), fields(target = type_name::<T>()))]
    pub fn build<T: Injectable>(self) -> Result<T, ContainerError> {
        let mut session = BuildSession {
            cache: self.cache,
            staged: IndexMap::new(),
            used: Vec::new(),
            stack: Vec::new(),
        };

        let value = session.construct::<T>()?;

        let staged = std::mem::take(&mut session.staged);
        let used = std::mem::take(&mut session.used);
        debug!(synthesized = staged.len(), "dependency graph built");
        session.cache.commit(staged, used);
        Ok(value)
    }
}
