use std::fmt;
use std::rc::Rc;

/// Decides whether a stub rule applies to the arguments of a call
pub enum ArgMatcher<A> {
    /// Matches every call
    Any,
    /// Matches calls whose arguments satisfy the predicate
    When(Rc<dyn Fn(&A) -> bool>),
}

impl<A: 'static> ArgMatcher<A> {
    pub fn any() -> Self {
        ArgMatcher::Any
    }

    pub fn when(predicate: impl Fn(&A) -> bool + 'static) -> Self {
        ArgMatcher::When(Rc::new(predicate))
    }

    /// Matches calls whose argument tuple equals `expected`
    pub fn eq(expected: A) -> Self
    where
        A: PartialEq,
    {
        ArgMatcher::When(Rc::new(move |args: &A| *args == expected))
    }

    pub fn matches(&self, args: &A) -> bool {
        match self {
            ArgMatcher::Any => true,
            ArgMatcher::When(predicate) => predicate(args),
        }
    }
}

impl<A> Clone for ArgMatcher<A> {
    fn clone(&self) -> Self {
        match self {
            ArgMatcher::Any => ArgMatcher::Any,
            ArgMatcher::When(predicate) => ArgMatcher::When(Rc::clone(predicate)),
        }
    }
}

impl<A> fmt::Debug for ArgMatcher<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgMatcher::Any => f.write_str("Any"),
            ArgMatcher::When(_) => f.write_str("When(..)"),
        }
    }
}

/// What a stubbed call does
pub enum Behavior<A, R> {
    /// Return a clone of the value
    Return(R),
    /// Compute the result from the call arguments
    Invoke(Rc<dyn Fn(&A) -> R>),
}

impl<A: 'static, R: Clone + 'static> Behavior<A, R> {
    pub fn returns(value: R) -> Self {
        Behavior::Return(value)
    }

    pub fn invokes(callback: impl Fn(&A) -> R + 'static) -> Self {
        Behavior::Invoke(Rc::new(callback))
    }

    pub fn run(&self, args: &A) -> R {
        match self {
            Behavior::Return(value) => value.clone(),
            Behavior::Invoke(callback) => callback(args),
        }
    }
}

impl<A, R: fmt::Debug> fmt::Debug for Behavior<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Behavior::Return(value) => f.debug_tuple("Return").field(value).finish(),
            Behavior::Invoke(_) => f.write_str("Invoke(..)"),
        }
    }
}

/// One configured override of an operation
pub struct StubRule<A, R> {
    pub matcher: ArgMatcher<A>,
    pub behavior: Behavior<A, R>,
}

impl<A: 'static, R: Clone + 'static> StubRule<A, R> {
    pub fn new(matcher: ArgMatcher<A>, behavior: Behavior<A, R>) -> Self {
        Self { matcher, behavior }
    }

    /// Run the behavior if the matcher accepts the arguments
    pub fn apply(&self, args: &A) -> Option<R> {
        if self.matcher.matches(args) {
            Some(self.behavior.run(args))
        } else {
            None
        }
    }
}
