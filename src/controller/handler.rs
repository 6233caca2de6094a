//! Action handlers.
//!
//! Actions are plain closures or functions taking the per-request
//! [`Controller`] followed by zero to four `String` parameters, or a single
//! `Vec<String>` that receives every trailing segment. The number of
//! `String` arguments is the action's arity; the router slices the path
//! parameters to that length before calling.

use std::sync::Arc;

use crate::controller::context::Controller;
use crate::controller::outcome::Outcome;

/// Error type returned by application code (actions and hooks).
pub type ActionError = Box<dyn std::error::Error + Send + Sync>;

/// Result of invoking an action.
pub type ActionResult = Result<Outcome, ActionError>;

/// Number of positional parameters an action accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many leading parameters; extras are dropped.
    Fixed(usize),
    /// Every parameter, however many.
    Variadic,
}

/// Conversion of action return values into an [`ActionResult`].
pub trait IntoActionResult {
    fn into_action_result(self) -> ActionResult;
}

impl IntoActionResult for Outcome {
    fn into_action_result(self) -> ActionResult {
        Ok(self)
    }
}

impl IntoActionResult for () {
    fn into_action_result(self) -> ActionResult {
        Ok(Outcome::Empty)
    }
}

impl IntoActionResult for String {
    fn into_action_result(self) -> ActionResult {
        Ok(self.into())
    }
}

impl IntoActionResult for &'static str {
    fn into_action_result(self) -> ActionResult {
        Ok(self.into())
    }
}

impl IntoActionResult for serde_json::Value {
    fn into_action_result(self) -> ActionResult {
        Ok(self.into())
    }
}

impl<T, E> IntoActionResult for Result<T, E>
where
    T: Into<Outcome>,
    E: Into<ActionError>,
{
    fn into_action_result(self) -> ActionResult {
        self.map(Into::into).map_err(Into::into)
    }
}

/// A callable action. `Args` only disambiguates the closure signature.
pub trait Handler<Args>: Send + Sync + 'static {
    fn arity(&self) -> Arity;

    /// Invoke with parameters already sliced to the arity.
    fn call(&self, controller: &mut Controller, params: &[String]) -> ActionResult;
}

macro_rules! string_type {
    ($p:ident) => {
        String
    };
}

macro_rules! impl_handler {
    ($arity:literal $(, $p:ident)*) => {
        impl<F, R> Handler<[String; $arity]> for F
        where
            F: Fn(&mut Controller $(, string_type!($p))*) -> R + Send + Sync + 'static,
            R: IntoActionResult,
        {
            fn arity(&self) -> Arity {
                Arity::Fixed($arity)
            }

            #[allow(unused_variables, unused_mut)]
            fn call(&self, controller: &mut Controller, params: &[String]) -> ActionResult {
                let mut params = params.iter().cloned();
                $(let $p = params.next().unwrap_or_default();)*
                (self)(controller $(, $p)*).into_action_result()
            }
        }
    };
}

impl_handler!(0);
impl_handler!(1, p1);
impl_handler!(2, p1, p2);
impl_handler!(3, p1, p2, p3);
impl_handler!(4, p1, p2, p3, p4);

impl<F, R> Handler<Vec<String>> for F
where
    F: Fn(&mut Controller, Vec<String>) -> R + Send + Sync + 'static,
    R: IntoActionResult,
{
    fn arity(&self) -> Arity {
        Arity::Variadic
    }

    fn call(&self, controller: &mut Controller, params: &[String]) -> ActionResult {
        (self)(controller, params.to_vec()).into_action_result()
    }
}

type Invoke = dyn Fn(&mut Controller, &[String]) -> ActionResult + Send + Sync;

/// A named action with its type-erased invoker.
#[derive(Clone)]
pub struct Action {
    name: String,
    arity: Arity,
    invoke: Arc<Invoke>,
}

impl Action {
    pub fn new<H, Args>(name: impl Into<String>, handler: H) -> Self
    where
        H: Handler<Args>,
        Args: 'static,
    {
        Self {
            name: name.into(),
            arity: handler.arity(),
            invoke: Arc::new(move |controller, params| handler.call(controller, params)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// Parameters this action receives from `params`, or `None` when too few
    /// were supplied.
    pub fn bind<'a>(&self, params: &'a [String]) -> Option<&'a [String]> {
        match self.arity {
            Arity::Fixed(n) => params.get(..n),
            Arity::Variadic => Some(params),
        }
    }

    pub fn invoke(&self, controller: &mut Controller, params: &[String]) -> ActionResult {
        (self.invoke)(controller, params)
    }
}

impl std::fmt::Debug for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}
