//! Resource registry and request dispatch.
//!
//! Resources are matched in registration order on their exact URI. The query
//! part of a request (`?` and everything after it) is ignored for matching but
//! still reaches the handler.
//!
//! # Example
//!
//! ```ignore
//! let mut registry = Registry::new();
//! registry.register(
//!     Resource::new("light1", "/lights/light1")
//!         .with_handler(Verb::Get, |_body: &mut Body| {})?
//!         .with_handler(Verb::Put, |body: &mut Body| {
//!             let _ = body.replace(b"value updated!");
//!         })?,
//! );
//! ```

use std::fmt;

use urest_core::error::{ErrorKind, Result};
use urest_protocol::{frame::EnumConverter, Status, Verb};

use crate::body::{split_query, Body};

/// Code run for one verb on one resource.
///
/// The handler reads the request from `body` and leaves the response in it.
pub trait VerbHandler: Send + Sync {
    /// Handles one request.
    fn handle(&self, body: &mut Body);
}

impl<F> VerbHandler for F
where
    F: Fn(&mut Body) + Send + Sync,
{
    fn handle(&self, body: &mut Body) {
        self(body)
    }
}

/// A named URI with one optional handler per verb.
pub struct Resource {
    name: String,
    uri: String,
    handlers: [Option<Box<dyn VerbHandler>>; 4],
}

impl Resource {
    /// Creates a resource with no handlers; every verb is answered with 405.
    pub fn new(name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self { name: name.into(), uri: uri.into(), handlers: Default::default() }
    }

    /// Attaches `handler` to `verb`, replacing any previous one.
    ///
    /// PING is answered by the server itself and has no handler slot.
    pub fn set_handler<H>(&mut self, verb: Verb, handler: H) -> Result<()>
    where
        H: VerbHandler + 'static,
    {
        let slot = verb.handler_slot().ok_or(ErrorKind::UnsupportedVerb(verb.to_u8()))?;
        self.handlers[slot] = Some(Box::new(handler));
        Ok(())
    }

    /// Builder form of [`Resource::set_handler`].
    pub fn with_handler<H>(mut self, verb: Verb, handler: H) -> Result<Self>
    where
        H: VerbHandler + 'static,
    {
        self.set_handler(verb, handler)?;
        Ok(self)
    }

    /// Handler attached to `verb`, if any.
    pub fn handler(&self, verb: Verb) -> Option<&dyn VerbHandler> {
        let slot = verb.handler_slot()?;
        self.handlers[slot].as_deref()
    }

    /// Returns true if `verb` has a handler.
    pub fn allows(&self, verb: Verb) -> bool {
        self.handler(verb).is_some()
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// URI path the resource answers to.
    pub fn uri(&self) -> &str {
        &self.uri
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verbs: Vec<Verb> = Verb::HANDLED.iter().copied().filter(|verb| self.allows(*verb)).collect();
        f.debug_struct("Resource")
            .field("name", &self.name)
            .field("uri", &self.uri)
            .field("verbs", &verbs)
            .finish()
    }
}

/// Where a request goes.
pub enum Route<'r> {
    /// Run `handler` of `resource`.
    Handler {
        /// Matched resource
        resource: &'r Resource,
        /// Its handler for the requested verb
        handler: &'r dyn VerbHandler,
    },
    /// No resource has the requested path.
    NotFound,
    /// The resource exists but has no handler for the verb.
    NotAllowed(&'r Resource),
    /// Liveness check; nothing to dispatch.
    Ping,
}

impl Route<'_> {
    /// Status acknowledging the final request fragment.
    ///
    /// PROCESSING for a handler; the response is pulled afterwards.
    pub fn status(&self) -> Status {
        match self {
            Route::Handler { .. } => Status::PROCESSING,
            Route::NotFound => Status::NOT_FOUND,
            Route::NotAllowed(_) => Status::NOT_ALLOWED,
            Route::Ping => Status::PING_ACK,
        }
    }
}

impl fmt::Debug for Route<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Handler { resource, .. } => f.debug_tuple("Handler").field(&resource.name()).finish(),
            Route::NotFound => f.write_str("NotFound"),
            Route::NotAllowed(resource) => f.debug_tuple("NotAllowed").field(&resource.name()).finish(),
            Route::Ping => f.write_str("Ping"),
        }
    }
}

/// Ordered, append-only collection of resources.
#[derive(Debug, Default)]
pub struct Registry {
    resources: Vec<Resource>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a resource. A later resource with the same URI is never reached.
    pub fn register(&mut self, resource: Resource) -> &mut Self {
        self.resources.push(resource);
        self
    }

    /// Number of registered resources.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Resources in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    /// First resource whose URI equals the request's path.
    pub fn find(&self, request: &[u8]) -> Option<&Resource> {
        let (path, _) = split_query(request);
        self.resources.iter().find(|resource| resource.uri.as_bytes() == path)
    }

    /// Resolves a request to a route.
    pub fn dispatch(&self, request: &[u8], verb: Verb) -> Route<'_> {
        if verb == Verb::Ping {
            return Route::Ping;
        }
        match self.find(request) {
            None => Route::NotFound,
            Some(resource) => match resource.handler(verb) {
                Some(handler) => Route::Handler { resource, handler },
                None => Route::NotAllowed(resource),
            },
        }
    }
}
