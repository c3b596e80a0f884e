//! Typed event channels with persisted bindings and transient listeners.
//!
//! An [`EventChannel`] owns a [`BindingGroup`] configured ahead of time and a
//! list of listeners added from code. Invoking the channel runs the bindings
//! first, in order, then the listeners in registration order. Only the bindings
//! are persisted.
//!
//! Channels exist for zero to four arguments; [`Event0`] to [`Event4`] name them.
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use callwire::prelude::*;
//!
//! let table = MethodTable::new();
//! let ctx = InvokeContext::runtime(&table);
//!
//! let total = Rc::new(Cell::new(0));
//! let seen = Rc::clone(&total);
//! let mut on_score: Event1<i32> = Event1::new();
//! on_score.add_listener(Rc::new(move |n: i32| seen.set(seen.get() + n)));
//!
//! on_score.invoke(&ctx, 5);
//! assert_eq!(total.get(), 5);
//! ```

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use callwire_core::{Argument, Dynamic, IntoDynamic, TypeInfo};

use crate::context::InvokeContext;
use crate::group::{BindingGroup, DispatchSummary};

/// The argument list of a channel, as a tuple of [`Argument`] types.
pub trait EventArgs: 'static {
    /// Listener signature for this argument list.
    type Listener: ?Sized + 'static;

    /// The declared type of each argument, in order.
    fn declared_types() -> Vec<TypeInfo>;
}

/// A persisted binding group plus transient listeners.
pub struct EventChannel<Args: EventArgs> {
    group: BindingGroup,
    listeners: Vec<Rc<Args::Listener>>,
}

pub type Event0 = EventChannel<()>;
pub type Event1<A> = EventChannel<(A,)>;
pub type Event2<A, B> = EventChannel<(A, B)>;
pub type Event3<A, B, C> = EventChannel<(A, B, C)>;
pub type Event4<A, B, C, D> = EventChannel<(A, B, C, D)>;

impl<Args: EventArgs> EventChannel<Args> {
    pub fn new() -> Self {
        Self::from_group(BindingGroup::new())
    }

    /// Wrap an existing group, constraining it to this channel's argument types.
    pub fn from_group(mut group: BindingGroup) -> Self {
        group.constrain_dynamic_types(Some(Arc::from(Args::declared_types())));
        Self {
            group,
            listeners: Vec::new(),
        }
    }

    pub fn group(&self) -> &BindingGroup {
        &self.group
    }

    pub fn group_mut(&mut self) -> &mut BindingGroup {
        &mut self.group
    }

    /// The declared argument types.
    pub fn declared_types(&self) -> Vec<TypeInfo> {
        Args::declared_types()
    }

    /// Register a listener. The same listener may be added more than once.
    pub fn add_listener(&mut self, listener: Rc<Args::Listener>) {
        self.listeners.push(listener);
    }

    /// Remove the first registration of `listener`, compared by identity.
    pub fn remove_listener(&mut self, listener: &Rc<Args::Listener>) -> bool {
        match self.listeners.iter().position(|l| Rc::ptr_eq(l, listener)) {
            Some(index) => {
                self.listeners.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }
}

macro_rules! impl_event_arity {
    ($($arg:ident: $ty:ident),*) => {
        impl<$($ty: Argument),*> EventArgs for ($($ty,)*) {
            type Listener = dyn Fn($($ty),*);

            fn declared_types() -> Vec<TypeInfo> {
                vec![$(<$ty as callwire_core::Typed>::type_info()),*]
            }
        }

        impl<$($ty: Argument),*> EventChannel<($($ty,)*)> {
            /// Run the bindings, then the listeners.
            ///
            /// Binding failures are logged and reported in the summary; they
            /// do not stop later bindings or the listeners.
            #[cfg_attr(feature = "profiling", profiling::function)]
            pub fn invoke(&mut self, ctx: &InvokeContext<'_>, $($arg: $ty),*) -> DispatchSummary {
                let args: Vec<Dynamic> = vec![$($arg.clone().into_dynamic()),*];
                let summary = self.group.invoke(ctx, &args);
                for listener in &self.listeners {
                    listener($($arg.clone()),*);
                }
                summary
            }
        }
    };
}

impl_event_arity!();
impl_event_arity!(a: A);
impl_event_arity!(a: A, b: B);
impl_event_arity!(a: A, b: B, c: C);
impl_event_arity!(a: A, b: B, c: C, d: D);

impl<Args: EventArgs> Default for EventChannel<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: EventArgs> Clone for EventChannel<Args> {
    /// Copies the bindings and the listener list.
    fn clone(&self) -> Self {
        Self {
            group: self.group.clone(),
            listeners: self.listeners.clone(),
        }
    }
}

impl<Args: EventArgs> fmt::Debug for EventChannel<Args> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("group", &self.group)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<Args: EventArgs> Serialize for EventChannel<Args> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.group.serialize(serializer)
    }
}

impl<'de, Args: EventArgs> Deserialize<'de> for EventChannel<Args> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        BindingGroup::deserialize(deserializer).map(Self::from_group)
    }
}
