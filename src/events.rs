//! Change notifications from the generator to its observers.
//!
//! Observable properties form a closed enum, so a listener can't subscribe to
//! a key that doesn't exist. Every event carries the old and the new value.
//! The bus is write-one (only the generator fires) and read-many.

use crate::encoding::Charset;
use crate::types::{Dimension, ErrorCorrectionLevel, SizingMode, TriState};
use std::fmt;

/// Every externally observable generator property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Content,
    Charset,
    ErrorCorrection,
    Mode,
    RequestedDimension,
    ActualDimension,
    ModuleSize,
    ExceedsRequestedDimension,
    WasEncodable,
    WasAscii,
    /// Fired once per `generate_code` call, success or failure.
    ResultUpdated,
}

impl Property {
    pub fn name(self) -> &'static str {
        match self {
            Property::Content => "content",
            Property::Charset => "charset",
            Property::ErrorCorrection => "error-correction",
            Property::Mode => "mode",
            Property::RequestedDimension => "requested-dimension",
            Property::ActualDimension => "actual-dimension",
            Property::ModuleSize => "module-size",
            Property::ExceedsRequestedDimension => "exceeds-requested-dimension",
            Property::WasEncodable => "was-encodable",
            Property::WasAscii => "was-ascii",
            Property::ResultUpdated => "result-updated",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Old or new value carried by a [`ChangeEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Text(Option<String>),
    Charset(Option<Charset>),
    ErrorCorrection(ErrorCorrectionLevel),
    Mode(SizingMode),
    Dimension(Option<Dimension>),
    ModuleSize(Option<u32>),
    Flag(TriState),
    /// Whether a rendered result is present.
    HasResult(bool),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub property: Property,
    pub old: PropertyValue,
    pub new: PropertyValue,
}

/// Handle returned by [`ChangeBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&ChangeEvent) + Send>;

struct Subscription {
    id: ListenerId,
    filter: Option<Property>,
    listener: Listener,
}

#[derive(Default)]
pub struct ChangeBus {
    next_id: u64,
    subscriptions: Vec<Subscription>,
}

impl fmt::Debug for ChangeBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeBus")
            .field("listeners", &self.subscriptions.len())
            .finish()
    }
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn add(&mut self, filter: Option<Property>, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription {
            id,
            filter,
            listener,
        });
        id
    }

    /// Listen to every property.
    pub fn subscribe(&mut self, listener: impl FnMut(&ChangeEvent) + Send + 'static) -> ListenerId {
        self.add(None, Box::new(listener))
    }

    /// Listen to one property only.
    pub fn subscribe_to(
        &mut self,
        property: Property,
        listener: impl FnMut(&ChangeEvent) + Send + 'static,
    ) -> ListenerId {
        self.add(Some(property), Box::new(listener))
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Deliver `event` to every matching listener, in subscription order.
    pub(crate) fn fire(&mut self, event: ChangeEvent) {
        tracing::trace!(property = %event.property, "change event");
        for sub in &mut self.subscriptions {
            if sub.filter.is_none_or(|p| p == event.property) {
                (sub.listener)(&event);
            }
        }
    }

    /// Fire only if the value actually changed.
    pub(crate) fn fire_if_changed(
        &mut self,
        property: Property,
        old: PropertyValue,
        new: PropertyValue,
    ) {
        if old != new {
            self.fire(ChangeEvent { property, old, new });
        }
    }
}
