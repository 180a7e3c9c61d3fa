//! Fine-grained reactive signal system
//!
//! A push-pull hybrid in the style of Leptos/SolidJS signals:
//! - Signals push invalidation to their subscribers when written
//! - Derived values recompute lazily on the next read
//! - Effects are queued and flushed once per write (or once per batch)
//!
//! Dependencies are tracked automatically: whatever a derived value or an
//! effect reads through [`ReactiveGraph::get`] becomes a dependency for its
//! next run.
//!
//! # State
//!
//! [`State<T>`] binds a signal to a [`SharedReactiveGraph`] so it can be read
//! and written without holding the graph. The scroll tracker hands its
//! outputs to the presentation layer this way.
//!
//! ```ignore
//! let percent: State<u8> = tracker.percent();
//! let current = percent.get();
//! ```

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::any::Any;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

new_key_type! {
    /// Unique identifier for a signal
    pub struct SignalId;
    /// Unique identifier for a derived value
    pub struct DerivedId;
    /// Unique identifier for an effect
    pub struct EffectId;
}

/// Nodes that can be invalidated by a signal write
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SubscriberId {
    Derived(DerivedId),
    Effect(EffectId),
}

/// A reactive signal handle (cheap to copy)
#[derive(Debug)]
pub struct Signal<T> {
    id: SignalId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Signal<T> {}

impl<T> Signal<T> {
    pub fn id(&self) -> SignalId {
        self.id
    }
}

/// A derived value handle
#[derive(Debug)]
pub struct Derived<T> {
    id: DerivedId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Derived<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Derived<T> {}

impl<T> Derived<T> {
    pub fn id(&self) -> DerivedId {
        self.id
    }
}

/// An effect handle
#[derive(Debug, Clone, Copy)]
pub struct Effect {
    id: EffectId,
}

impl Effect {
    pub fn id(&self) -> EffectId {
        self.id
    }
}

type ComputeFn = Box<dyn Fn(&ReactiveGraph) -> Box<dyn Any + Send> + Send>;
type EffectFn = Box<dyn FnMut(&ReactiveGraph) + Send>;
type Dependencies = SmallVec<[SignalId; 4]>;

struct SignalNode {
    value: Box<dyn Any + Send>,
    version: u64,
    subscribers: SmallVec<[SubscriberId; 4]>,
}

struct DerivedNode {
    value: Option<Box<dyn Any + Send>>,
    /// Taken out while the node recomputes
    compute: Option<ComputeFn>,
    dependencies: Dependencies,
    dirty: bool,
}

struct EffectNode {
    /// Taken out while the effect runs
    run: Option<EffectFn>,
    dependencies: Dependencies,
    dirty: bool,
}

/// The reactive graph that owns all signals, derived values and effects
pub struct ReactiveGraph {
    signals: SlotMap<SignalId, SignalNode>,
    derived: SlotMap<DerivedId, DerivedNode>,
    effects: SlotMap<EffectId, EffectNode>,
    pending_effects: VecDeque<EffectId>,
    batch_depth: u32,
    /// Dependencies read by the derived/effect currently running
    tracking: RefCell<Option<Vec<SignalId>>>,
    global_version: u64,
}

impl ReactiveGraph {
    pub fn new() -> Self {
        Self {
            signals: SlotMap::with_key(),
            derived: SlotMap::with_key(),
            effects: SlotMap::with_key(),
            pending_effects: VecDeque::new(),
            batch_depth: 0,
            tracking: RefCell::new(None),
            global_version: 0,
        }
    }

    // =========================================================================
    // SIGNALS
    // =========================================================================

    /// Create a new signal with an initial value
    pub fn create_signal<T: Send + 'static>(&mut self, initial: T) -> Signal<T> {
        let id = self.signals.insert(SignalNode {
            value: Box::new(initial),
            version: 0,
            subscribers: SmallVec::new(),
        });
        Signal {
            id,
            _marker: PhantomData,
        }
    }

    /// Get the current value of a signal
    ///
    /// Inside a derived computation or an effect the signal is recorded as a
    /// dependency.
    pub fn get<T: Clone + 'static>(&self, signal: Signal<T>) -> Option<T> {
        if let Some(ref mut deps) = *self.tracking.borrow_mut() {
            if !deps.contains(&signal.id) {
                deps.push(signal.id);
            }
        }
        self.get_untracked(signal)
    }

    /// Get the current value without recording a dependency
    pub fn get_untracked<T: Clone + 'static>(&self, signal: Signal<T>) -> Option<T> {
        self.signals
            .get(signal.id)
            .and_then(|node| node.value.downcast_ref::<T>().cloned())
    }

    /// Set the value of a signal, invalidating its subscribers
    pub fn set<T: Send + 'static>(&mut self, signal: Signal<T>, value: T) {
        let Some(node) = self.signals.get_mut(signal.id) else {
            return;
        };
        node.value = Box::new(value);
        node.version += 1;
        self.global_version += 1;

        let subscribers = node.subscribers.clone();
        for sub in subscribers {
            self.mark_dirty(sub);
        }

        if self.batch_depth == 0 {
            self.flush_effects();
        }
    }

    /// Update a signal from its current value
    pub fn update<T, F>(&mut self, signal: Signal<T>, f: F)
    where
        T: Clone + Send + 'static,
        F: FnOnce(T) -> T,
    {
        if let Some(current) = self.get_untracked(signal) {
            self.set(signal, f(current));
        }
    }

    /// Number of writes a signal has seen
    pub fn signal_version(&self, id: SignalId) -> Option<u64> {
        self.signals.get(id).map(|n| n.version)
    }

    /// Remove a signal; its subscribers simply stop being notified
    pub fn dispose_signal<T>(&mut self, signal: Signal<T>) {
        self.signals.remove(signal.id);
    }

    // =========================================================================
    // DERIVED VALUES
    // =========================================================================

    /// Create a derived value, computed on first read
    pub fn create_derived<T, F>(&mut self, compute: F) -> Derived<T>
    where
        T: Clone + Send + 'static,
        F: Fn(&ReactiveGraph) -> T + Send + 'static,
    {
        let compute: ComputeFn =
            Box::new(move |graph: &ReactiveGraph| -> Box<dyn Any + Send> { Box::new(compute(graph)) });

        let id = self.derived.insert(DerivedNode {
            value: None,
            compute: Some(compute),
            dependencies: SmallVec::new(),
            dirty: true,
        });

        Derived {
            id,
            _marker: PhantomData,
        }
    }

    /// Read a derived value, recomputing it if a dependency changed
    pub fn get_derived<T: Clone + 'static>(&mut self, derived: Derived<T>) -> Option<T> {
        let node = self.derived.get_mut(derived.id)?;
        if !node.dirty {
            if let Some(ref cached) = node.value {
                return cached.downcast_ref::<T>().cloned();
            }
        }

        let compute = node.compute.take()?;
        let outer = self.tracking.replace(Some(Vec::new()));
        let value = compute(self);
        let deps = self.tracking.replace(outer).unwrap_or_default();

        let sub = SubscriberId::Derived(derived.id);
        let old_deps = self
            .derived
            .get(derived.id)
            .map(|n| n.dependencies.clone())
            .unwrap_or_default();
        self.resubscribe(sub, &old_deps, &deps);

        let node = self.derived.get_mut(derived.id)?;
        node.compute = Some(compute);
        node.dependencies = deps.into_iter().collect();
        node.dirty = false;

        let result = value.downcast_ref::<T>().cloned();
        node.value = Some(value);
        result
    }

    /// Remove a derived value from the graph
    pub fn dispose_derived<T>(&mut self, derived: Derived<T>) {
        if let Some(node) = self.derived.remove(derived.id) {
            self.resubscribe(SubscriberId::Derived(derived.id), &node.dependencies, &[]);
        }
    }

    // =========================================================================
    // EFFECTS
    // =========================================================================

    /// Create an effect; it runs immediately and again whenever a signal it
    /// read on its last run is written
    pub fn create_effect<F>(&mut self, run: F) -> Effect
    where
        F: FnMut(&ReactiveGraph) + Send + 'static,
    {
        let id = self.effects.insert(EffectNode {
            run: Some(Box::new(run)),
            dependencies: SmallVec::new(),
            dirty: true,
        });

        self.pending_effects.push_back(id);
        if self.batch_depth == 0 {
            self.flush_effects();
        }

        Effect { id }
    }

    /// Dispose of an effect, removing it from the graph
    ///
    /// The effect's closure (and everything it captured) is dropped here.
    pub fn dispose_effect(&mut self, effect: Effect) {
        if let Some(node) = self.effects.remove(effect.id) {
            self.resubscribe(SubscriberId::Effect(effect.id), &node.dependencies, &[]);
        }
    }

    // =========================================================================
    // BATCHING
    // =========================================================================

    /// Start a batch - effects won't run until the batch ends
    pub fn batch_start(&mut self) {
        self.batch_depth += 1;
    }

    /// End a batch and flush pending effects when the outermost batch closes
    pub fn batch_end(&mut self) {
        if self.batch_depth > 0 {
            self.batch_depth -= 1;
            if self.batch_depth == 0 {
                self.flush_effects();
            }
        }
    }

    /// Run a function in a batch context
    pub fn batch<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        self.batch_start();
        let result = f(self);
        self.batch_end();
        result
    }

    // =========================================================================
    // INTERNAL
    // =========================================================================

    fn mark_dirty(&mut self, sub: SubscriberId) {
        match sub {
            SubscriberId::Derived(id) => {
                if let Some(node) = self.derived.get_mut(id) {
                    node.dirty = true;
                }
            }
            SubscriberId::Effect(id) => {
                if let Some(node) = self.effects.get_mut(id) {
                    if !node.dirty {
                        node.dirty = true;
                        self.pending_effects.push_back(id);
                    }
                }
            }
        }
    }

    fn flush_effects(&mut self) {
        while let Some(effect_id) = self.pending_effects.pop_front() {
            self.run_effect(effect_id);
        }
    }

    fn run_effect(&mut self, effect_id: EffectId) {
        let Some(node) = self.effects.get_mut(effect_id) else {
            return;
        };
        if !node.dirty {
            return;
        }
        node.dirty = false;
        let Some(mut run) = node.run.take() else {
            return;
        };

        let outer = self.tracking.replace(Some(Vec::new()));
        run(self);
        let deps = self.tracking.replace(outer).unwrap_or_default();

        let sub = SubscriberId::Effect(effect_id);
        let old_deps = self
            .effects
            .get(effect_id)
            .map(|n| n.dependencies.clone())
            .unwrap_or_default();
        self.resubscribe(sub, &old_deps, &deps);

        if let Some(node) = self.effects.get_mut(effect_id) {
            node.run = Some(run);
            node.dependencies = deps.into_iter().collect();
        }
    }

    fn resubscribe(&mut self, sub: SubscriberId, old: &[SignalId], new: &[SignalId]) {
        for dep_id in old {
            if let Some(sig) = self.signals.get_mut(*dep_id) {
                sig.subscribers.retain(|s| *s != sub);
            }
        }
        for dep_id in new {
            if let Some(sig) = self.signals.get_mut(*dep_id) {
                if !sig.subscribers.contains(&sub) {
                    sig.subscribers.push(sub);
                }
            }
        }
    }

    /// Get statistics about the reactive graph
    pub fn stats(&self) -> ReactiveStats {
        ReactiveStats {
            signal_count: self.signals.len(),
            derived_count: self.derived.len(),
            effect_count: self.effects.len(),
            pending_effects: self.pending_effects.len(),
            global_version: self.global_version,
        }
    }
}

impl Default for ReactiveGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about the reactive graph
#[derive(Debug, Clone)]
pub struct ReactiveStats {
    pub signal_count: usize,
    pub derived_count: usize,
    pub effect_count: usize,
    pub pending_effects: usize,
    pub global_version: u64,
}

// =============================================================================
// STATE - signal bound to a shared graph
// =============================================================================

/// Shared reactive graph for access from event callbacks
pub type SharedReactiveGraph = Arc<Mutex<ReactiveGraph>>;

/// Create an empty shared graph
pub fn shared_graph() -> SharedReactiveGraph {
    Arc::new(Mutex::new(ReactiveGraph::new()))
}

/// A signal bound to its graph, readable and writable without a graph borrow
#[derive(Clone)]
pub struct State<T> {
    signal: Signal<T>,
    reactive: SharedReactiveGraph,
}

impl<T: Clone + Send + 'static> State<T> {
    pub fn new(signal: Signal<T>, reactive: SharedReactiveGraph) -> Self {
        Self { signal, reactive }
    }

    /// Get the current value, or the default if the signal is gone
    pub fn get(&self) -> T
    where
        T: Default,
    {
        self.try_get().unwrap_or_default()
    }

    /// Get the current value, returning None if the signal was disposed
    pub fn try_get(&self) -> Option<T> {
        self.reactive.lock().unwrap().get_untracked(self.signal)
    }

    /// Set a new value, running dependent effects
    pub fn set(&self, value: T) {
        self.reactive.lock().unwrap().set(self.signal, value);
    }

    /// Update the value using a function
    pub fn update(&self, f: impl FnOnce(T) -> T) {
        self.reactive.lock().unwrap().update(self.signal, f);
    }

    pub fn signal(&self) -> Signal<T> {
        self.signal
    }

    pub fn signal_id(&self) -> SignalId {
        self.signal.id()
    }
}
