//! View-agnostic state containers.
//!
//! Each store owns one [`Loadable`] per operation it exposes. A view renders
//! from the loadables; the async methods drive them through
//! `Loading` → `HasData` / `HasError`.

pub mod ai;
pub mod auth;
pub mod completion;
pub mod document;
pub mod usage;

pub use ai::AiStore;
pub use auth::AuthStore;
pub use completion::{CompletionState, CompletionStore};
pub use document::DocumentStore;
pub use usage::UsageStore;

use crate::client::ClientError;

/// Lifecycle of a [`Loadable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataState {
    #[default]
    NotInited,
    Loading,
    HasData,
    HasError,
}

/// A value that is loaded asynchronously and may fail.
///
/// `set_error` keeps the last value so a view can keep showing stale data
/// next to the error.
#[derive(Debug, Clone)]
pub struct Loadable<T> {
    value: T,
    err: Option<String>,
    state: DataState,
    initial: T,
}

impl<T: Clone> Loadable<T> {
    pub fn new(value: T) -> Self {
        Self {
            initial: value.clone(),
            value,
            err: None,
            state: DataState::NotInited,
        }
    }

    pub fn state(&self) -> DataState {
        self.state
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn error(&self) -> Option<&str> {
        self.err.as_deref()
    }

    pub fn not_inited(&self) -> bool {
        self.state == DataState::NotInited
    }

    pub fn loading(&self) -> bool {
        self.state == DataState::Loading
    }

    pub fn has_data(&self) -> bool {
        self.state == DataState::HasData
    }

    pub fn has_error(&self) -> bool {
        self.state == DataState::HasError
    }

    /// Back to the value this loadable was created with.
    pub fn reset(&mut self) -> &mut Self {
        self.state = DataState::NotInited;
        self.err = None;
        self.value = self.initial.clone();
        self
    }

    pub fn set_loading(&mut self) -> &mut Self {
        self.state = DataState::Loading;
        self
    }

    pub fn set_value(&mut self, value: T) -> &mut Self {
        self.state = DataState::HasData;
        self.value = value;
        self.err = None;
        self
    }

    pub fn set_error(&mut self, err: impl Into<String>) -> &mut Self {
        self.state = DataState::HasError;
        self.err = Some(err.into());
        self
    }

    /// Record the outcome of an operation.
    pub fn settle(&mut self, result: Result<T, ClientError>) -> &mut Self {
        match result {
            Ok(value) => self.set_value(value),
            Err(e) => self.set_error(e.message()),
        }
    }
}

impl<T: Clone + Default> Default for Loadable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
