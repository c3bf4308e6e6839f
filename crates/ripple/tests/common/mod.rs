//! Shared fixtures for the integration tests: scripted service methods and
//! a store that records the order of its operations.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use ripple::effects::{MutationEffect, RollbackContext};
use ripple::methods::{MutationMethod, QueryMethod, ServiceMethod};
use ripple::stores::{InvalidateScope, MemStore, QueryStore};
use ripple::{
    CacheKey, CallError, CallResult, EffectError, EffectResult, ServiceError, TransportOptions,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Scripted responses plus call bookkeeping, shared between a method value
/// and the test that owns it.
#[derive(Debug)]
pub struct Script<T> {
    inner: Rc<ScriptInner<T>>,
}

#[derive(Debug)]
struct ScriptInner<T> {
    responses: RefCell<Vec<CallResult<T>>>,
    seen: RefCell<Vec<TransportOptions>>,
}

impl<T> Clone for Script<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Script<T> {
    pub fn new(responses: Vec<CallResult<T>>) -> Self {
        Self {
            inner: Rc::new(ScriptInner {
                responses: RefCell::new(responses),
                seen: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Number of calls the owning method has served.
    pub fn calls(&self) -> usize {
        self.inner.seen.borrow().len()
    }

    /// Transport options observed by each call, in order.
    pub fn seen(&self) -> Vec<TransportOptions> {
        self.inner.seen.borrow().clone()
    }

    fn next(&self, options: &TransportOptions) -> CallResult<T> {
        self.inner.seen.borrow_mut().push(options.clone());
        let mut responses = self.inner.responses.borrow_mut();
        assert!(!responses.is_empty(), "unscripted service call");
        responses.remove(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoPatch {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Counter {
    pub count: u32,
}

/// Mutation writing one todo.
#[derive(Debug, Clone)]
pub struct SaveTodo(pub Script<Todo>);

impl SaveTodo {
    pub fn ok(response: Todo) -> Self {
        Self(Script::new(vec![Ok(response)]))
    }

    pub fn err(error: CallError) -> Self {
        Self(Script::new(vec![Err(error)]))
    }
}

#[async_trait(?Send)]
impl ServiceMethod for SaveTodo {
    type Request = TodoPatch;
    type Response = Todo;

    const LABEL: &'static str = "save_todo";

    async fn call(&self, _request: &TodoPatch, options: &TransportOptions) -> CallResult<Todo> {
        self.0.next(options)
    }
}

impl MutationMethod for SaveTodo {}

/// Query reading one todo, keyed by the same request shape as [`SaveTodo`].
#[derive(Debug, Clone)]
pub struct TodoQuery(pub Script<Todo>);

impl TodoQuery {
    pub fn ok(response: Todo) -> Self {
        Self(Script::new(vec![Ok(response)]))
    }
}

#[async_trait(?Send)]
impl ServiceMethod for TodoQuery {
    type Request = TodoPatch;
    type Response = Todo;

    const LABEL: &'static str = "get_todo";

    async fn call(&self, _request: &TodoPatch, options: &TransportOptions) -> CallResult<Todo> {
        self.0.next(options)
    }
}

impl QueryMethod for TodoQuery {}

/// Query reading one todo by numeric id; exercises explicit key mapping.
#[derive(Debug, Clone)]
pub struct TodoByIdQuery(pub Script<Todo>);

#[async_trait(?Send)]
impl ServiceMethod for TodoByIdQuery {
    type Request = u32;
    type Response = Todo;

    const LABEL: &'static str = "get_todo_by_id";

    async fn call(&self, _request: &u32, options: &TransportOptions) -> CallResult<Todo> {
        self.0.next(options)
    }
}

impl QueryMethod for TodoByIdQuery {}

/// Mutation bumping a named counter.
#[derive(Debug, Clone)]
pub struct BumpCounter(pub Script<Counter>);

impl BumpCounter {
    pub fn ok(response: Counter) -> Self {
        Self(Script::new(vec![Ok(response)]))
    }

    pub fn err(error: CallError) -> Self {
        Self(Script::new(vec![Err(error)]))
    }
}

#[async_trait(?Send)]
impl ServiceMethod for BumpCounter {
    type Request = String;
    type Response = Counter;

    const LABEL: &'static str = "bump_counter";

    async fn call(&self, _request: &String, options: &TransportOptions) -> CallResult<Counter> {
        self.0.next(options)
    }
}

impl MutationMethod for BumpCounter {}

/// Query reading a named counter.
#[derive(Debug, Clone)]
pub struct CounterQuery(pub Script<Counter>);

impl CounterQuery {
    pub fn ok(response: Counter) -> Self {
        Self(Script::new(vec![Ok(response)]))
    }
}

#[async_trait(?Send)]
impl ServiceMethod for CounterQuery {
    type Request = String;
    type Response = Counter;

    const LABEL: &'static str = "get_counter";

    async fn call(&self, _request: &String, options: &TransportOptions) -> CallResult<Counter> {
        self.0.next(options)
    }
}

impl QueryMethod for CounterQuery {}

/// An effect whose rollback always fails; exercises the attempt-all
/// contract of the error phase.
#[derive(Debug)]
pub struct FailingRollback;

pub fn encoding_error() -> EffectError {
    EffectError::Encoding(serde_json::from_str::<Value>("not json").unwrap_err())
}

#[async_trait(?Send)]
impl MutationEffect<BumpCounter> for FailingRollback {
    async fn before_mutation(
        &self,
        _store: &dyn QueryStore,
        _request: &String,
    ) -> EffectResult<RollbackContext> {
        Ok(RollbackContext::new())
    }

    async fn after_success(
        &self,
        _store: &dyn QueryStore,
        _response: &Counter,
        _request: &String,
        _rollback: &RollbackContext,
    ) -> EffectResult<()> {
        Ok(())
    }

    async fn after_error(
        &self,
        _store: &dyn QueryStore,
        _error: &CallError,
        _request: &String,
        _rollback: &RollbackContext,
    ) -> EffectResult<()> {
        Err(encoding_error())
    }
}

pub fn service_error(code: u32, message: &str) -> ServiceError {
    ServiceError {
        code_name: None,
        code,
        message: message.to_string(),
        details: Vec::new(),
    }
}

pub fn transport_error() -> CallError {
    CallError::Transport("connection reset".to_string())
}

/// Store operations observed by [`RecordingStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoreOp {
    Cancel(String),
    Get(String),
    Set(String),
    Remove(String),
    Invalidate(String, InvalidateScope),
}

/// Wraps [`MemStore`] and records the order of every operation.
#[derive(Debug, Default)]
pub struct RecordingStore {
    pub inner: MemStore,
    ops: RefCell<Vec<StoreOp>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> Vec<StoreOp> {
        self.ops.borrow().clone()
    }
}

#[async_trait(?Send)]
impl QueryStore for RecordingStore {
    fn get_data(&self, key: &CacheKey) -> Option<Value> {
        self.ops.borrow_mut().push(StoreOp::Get(key.canonical()));
        self.inner.get_data(key)
    }

    fn set_data(&self, key: &CacheKey, value: Option<Value>) {
        self.ops.borrow_mut().push(StoreOp::Set(key.canonical()));
        self.inner.set_data(key, value);
    }

    async fn cancel_in_flight(&self, key: &CacheKey) {
        self.ops
            .borrow_mut()
            .push(StoreOp::Cancel(key.canonical()));
        self.inner.cancel_in_flight(key).await;
    }

    fn remove_entry(&self, key: &CacheKey) {
        self.ops
            .borrow_mut()
            .push(StoreOp::Remove(key.canonical()));
        self.inner.remove_entry(key);
    }

    async fn invalidate(&self, key: &CacheKey, scope: InvalidateScope) {
        self.ops
            .borrow_mut()
            .push(StoreOp::Invalidate(key.canonical(), scope));
        self.inner.invalidate(key, scope).await;
    }
}
