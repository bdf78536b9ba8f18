// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The branch manager: orchestrates creation, return, force-return, cascade
//! cleanup, and shutdown, integrating the store, budget tracker, event bus,
//! timeout watchers, session validator, secret scrubber, and memory
//! searcher.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use branchfold_adapters::scrubber::SecretScrubber;
use branchfold_adapters::searcher::MemorySearcher;
use branchfold_adapters::validator::SessionValidator;
use branchfold_budget::BudgetTracker;
use branchfold_bus::EventBus;
use branchfold_core::{
    Branch, BranchError, BranchEvent, BranchId, BranchResult, BranchStatus, CallerId, Clock, IdGen,
    InjectedMemory, ProjectId, SessionId,
};
use branchfold_store::BranchRepository;
use parking_lot::Mutex;

use crate::config::ManagerConfig;
use crate::timeout::{self, TimeoutHandle};

/// Inputs to `Create`.
pub struct CreateRequest {
    pub session_id: SessionId,
    pub caller_id: CallerId,
    pub project_id: ProjectId,
    pub description: String,
    pub prompt: String,
    pub budget: Option<u64>,
    pub timeout_seconds: Option<u64>,
    pub inject_memories: bool,
}

/// Result of a successful `Create`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateResponse {
    pub branch_id: BranchId,
    pub depth: u32,
    pub budget_allocated: u64,
    pub injected_memories: Vec<InjectedMemory>,
}

/// Result of a successful `Return`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnResponse {
    pub success: bool,
    pub scrubbed_message: String,
    pub tokens_used: u64,
}

/// Snapshot returned by `Health`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthSnapshot {
    pub healthy: bool,
    pub active_count: usize,
    pub is_shutdown: bool,
}

/// Orchestrates the full branch lifecycle. Every public method may be
/// called concurrently; each component it composes guards its own state
/// with a single short critical section, and the manager never holds a
/// component lock while calling out to a collaborator.
pub struct BranchManager<C: Clock> {
    config: ManagerConfig,
    store: Arc<dyn BranchRepository>,
    budget: Arc<BudgetTracker>,
    bus: Arc<EventBus>,
    scrubber: Arc<dyn SecretScrubber>,
    validator: Arc<dyn SessionValidator>,
    searcher: Option<Arc<dyn MemorySearcher>>,
    id_gen: Arc<dyn IdGen>,
    clock: C,
    timeouts: Mutex<HashMap<BranchId, TimeoutHandle>>,
    active_count: AtomicUsize,
    shutdown: AtomicBool,
    /// Captured at construction so event handling can spawn force-returns
    /// without depending on the ambient ("ran from inside an async fn")
    /// ordering of its own callers. Without this, a synchronous caller of
    /// `consume_tokens` that triggers `handle_event` off the runtime would
    /// panic on `tokio::spawn`'s implicit current-runtime lookup.
    runtime: tokio::runtime::Handle,
}

impl<C: Clock> BranchManager<C> {
    /// Construct a manager and subscribe it to its own event bus.
    ///
    /// The subscription holds only a `Weak` reference to the manager: the
    /// bus lives inside the manager, so a strong back-reference would be a
    /// cycle. Events delivered after the manager itself has been dropped
    /// are silently ignored.
    ///
    /// Must be called from within a Tokio runtime context: it captures the
    /// current [`tokio::runtime::Handle`] so later event handling can spawn
    /// force-returns even when triggered by a synchronous caller that is
    /// not itself running on that runtime.
    pub fn new(
        config: ManagerConfig,
        store: Arc<dyn BranchRepository>,
        scrubber: Arc<dyn SecretScrubber>,
        validator: Arc<dyn SessionValidator>,
        searcher: Option<Arc<dyn MemorySearcher>>,
        id_gen: Arc<dyn IdGen>,
        clock: C,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let bus = Arc::new(EventBus::new());
            let handler_weak = weak.clone();
            bus.subscribe(Arc::new(move |event: &BranchEvent| {
                if let Some(manager) = handler_weak.upgrade() {
                    manager.handle_event(event.clone());
                }
            }));

            Self {
                config,
                store,
                budget: Arc::new(BudgetTracker::new(bus.clone())),
                bus,
                scrubber,
                validator,
                searcher,
                id_gen,
                clock,
                timeouts: Mutex::new(HashMap::new()),
                active_count: AtomicUsize::new(0),
                shutdown: AtomicBool::new(false),
                runtime: tokio::runtime::Handle::current(),
            }
        })
    }

    /// React to a lifecycle event. Runs on the emitter's thread, post-lock;
    /// must never block. Force-returns are dispatched onto their own task
    /// so delivery always returns immediately.
    fn handle_event(self: &Arc<Self>, event: BranchEvent) {
        match event {
            BranchEvent::BudgetExhausted { branch_id, .. } => {
                let manager = self.clone();
                self.runtime.spawn(async move {
                    if let Err(err) = manager.force_return(&branch_id, "budget exhausted").await {
                        tracing::warn!(branch_id = %branch_id, error = %err, "force-return on budget exhaustion failed");
                    }
                });
            }
            BranchEvent::BudgetWarning {
                branch_id,
                used,
                total,
                percentage,
            } => {
                tracing::warn!(branch_id = %branch_id, used, total, percentage, "branch budget warning");
            }
            BranchEvent::Timeout { branch_id, .. } => {
                let manager = self.clone();
                self.runtime.spawn(async move {
                    if let Err(err) = manager.force_return(&branch_id, "timeout exceeded").await {
                        tracing::warn!(branch_id = %branch_id, error = %err, "force-return on timeout failed");
                    }
                });
            }
            BranchEvent::Completed { .. } => {}
        }
    }

    /// Reserve an instance-wide active slot if under cap. Returns whether
    /// the reservation succeeded; on success the caller owns one increment
    /// that it must release via `release_instance_slot` on any later
    /// failure.
    fn try_reserve_instance_slot(&self) -> bool {
        let max = self.config.max_concurrent_per_instance;
        let mut current = self.active_count.load(Ordering::SeqCst);
        loop {
            if current >= max {
                return false;
            }
            match self.active_count.compare_exchange_weak(
                current,
                current + 1,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return true,
                Err(observed) => current = observed,
            }
        }
    }

    fn release_instance_slot(&self) {
        self.active_count.fetch_sub(1, Ordering::SeqCst);
    }

    fn validate_create_inputs(&self, request: &CreateRequest) -> BranchResult<()> {
        if request.session_id.as_str().is_empty() {
            return Err(BranchError::EmptySessionId);
        }
        if request.description.is_empty() {
            return Err(BranchError::EmptyDescription);
        }
        if request.description.len() > self.config.max_description_len {
            return Err(BranchError::DescriptionTooLong {
                max: self.config.max_description_len,
            });
        }
        if request.prompt.is_empty() {
            return Err(BranchError::EmptyPrompt);
        }
        if request.prompt.len() > self.config.max_prompt_len {
            return Err(BranchError::PromptTooLong {
                max: self.config.max_prompt_len,
            });
        }
        Ok(())
    }

    async fn authorize(&self, session_id: &str, caller_id: &str) -> BranchResult<()> {
        self.validator
            .validate_session(session_id, caller_id)
            .await
            .map_err(|_| BranchError::SessionUnauthorized {
                session: session_id.to_string(),
                caller: caller_id.to_string(),
            })
    }

    /// Spawn an isolated sub-context. See module docs for the full
    /// algorithm; failures never leave a persisted branch without a
    /// matching budget allocation.
    pub async fn create(&self, request: CreateRequest) -> BranchResult<CreateResponse> {
        if self.shutdown.load(Ordering::SeqCst) {
            return Err(BranchError::ShuttingDown);
        }

        self.validate_create_inputs(&request)?;
        self.authorize(request.session_id.as_str(), request.caller_id.as_str()).await?;

        if !self.try_reserve_instance_slot() {
            return Err(BranchError::MaxConcurrentBranches);
        }

        let active_in_session = self.store.count_active_by_session(&request.session_id).await;
        if active_in_session >= self.config.max_concurrent_per_session {
            self.release_instance_slot();
            return Err(BranchError::RateLimitExceeded(request.session_id.to_string()));
        }

        let parent = self.store.get_active_by_session(&request.session_id).await;
        let (depth, parent_id) = match &parent {
            Some(parent) => (parent.depth + 1, Some(parent.id.clone())),
            None => (0, None),
        };

        if depth >= self.config.max_depth {
            self.release_instance_slot();
            return Err(BranchError::MaxDepthExceeded {
                depth,
                max: self.config.max_depth,
            });
        }

        let budget = self.config.clamp_budget(request.budget);
        let timeout_seconds = self.config.clamp_timeout(request.timeout_seconds);
        let branch_id = BranchId::new(self.id_gen.next());

        if self.budget.allocate(&branch_id, budget).is_err() {
            self.release_instance_slot();
            return Err(BranchError::InvalidBudget(format!("could not allocate {budget} tokens")));
        }

        let branch = Branch {
            id: branch_id.clone(),
            session_id: request.session_id.clone(),
            project_id: request.project_id,
            caller_id: request.caller_id,
            parent_id,
            depth,
            description: request.description.clone(),
            prompt: request.prompt,
            total_budget: budget,
            used_budget: 0,
            timeout_seconds,
            status: BranchStatus::Active,
            result: None,
            error: None,
            injected_memories: Vec::new(),
            created_at_ms: self.clock.now_ms(),
            completed_at_ms: None,
        };

        if self.store.create(branch.clone()).await.is_err() {
            self.budget.deallocate(&branch_id);
            self.release_instance_slot();
            return Err(BranchError::BranchAlreadyExists(branch_id.to_string()));
        }

        let handle = timeout::spawn(branch_id.clone(), timeout_seconds, self.bus.clone());
        self.timeouts.lock().insert(branch_id.clone(), handle);

        let injected = if request.inject_memories {
            self.inject_memories(&branch_id, &request.description, budget).await
        } else {
            Vec::new()
        };
        if !injected.is_empty() {
            let mut updated = branch;
            updated.used_budget = self.budget.used(&branch_id).unwrap_or(0);
            updated.injected_memories = injected.clone();
            if let Err(err) = self.store.update(updated).await {
                tracing::warn!(branch_id = %branch_id, error = %err, "failed to persist injected memories");
            }
        }

        tracing::info!(branch_id = %branch_id, depth, budget, timeout_seconds, "branch created");

        Ok(CreateResponse {
            branch_id,
            depth,
            budget_allocated: budget,
            injected_memories: injected,
        })
    }

    async fn inject_memories(&self, branch_id: &BranchId, query: &str, total_budget: u64) -> Vec<InjectedMemory> {
        let mut injected = Vec::new();
        let Some(searcher) = &self.searcher else {
            return injected;
        };

        let items = match searcher
            .search(query, self.config.memory_max_items, self.config.memory_min_confidence)
            .await
        {
            Ok(items) => items,
            Err(err) => {
                tracing::warn!(branch_id = %branch_id, error = %err, "memory search failed; continuing without injection");
                return injected;
            }
        };

        let injection_cap = (total_budget as f64 * self.config.injection_budget_ratio) as u64;
        let mut consumed = 0u64;

        for item in items {
            if consumed.saturating_add(item.tokens) > injection_cap {
                break;
            }
            if self.budget.consume(branch_id, item.tokens as i64).is_err() {
                // Exhaustion here is handled by the normal event path: the
                // budget tracker already emitted `budget_exhausted` and the
                // manager will force-return the branch asynchronously.
                break;
            }
            consumed += item.tokens;
            injected.push(InjectedMemory {
                id: item.id,
                tokens: item.tokens,
            });
        }

        injected
    }

    /// Cancel and forget the timeout watcher for `branch_id`, if any.
    fn cancel_timeout(&self, branch_id: &BranchId) {
        if let Some(handle) = self.timeouts.lock().remove(branch_id) {
            handle.cancel();
        }
    }

    /// Normal branch completion: scrub the message, cascade-return active
    /// children, and transition to `completed`.
    pub async fn return_branch(&self, branch_id: &BranchId, caller_id: &str, message: &str) -> BranchResult<ReturnResponse> {
        if branch_id.as_str().is_empty() {
            return Err(BranchError::EmptyBranchId);
        }
        if message.len() > self.config.max_message_len {
            return Err(BranchError::MessageTooLong {
                max: self.config.max_message_len,
            });
        }

        let branch = self
            .store
            .get(branch_id)
            .await
            .map_err(|_| BranchError::BranchNotFound(branch_id.to_string()))?;

        self.authorize(branch.session_id.as_str(), caller_id).await?;

        if branch.status != BranchStatus::Active {
            return Err(BranchError::BranchNotActive(branch_id.to_string()));
        }

        for child in self.store.list_by_parent(branch_id).await {
            if child.status == BranchStatus::Active {
                if let Err(err) = self.force_return(&child.id, "parent returning").await {
                    tracing::warn!(branch_id = %child.id, error = %err, "child force-return failed during parent return");
                }
            }
        }

        let scrubbed = self
            .scrubber
            .scrub(message)
            .await
            .map_err(|err| BranchError::ScrubbingFailed(err.to_string()))?;

        self.cancel_timeout(branch_id);

        let used = self.budget.used(branch_id).unwrap_or(branch.used_budget);
        let now = self.clock.now_ms();

        // Single critical section in the store both checks and flips the
        // status, so a concurrent force-return racing this call can win the
        // transition at most once -- only the winner deallocates the budget,
        // releases the instance slot, and emits `Completed`.
        let won = self
            .store
            .complete_if_active(branch_id, scrubbed.clone(), used, now)
            .await
            .map_err(|_| BranchError::BranchNotFound(branch_id.to_string()))?;

        let Some(_) = won else {
            return Err(BranchError::BranchNotActive(branch_id.to_string()));
        };

        self.budget.deallocate(branch_id);
        self.release_instance_slot();

        self.bus.emit(BranchEvent::Completed {
            branch_id: branch_id.clone(),
            tokens_used: used,
            success: true,
        });

        tracing::info!(branch_id = %branch_id, tokens_used = used, "branch returned");

        Ok(ReturnResponse {
            success: true,
            scrubbed_message: scrubbed,
            tokens_used: used,
        })
    }

    /// Non-cooperative transition to a terminal state. Idempotent: a
    /// missing or already-terminal branch is a no-op success, and the
    /// active -> terminal transition itself is claimed atomically in the
    /// store so two concurrent force-returns of the same branch (e.g. its
    /// timeout watcher firing at the same instant its parent's `Return`
    /// cascades onto it) cannot both win -- only the winner cancels the
    /// timeout, deallocates the budget, releases the instance slot, and
    /// emits `Completed`. Not subject to session authorization -- callers
    /// are the event handlers above and `cleanup_session`, never an
    /// external caller action directly.
    ///
    /// Boxed because the cascade recurses over descendants: an `async fn`
    /// calling itself has no finite stack-frame size.
    pub fn force_return<'a>(
        &'a self,
        branch_id: &'a BranchId,
        reason: &'a str,
    ) -> Pin<Box<dyn Future<Output = BranchResult<()>> + Send + 'a>> {
        Box::pin(async move {
            let Ok(branch) = self.store.get(branch_id).await else {
                return Ok(());
            };

            if branch.is_terminal() {
                return Ok(());
            }

            for child in self.store.list_by_parent(branch_id).await {
                if child.status == BranchStatus::Active {
                    if let Err(err) = self.force_return(&child.id, "parent force-returned").await {
                        tracing::warn!(branch_id = %child.id, error = %err, "cascading force-return failed");
                    }
                }
            }

            let status = if reason == "timeout exceeded" {
                BranchStatus::Timeout
            } else {
                BranchStatus::Failed
            };

            let used = self.budget.used(branch_id).unwrap_or(branch.used_budget);
            let now = self.clock.now_ms();

            let won = self
                .store
                .force_terminal_if_active(branch_id, status, reason.to_string(), used, now)
                .await
                .unwrap_or(None);

            let Some(_) = won else {
                // Lost the race to another force-return (or the branch was
                // already completed/force-returned): that caller already
                // cancelled the timeout and released the shared state.
                return Ok(());
            };

            self.cancel_timeout(branch_id);
            self.budget.deallocate(branch_id);
            self.release_instance_slot();

            self.bus.emit(BranchEvent::Completed {
                branch_id: branch_id.clone(),
                tokens_used: used,
                success: false,
            });

            tracing::info!(branch_id = %branch_id, reason, "branch force-returned");

            Ok(())
        })
    }

    /// Force-return every active branch in `session_id`, deepest first, so
    /// children reach terminal before their parents.
    pub async fn cleanup_session(&self, session_id: &SessionId) {
        let mut branches = self.store.list_by_session(session_id).await;
        branches.sort_by(|a, b| b.depth.cmp(&a.depth));

        for branch in branches {
            if branch.status == BranchStatus::Active {
                if let Err(err) = self.force_return(&branch.id, "session ended").await {
                    tracing::warn!(branch_id = %branch.id, error = %err, "force-return during session cleanup failed");
                }
            }
        }
    }

    /// Thin delegation to the budget tracker. A synchronous
    /// `BudgetExhausted` here is independent of the asynchronous
    /// force-return the exhaustion event will have already queued: the
    /// force-return is spawned on the `Handle` captured at construction, so
    /// this stays callable off the Tokio runtime without panicking.
    pub fn consume_tokens(&self, branch_id: &BranchId, n: i64) -> BranchResult<()> {
        self.budget.consume(branch_id, n).map_err(|err| match err {
            branchfold_budget::BudgetError::NotFound(id) => BranchError::BudgetNotFound(id.to_string()),
            branchfold_budget::BudgetError::Invalid(msg) => BranchError::InvalidBudget(msg),
            branchfold_budget::BudgetError::Exhausted(id) => BranchError::BudgetExhausted(id.to_string()),
        })
    }

    /// Stop accepting new branches and cancel every live timeout watcher.
    /// Active branches are left untouched so a concurrent `Return` cannot
    /// lose a race against shutdown.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        let handles: Vec<TimeoutHandle> = self.timeouts.lock().drain().map(|(_, handle)| handle).collect();
        for handle in handles {
            handle.cancel();
        }
    }

    pub fn health(&self) -> HealthSnapshot {
        let is_shutdown = self.shutdown.load(Ordering::SeqCst);
        HealthSnapshot {
            healthy: !is_shutdown,
            active_count: self.active_count.load(Ordering::SeqCst),
            is_shutdown,
        }
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
