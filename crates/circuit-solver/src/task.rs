//! Node evaluation tasks.
//!
//! Every evaluated node runs on its own thread. A gate starts one worker per
//! argument, all reporting into the gate's inbox, and folds the reports with
//! its [`Policy`] until it can decide. The decision goes to the parent's
//! inbox tagged with the node's argument index.
//!
//! A task is split in two halves:
//!
//! - [`Task`] is the shared half: cancellation state, the registry of
//!   argument tasks and the sending end of the inbox. Parents and the solver
//!   keep it to cancel the subtree.
//! - [`Worker`] is moved onto the thread: the receiving end of the inbox and
//!   the [`Reporter`] for the single result.
//!
//! The inbox exists before the thread starts, so an interrupt sent between
//! creation and start is still seen by the worker.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;

use circuit_core::{Node, NodeType};
use parking_lot::Mutex;
use tracing::{trace, warn};

use crate::cancel::CancellationToken;
use crate::config::SolverConfig;
use crate::error::EvalFault;
use crate::outcome::{IndexedOutcome, Outcome};
use crate::policy::Policy;

/// Message delivered to a task's inbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Signal {
    /// An argument finished.
    Report(IndexedOutcome),
    /// The task was cancelled; stop waiting.
    Interrupt,
}

impl Signal {
    /// Outcome carried by the message; an interrupt reads as broken.
    pub(crate) fn outcome(self) -> Outcome {
        match self {
            Signal::Report(report) => report.outcome,
            Signal::Interrupt => Outcome::Broken,
        }
    }
}

/// State shared by every worker of one solver.
#[derive(Debug, Clone)]
pub(crate) struct Context {
    pub(crate) token: CancellationToken,
    pub(crate) config: SolverConfig,
}

impl Context {
    fn check(&self) -> Result<(), EvalFault> {
        if self.token.is_cancelled() {
            Err(EvalFault::Interrupted)
        } else {
            Ok(())
        }
    }
}

/// Sends a task's single report to its parent.
///
/// A reporter dropped without sending reports BROKEN, so a parent hears
/// from every argument even if its worker never started or panicked.
struct Reporter {
    index: usize,
    out: Option<Sender<Signal>>,
}

impl Reporter {
    fn send(mut self, outcome: Outcome) {
        self.deliver(outcome);
    }

    fn deliver(&mut self, outcome: Outcome) {
        if let Some(out) = self.out.take() {
            // The parent drops its inbox once it has decided.
            let _ = out.send(Signal::Report(IndexedOutcome::new(self.index, outcome)));
        }
    }
}

impl Drop for Reporter {
    fn drop(&mut self) {
        self.deliver(Outcome::Broken);
    }
}

/// Cancellation handle for the evaluation of one node.
#[derive(Debug)]
pub(crate) struct Task {
    node: Arc<Node>,
    index: usize,
    depth: usize,
    cancelled: AtomicBool,
    finished: AtomicBool,
    children: Mutex<Vec<Arc<Task>>>,
    inbox: Sender<Signal>,
}

/// Thread-side half of a task.
pub(crate) struct Worker {
    task: Arc<Task>,
    messages: Receiver<Signal>,
    reporter: Reporter,
    ctx: Context,
}

impl Task {
    /// Create a task that will report to `out` as argument `index`.
    ///
    /// Nothing runs until [`Worker::start`].
    pub(crate) fn new(
        node: Arc<Node>,
        index: usize,
        depth: usize,
        out: Sender<Signal>,
        ctx: Context,
    ) -> (Arc<Task>, Worker) {
        let (inbox, messages) = mpsc::channel();
        let task = Arc::new(Task {
            node,
            index,
            depth,
            cancelled: AtomicBool::new(false),
            finished: AtomicBool::new(false),
            children: Mutex::new(Vec::new()),
            inbox,
        });
        let worker = Worker {
            task: Arc::clone(&task),
            messages,
            reporter: Reporter {
                index,
                out: Some(out),
            },
            ctx,
        };
        (task, worker)
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Whether the worker has reported.
    pub(crate) fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    /// Cancel this task and every argument task started so far.
    ///
    /// Idempotent; cancelling a finished task has no effect on its report.
    pub(crate) fn cancel(&self) {
        let mut pending = self.interrupt();
        while let Some(task) = pending.pop() {
            pending.extend(task.interrupt());
        }
    }

    /// Mark cancelled, wake the worker and hand back the children to
    /// cancel. Returns nothing if the task was already cancelled.
    fn interrupt(&self) -> Vec<Arc<Task>> {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return Vec::new();
        }
        trace!(depth = self.depth, index = self.index, "cancelling");
        // Fails only when the worker has already exited.
        let _ = self.inbox.send(Signal::Interrupt);
        std::mem::take(&mut *self.children.lock())
    }

    fn evaluate(&self, messages: &Receiver<Signal>, ctx: &Context) -> Result<Outcome, EvalFault> {
        ctx.check()?;
        if self.is_cancelled() {
            return Err(EvalFault::Interrupted);
        }
        match self.node.node_type() {
            NodeType::Leaf => self.evaluate_leaf(messages),
            _ => self.aggregate(Policy::for_node(&self.node)?, messages, ctx),
        }
    }

    fn evaluate_leaf(&self, messages: &Receiver<Signal>) -> Result<Outcome, EvalFault> {
        let value = self.node.value().ok_or(EvalFault::Malformed {
            node_type: NodeType::Leaf,
            arity: self.node.args().len(),
        })?;
        let delay = self.node.delay();
        if delay.is_zero() {
            return Ok(value.into());
        }

        // Nothing but an interrupt arrives here, so the wait is the delay.
        // The task holds a sender to its own inbox, so it never disconnects.
        match messages.recv_timeout(delay) {
            Err(RecvTimeoutError::Timeout) => Ok(value.into()),
            Ok(Signal::Interrupt) | Err(RecvTimeoutError::Disconnected) => {
                Err(EvalFault::Interrupted)
            }
            Ok(Signal::Report(report)) => Err(EvalFault::UnexpectedIndex(report.index)),
        }
    }

    fn aggregate(
        &self,
        mut policy: Policy,
        messages: &Receiver<Signal>,
        ctx: &Context,
    ) -> Result<Outcome, EvalFault> {
        if let Some(decided) = policy.decision() {
            return Ok(decided);
        }

        let args = self.node.args();
        for (index, arg) in args.iter().enumerate() {
            self.spawn_child(Arc::clone(arg), index, ctx)?;
        }

        // The task holds a sender to its own inbox, so `recv` only fails
        // after the task itself is gone.
        let mut pending = args.len();
        while pending > 0 {
            ctx.check()?;
            match messages.recv() {
                Ok(Signal::Report(report)) => {
                    pending -= 1;
                    if let Some(decided) = policy.observe(report)? {
                        if pending > 0 {
                            self.short_circuit(decided, pending, ctx);
                        }
                        return Ok(decided);
                    }
                }
                Ok(Signal::Interrupt) | Err(_) => return Err(EvalFault::Interrupted),
            }
        }
        Ok(policy.exhausted())
    }

    /// Register and start the worker for argument `index`.
    ///
    /// Registration and the cancelled check share the registry lock, so a
    /// concurrent [`Task::cancel`] either sees the new child or stops it
    /// from being started.
    fn spawn_child(&self, node: Arc<Node>, index: usize, ctx: &Context) -> Result<(), EvalFault> {
        let (task, worker) = Task::new(node, index, self.depth + 1, self.inbox.clone(), ctx.clone());
        {
            let mut children = self.children.lock();
            if self.is_cancelled() {
                return Err(EvalFault::Interrupted);
            }
            children.push(task);
        }

        // A worker that fails to start reports BROKEN when dropped.
        if let Err(fault) = worker.start() {
            warn!(depth = self.depth + 1, index, %fault, "argument worker not started");
        }
        Ok(())
    }

    fn short_circuit(&self, decided: Outcome, pending: usize, ctx: &Context) {
        trace!(
            depth = self.depth,
            index = self.index,
            ?decided,
            pending,
            "short-circuit"
        );
        if ctx.config.cancel_on_short_circuit {
            let children = std::mem::take(&mut *self.children.lock());
            for child in children {
                child.cancel();
            }
        }
    }
}

impl Worker {
    /// Start the worker thread.
    ///
    /// On failure the worker is dropped and its parent receives BROKEN.
    pub(crate) fn start(self) -> Result<(), EvalFault> {
        let task = Arc::clone(&self.task);
        trace!(
            depth = task.depth,
            index = task.index,
            node_type = ?task.node.node_type(),
            "starting worker"
        );
        let spawned = thread::Builder::new()
            .name(format!("circuit-{}-{}", task.depth, task.index))
            .stack_size(self.ctx.config.stack_size)
            .spawn(move || self.run());
        if let Err(err) = spawned {
            task.finished.store(true, Ordering::SeqCst);
            return Err(err.into());
        }
        Ok(())
    }

    fn run(self) {
        let Worker {
            task,
            messages,
            reporter,
            ctx,
        } = self;

        let outcome = match task.evaluate(&messages, &ctx) {
            Ok(outcome) => outcome,
            Err(EvalFault::Interrupted) => Outcome::Broken,
            Err(fault) => {
                warn!(depth = task.depth, index = task.index, %fault, "node reported broken");
                Outcome::Broken
            }
        };
        let outcome = if ctx.token.is_cancelled() {
            Outcome::Broken
        } else {
            outcome
        };

        trace!(depth = task.depth, index = task.index, ?outcome, "reporting");
        task.finished.store(true, Ordering::SeqCst);
        reporter.send(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(10);

    fn context(config: SolverConfig) -> Context {
        Context {
            token: CancellationToken::new(),
            config,
        }
    }

    /// Start `node` as argument `index` and return its task and the channel
    /// it reports to.
    fn start(node: Node, index: usize, ctx: Context) -> (Arc<Task>, Receiver<Signal>) {
        let (out, results) = mpsc::channel();
        let (task, worker) = Task::new(Arc::new(node), index, 0, out, ctx);
        worker.start().unwrap();
        (task, results)
    }

    fn report(results: &Receiver<Signal>) -> Signal {
        results.recv_timeout(WAIT).expect("task should report")
    }

    #[test]
    fn test_dropped_reporter_reports_broken() {
        let (out, results) = mpsc::channel();
        drop(Reporter {
            index: 3,
            out: Some(out),
        });
        assert_eq!(
            results.recv().unwrap(),
            Signal::Report(IndexedOutcome::new(3, Outcome::Broken))
        );
        assert!(results.recv().is_err());
    }

    #[test]
    fn test_reporter_sends_once() {
        let (out, results) = mpsc::channel();
        Reporter {
            index: 1,
            out: Some(out),
        }
        .send(Outcome::True);
        assert_eq!(
            results.recv().unwrap(),
            Signal::Report(IndexedOutcome::new(1, Outcome::True))
        );
        assert!(results.recv().is_err());
    }

    #[test]
    fn test_leaf_reports_with_index() {
        let (task, results) = start(Node::leaf(false), 4, context(SolverConfig::default()));
        assert_eq!(
            report(&results),
            Signal::Report(IndexedOutcome::new(4, Outcome::False))
        );
        assert!(task.is_finished());
    }

    #[test]
    fn test_nested_gates() {
        let node = Node::and([
            Node::or([Node::leaf(false), Node::leaf(true)]),
            Node::not(Node::leaf(false)),
        ]);
        let (_task, results) = start(node, 0, context(SolverConfig::default()));
        assert_eq!(report(&results).outcome(), Outcome::True);
    }

    #[test]
    fn test_cancel_before_start() {
        let (out, results) = mpsc::channel();
        let (task, worker) = Task::new(
            Arc::new(Node::leaf(true)),
            0,
            0,
            out,
            context(SolverConfig::default()),
        );
        task.cancel();
        worker.start().unwrap();
        assert_eq!(report(&results).outcome(), Outcome::Broken);
    }

    #[test]
    fn test_cancel_interrupts_delayed_leaf() {
        let node = Node::delayed_leaf(true, Duration::from_secs(60));
        let (task, results) = start(node, 0, context(SolverConfig::default()));
        task.cancel();
        task.cancel();
        assert_eq!(report(&results).outcome(), Outcome::Broken);
        assert!(task.is_cancelled());
    }

    #[test]
    fn test_cancel_reaches_blocked_gate() {
        let node = Node::and([
            Node::delayed_leaf(true, Duration::from_secs(60)),
            Node::delayed_leaf(true, Duration::from_secs(60)),
        ]);
        let (task, results) = start(node, 0, context(SolverConfig::default()));
        task.cancel();
        assert_eq!(report(&results).outcome(), Outcome::Broken);
    }

    #[test]
    fn test_interrupted_wait_is_not_a_fault() {
        let ctx = context(SolverConfig::default());
        let slow = || Node::delayed_leaf(true, Duration::from_secs(60));
        for node in [slow(), Node::and([slow(), slow()])] {
            let (out, _results) = mpsc::channel();
            let (task, worker) = Task::new(Arc::new(node), 0, 0, out, ctx.clone());
            task.inbox.send(Signal::Interrupt).unwrap();
            let evaluated = task.evaluate(&worker.messages, &worker.ctx);
            assert!(matches!(evaluated, Err(EvalFault::Interrupted)), "{evaluated:?}");
            task.cancel();
        }
    }

    #[test]
    fn test_cancelled_parent_refuses_children() {
        let (out, _results) = mpsc::channel();
        let ctx = context(SolverConfig::default());
        let (task, _worker) = Task::new(Arc::new(Node::leaf(true)), 0, 0, out, ctx.clone());
        task.cancel();
        let spawned = task.spawn_child(Arc::new(Node::leaf(true)), 0, &ctx);
        assert!(matches!(spawned, Err(EvalFault::Interrupted)));
        assert!(task.children.lock().is_empty());
    }

    #[test]
    fn test_token_breaks_result() {
        let ctx = context(SolverConfig::default());
        ctx.token.cancel();
        let (_task, results) = start(Node::leaf(true), 0, ctx);
        assert_eq!(report(&results).outcome(), Outcome::Broken);
    }

    #[test]
    fn test_malformed_node_reports_broken() {
        let node = Node::or([Node::leaf(true), Node::gate(NodeType::Not, [])]);
        let (_task, results) = start(node.clone(), 0, context(SolverConfig::default()));
        // TRUE may arrive before the broken NOT.
        let outcome = report(&results).outcome();
        assert!(outcome == Outcome::True || outcome == Outcome::Broken);

        let node = Node::and([Node::leaf(true), Node::gate(NodeType::Not, [])]);
        let (_task, results) = start(node, 0, context(SolverConfig::default()));
        assert_eq!(report(&results).outcome(), Outcome::Broken);
    }

    #[test]
    fn test_short_circuit_releases_children() {
        let node = Node::or([
            Node::leaf(true),
            Node::delayed_leaf(false, Duration::from_secs(60)),
        ]);
        let (task, results) = start(node, 0, context(SolverConfig::default()));
        assert_eq!(report(&results).outcome(), Outcome::True);
        assert!(task.children.lock().is_empty());
    }

    #[test]
    fn test_exhaustive_keeps_children_until_cancelled() {
        let node = Node::or([
            Node::leaf(true),
            Node::delayed_leaf(false, Duration::from_secs(60)),
        ]);
        let (task, results) = start(node, 0, context(SolverConfig::exhaustive()));
        assert_eq!(report(&results).outcome(), Outcome::True);

        let children: Vec<_> = task.children.lock().clone();
        assert_eq!(children.len(), 2);
        assert!(!children[1].is_finished());
        assert!(!children[1].is_cancelled());

        task.cancel();
        assert!(children.iter().all(|child| child.is_cancelled()));
    }
}
