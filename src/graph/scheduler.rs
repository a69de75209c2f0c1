use std::{
    collections::{BTreeSet, HashMap},
    time::{Duration, Instant},
};

use crate::{
    foundation::{
        core::FrameIndex,
        error::{EdlError, EdlResult},
    },
    graph::{
        node::{DEFAULT_IO_NAME, Dependency, EvalPolicy, Node, NodeArgs, NodeId, NodeOutputs},
        value::{BuiltinType, Value},
    },
};

/// Per-node evaluation counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NodeStats {
    /// Times [`Node::evaluate`] ran.
    pub evaluations: u64,
    /// Lazy-static resolutions answered from the cached outputs.
    pub cache_hits: u64,
    /// Frame of the last evaluation.
    pub last_frame: Option<FrameIndex>,
    /// Wall time of the last evaluation.
    pub last_duration: Option<Duration>,
}

#[derive(Debug)]
struct Cache {
    /// Frame the outputs are current for; `None` once an upstream change invalidated them.
    frame: Option<FrameIndex>,
    args: NodeArgs,
    outputs: NodeOutputs,
}

#[derive(Debug)]
pub(crate) struct Entry {
    pub(crate) name: String,
    pub(crate) node: Box<dyn Node>,
    pub(crate) stats: NodeStats,
    cache: Option<Cache>,
}

/// A named set of nodes whose edges are type-checked on insertion and resolved on demand.
///
/// Requesting an output evaluates its dependency closure in topological order. Each node runs
/// at most once per frame; lazy-static nodes additionally skip evaluation while their resolved
/// arguments are unchanged.
#[derive(Debug, Default)]
pub struct Graph {
    pub(crate) entries: Vec<Entry>,
    by_name: HashMap<String, NodeId>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `node` under `name`, or replace the node already registered under it.
    ///
    /// Every input slot must reference an existing output of the slot's type. A replacement
    /// keeps its [`NodeId`], must not introduce a cycle, and must still provide every output
    /// its dependents consume.
    #[tracing::instrument(skip(self, node), fields(kind = node.kind()))]
    pub fn set(&mut self, name: &str, node: impl Node + 'static) -> EdlResult<NodeId> {
        let existing = self.by_name.get(name).copied();

        for slot in node.inputs() {
            let dep = &slot.dependency;
            let found = self.output_type(dep)?;
            if found != slot.ty {
                return Err(EdlError::GraphTypeMismatch {
                    node: name.to_string(),
                    slot: slot.name.clone(),
                    expected: slot.ty,
                    found,
                });
            }
            if let Some(input) = self.entries[dep.node.0].node.as_input() {
                node.check_argument(&slot.name, input.value())?;
            }
        }

        let Some(id) = existing else {
            let id = NodeId(self.entries.len());
            self.entries.push(Entry {
                name: name.to_string(),
                node: Box::new(node),
                stats: NodeStats::default(),
                cache: None,
            });
            self.by_name.insert(name.to_string(), id);
            tracing::debug!(%id, "node added");
            return Ok(id);
        };

        if node
            .inputs()
            .iter()
            .any(|slot| self.reaches(slot.dependency.node, id))
        {
            return Err(EdlError::graph(format!(
                "replacing `{name}` would create a cycle"
            )));
        }

        let outputs = node.outputs();
        for entry in &self.entries {
            for slot in entry.node.inputs() {
                if slot.dependency.node != id {
                    continue;
                }
                match outputs.iter().find(|(o, _)| *o == slot.dependency.output) {
                    None => {
                        return Err(EdlError::graph(format!(
                            "replacing `{name}` removes output `{}` used by `{}.{}`",
                            slot.dependency.output, entry.name, slot.name
                        )));
                    }
                    Some((_, ty)) if *ty != slot.ty => {
                        return Err(EdlError::GraphTypeMismatch {
                            node: entry.name.clone(),
                            slot: slot.name.clone(),
                            expected: slot.ty,
                            found: *ty,
                        });
                    }
                    Some(_) => {}
                }
                if let Some(input) = node.as_input() {
                    entry.node.check_argument(&slot.name, input.value())?;
                }
            }
        }

        let entry = &mut self.entries[id.0];
        entry.node = Box::new(node);
        entry.cache = None;
        self.invalidate_dependents(id);
        tracing::debug!(%id, "node replaced");
        Ok(id)
    }

    /// The node registered under `name`.
    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    /// A dependency on the default output of the node named `name`.
    pub fn dep(&self, name: &str) -> EdlResult<Dependency> {
        self.dep_output(name, DEFAULT_IO_NAME)
    }

    /// A dependency on output `output` of the node named `name`.
    pub fn dep_output(&self, name: &str, output: &str) -> EdlResult<Dependency> {
        let id = self.require(name)?;
        let dep = Dependency::named(id, output);
        self.output_type(&dep)?;
        Ok(dep)
    }

    /// Replace the value of an input node.
    ///
    /// The new value must keep the node's type and pass every consuming node's
    /// [`Node::check_argument`].
    pub fn set_input(&mut self, name: &str, value: impl Into<Value>) -> EdlResult<()> {
        let id = self.require(name)?;
        let value = value.into();
        let input = self.entries[id.0]
            .node
            .as_input()
            .ok_or_else(|| EdlError::graph(format!("`{name}` is not an input node")))?;
        if input.ty() != value.ty() {
            return Err(EdlError::GraphTypeMismatch {
                node: name.to_string(),
                slot: DEFAULT_IO_NAME.to_string(),
                expected: input.ty(),
                found: value.ty(),
            });
        }
        if *input.value() == value {
            return Ok(());
        }
        for dependent in &self.entries {
            for slot in dependent.node.inputs() {
                if slot.dependency.node == id {
                    dependent.node.check_argument(&slot.name, &value)?;
                }
            }
        }

        let entry = &mut self.entries[id.0];
        let Some(input) = entry.node.as_input_mut() else {
            return Err(EdlError::graph(format!("`{name}` is not an input node")));
        };
        input.replace(value);
        if let Some(cache) = entry.cache.as_mut() {
            cache.frame = None;
        }
        self.invalidate_dependents(id);
        Ok(())
    }

    /// The default output of `id` for `frame`.
    pub fn get_output(&mut self, frame: FrameIndex, id: NodeId) -> EdlResult<Value> {
        self.get_named_output(frame, id, DEFAULT_IO_NAME)
    }

    /// Output `output` of `id` for `frame`, evaluating what is stale upstream.
    #[tracing::instrument(skip(self, frame), fields(frame = frame.0))]
    pub fn get_named_output(
        &mut self,
        frame: FrameIndex,
        id: NodeId,
        output: &str,
    ) -> EdlResult<Value> {
        let dep = Dependency::named(id, output);
        self.output_type(&dep)?;
        for node in self.closure_order(id) {
            self.resolve(frame, node)?;
        }
        self.cached_output(&dep).cloned()
    }

    /// Counters of `id`.
    pub fn stats(&self, id: NodeId) -> Option<&NodeStats> {
        self.entries.get(id.0).map(|e| &e.stats)
    }

    /// The node behind `id`.
    pub fn node(&self, id: NodeId) -> Option<&dyn Node> {
        self.entries.get(id.0).map(|e| e.node.as_ref())
    }

    /// Registered name of `id`.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.entries.get(id.0).map(|e| e.name.as_str())
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn require(&self, name: &str) -> EdlResult<NodeId> {
        self.get(name)
            .ok_or_else(|| EdlError::graph(format!("unknown node `{name}`")))
    }

    fn output_type(&self, dep: &Dependency) -> EdlResult<BuiltinType> {
        let entry = self
            .entries
            .get(dep.node.0)
            .ok_or_else(|| EdlError::graph(format!("unknown node {}", dep.node)))?;
        entry
            .node
            .outputs()
            .into_iter()
            .find(|(name, _)| *name == dep.output)
            .map(|(_, ty)| ty)
            .ok_or_else(|| {
                EdlError::graph(format!(
                    "node `{}` has no output `{}`",
                    entry.name, dep.output
                ))
            })
    }

    /// Whether `target` is `from` or one of its transitive dependencies.
    fn reaches(&self, from: NodeId, target: NodeId) -> bool {
        let mut seen = BTreeSet::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            if id == target {
                return true;
            }
            if !seen.insert(id) {
                continue;
            }
            if let Some(entry) = self.entries.get(id.0) {
                stack.extend(entry.node.inputs().iter().map(|s| s.dependency.node));
            }
        }
        false
    }

    /// Dependencies of `root` before their dependents, `root` last.
    fn closure_order(&self, root: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut done = BTreeSet::new();
        let mut stack = vec![(root, false)];
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                order.push(id);
                continue;
            }
            if !done.insert(id) {
                continue;
            }
            stack.push((id, true));
            for slot in self.entries[id.0].node.inputs().iter().rev() {
                if !done.contains(&slot.dependency.node) {
                    stack.push((slot.dependency.node, false));
                }
            }
        }
        order
    }

    fn invalidate_dependents(&mut self, changed: NodeId) {
        let mut dirty = BTreeSet::from([changed]);
        loop {
            let before = dirty.len();
            for (idx, entry) in self.entries.iter().enumerate() {
                if entry
                    .node
                    .inputs()
                    .iter()
                    .any(|s| dirty.contains(&s.dependency.node))
                {
                    dirty.insert(NodeId(idx));
                }
            }
            if dirty.len() == before {
                break;
            }
        }
        dirty.remove(&changed);
        for id in dirty {
            if let Some(cache) = self.entries[id.0].cache.as_mut() {
                cache.frame = None;
            }
        }
    }

    fn cached_output(&self, dep: &Dependency) -> EdlResult<&Value> {
        let entry = &self.entries[dep.node.0];
        entry
            .cache
            .as_ref()
            .and_then(|c| c.outputs.get(&dep.output))
            .ok_or_else(|| {
                EdlError::evaluation(format!(
                    "node `{}` did not produce output `{}`",
                    entry.name, dep.output
                ))
            })
    }

    fn resolve(&mut self, frame: FrameIndex, id: NodeId) -> EdlResult<()> {
        let entry = &self.entries[id.0];
        if entry
            .cache
            .as_ref()
            .is_some_and(|c| c.frame == Some(frame))
        {
            return Ok(());
        }

        let mut args = NodeArgs::new();
        for slot in entry.node.inputs() {
            let value = self.cached_output(&slot.dependency)?;
            args.insert(slot.name.clone(), value.clone());
        }

        let entry = &mut self.entries[id.0];
        if entry.node.policy() == EvalPolicy::LazyStatic
            && let Some(cache) = entry.cache.as_mut()
            && cache.args == args
        {
            cache.frame = Some(frame);
            entry.stats.cache_hits += 1;
            tracing::debug!(node = %entry.name, "lazy-static cache hit");
            return Ok(());
        }

        let started = Instant::now();
        let outputs = entry.node.evaluate(frame, &args).inspect_err(|e| {
            tracing::warn!(node = %entry.name, error = %e, "node evaluation failed");
        })?;
        let elapsed = started.elapsed();

        for (name, ty) in entry.node.outputs() {
            match outputs.get(name) {
                Some(v) if v.ty() == ty => {}
                Some(v) => {
                    return Err(EdlError::evaluation(format!(
                        "node `{}` produced {} for output `{name}` declared {ty}",
                        entry.name,
                        v.ty()
                    )));
                }
                None => {
                    return Err(EdlError::evaluation(format!(
                        "node `{}` did not produce output `{name}`",
                        entry.name
                    )));
                }
            }
        }

        entry.stats.evaluations += 1;
        entry.stats.last_frame = Some(frame);
        entry.stats.last_duration = Some(elapsed);
        entry.cache = Some(Cache {
            frame: Some(frame),
            args,
            outputs,
        });
        tracing::trace!(node = %entry.name, ?elapsed, "node evaluated");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/scheduler.rs"]
mod tests;
