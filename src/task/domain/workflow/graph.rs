//! Arena of tasks keyed by identifier, with derived reverse indexes.

use crate::task::domain::{
    HasDependencies, NotFoundError, ResourceId, Review, ReviewId, Task, TaskDependency, TaskId,
};
use std::collections::{HashMap, HashSet, VecDeque};

/// Task arena with parent/child and prerequisite/dependent navigation.
///
/// Tasks hold only forward references (parent, prerequisites); children and
/// dependents are indexed here.
#[derive(Debug, Clone, Default)]
pub struct WorkflowGraph {
    tasks: HashMap<TaskId, Task>,
    order: Vec<TaskId>,
    children: HashMap<TaskId, Vec<TaskId>>,
    dependents: HashMap<TaskId, Vec<TaskId>>,
}

impl WorkflowGraph {
    /// Builds a graph from loaded tasks.
    #[must_use]
    pub fn new(tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut graph = Self::default();
        for task in tasks {
            graph.insert(task);
        }
        graph
    }

    /// Returns `true` when the graph holds no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Returns the task, if present.
    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    /// Returns the task.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError::Task`] when the task does not exist.
    pub fn task(&self, id: TaskId) -> Result<&Task, NotFoundError> {
        self.tasks.get(&id).ok_or(NotFoundError::Task(id))
    }

    pub(crate) fn task_mut(&mut self, id: TaskId) -> Result<&mut Task, NotFoundError> {
        self.tasks.get_mut(&id).ok_or(NotFoundError::Task(id))
    }

    /// Iterates tasks in load order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.order.iter().filter_map(|id| self.tasks.get(id))
    }

    /// Returns the direct children of a task.
    #[must_use]
    pub fn children(&self, id: TaskId) -> &[TaskId] {
        self.children.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Returns `true` when the task has children.
    #[must_use]
    pub fn is_container(&self, id: TaskId) -> bool {
        !self.children(id).is_empty()
    }

    /// Returns the tasks that depend on `id`.
    #[must_use]
    pub fn dependents(&self, id: TaskId) -> &[TaskId] {
        self.dependents.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Returns the parent container of a task.
    #[must_use]
    pub fn parent(&self, id: TaskId) -> Option<TaskId> {
        self.tasks.get(&id).and_then(Task::parent)
    }

    /// Returns the ancestors of a task, nearest first.
    #[must_use]
    pub fn ancestors(&self, id: TaskId) -> Vec<TaskId> {
        let mut ancestors = Vec::new();
        let mut current = self.parent(id);
        while let Some(ancestor) = current {
            if ancestors.contains(&ancestor) {
                break;
            }
            ancestors.push(ancestor);
            current = self.parent(ancestor);
        }
        ancestors
    }

    /// Returns `true` when `ancestor` contains `id` at any depth.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: TaskId, id: TaskId) -> bool {
        self.ancestors(id).contains(&ancestor)
    }

    /// Returns the responsible list of the task or its nearest ancestor that
    /// has one.
    #[must_use]
    pub fn effective_responsible(&self, id: TaskId) -> Vec<ResourceId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .filter_map(|candidate| self.tasks.get(&candidate))
            .map(Task::responsible)
            .find(|responsible| !responsible.is_empty())
            .map(<[ResourceId]>::to_vec)
            .unwrap_or_default()
    }

    /// Returns the edge from `task_id` to `depends_on`.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] when either task or the edge is missing.
    pub fn dependency(
        &self,
        task_id: TaskId,
        depends_on: TaskId,
    ) -> Result<&TaskDependency, NotFoundError> {
        self.task(depends_on)?;
        self.task(task_id)?
            .dependency_on(depends_on)
            .ok_or(NotFoundError::Dependency {
                task_id,
                depends_on,
            })
    }

    /// Returns the task that owns the review and the review itself.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError::Review`] when no task owns the review.
    pub fn review(&self, review_id: ReviewId) -> Result<(&Task, &Review), NotFoundError> {
        self.tasks()
            .find_map(|task| task.review(review_id).map(|review| (task, review)))
            .ok_or(NotFoundError::Review(review_id))
    }

    /// Breadth-first walk over the containment hierarchy, root first.
    ///
    /// Each task has one parent, so every task below the root is yielded
    /// exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError::Task`] when the root does not exist.
    pub fn walk_hierarchy(&self, root: TaskId) -> Result<Vec<TaskId>, NotFoundError> {
        self.task(root)?;
        let mut seen = HashSet::from([root]);
        let mut visited = Vec::new();
        let mut queue = VecDeque::from([root]);
        while let Some(id) = queue.pop_front() {
            visited.push(id);
            for child in self.children(id) {
                if seen.insert(*child) {
                    queue.push_back(*child);
                }
            }
        }
        Ok(visited)
    }

    /// Breadth-first walk over prerequisites, root first.
    ///
    /// Shared prerequisites are yielded every time they are reached, once per
    /// path from the root. The walk relies on the dependency graph being
    /// acyclic, which `add_dependency` and `create_task` enforce.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError::Task`] when the root does not exist.
    pub fn walk_dependencies(&self, root: TaskId) -> Result<Vec<TaskId>, NotFoundError> {
        self.task(root)?;
        let mut visited = Vec::new();
        let mut queue = VecDeque::from([root]);
        while let Some(id) = queue.pop_front() {
            visited.push(id);
            if let Some(task) = self.tasks.get(&id) {
                queue.extend(task.depends().iter().map(TaskDependency::depends_on));
            }
        }
        Ok(visited)
    }

    /// Worklist steps a settling cascade may take: every task can be
    /// requeued once per edge of the graph, plus once as the origin.
    #[must_use]
    pub fn propagation_bound(&self) -> usize {
        let edges = self
            .dependents
            .values()
            .chain(self.children.values())
            .map(Vec::len)
            .fold(0_usize, usize::saturating_add);
        self.tasks.len().saturating_mul(edges.saturating_add(1))
    }

    /// Returns `true` when a status change of `from` can reach `to` through
    /// dependent edges and parent aggregation.
    #[must_use]
    pub fn influences(&self, from: TaskId, to: TaskId) -> bool {
        let mut seen = HashSet::from([from]);
        let mut queue = VecDeque::from([from]);
        while let Some(current) = queue.pop_front() {
            if current == to {
                return true;
            }
            let next = self
                .dependents(current)
                .iter()
                .copied()
                .chain(self.parent(current));
            for id in next {
                if seen.insert(id) {
                    queue.push_back(id);
                }
            }
        }
        false
    }

    pub(crate) fn insert(&mut self, task: Task) {
        let id = task.id();
        if let Some(parent) = task.parent() {
            push_unique(self.children.entry(parent).or_default(), id);
        }
        for edge in task.depends() {
            push_unique(self.dependents.entry(edge.depends_on()).or_default(), id);
        }
        if self.tasks.insert(id, task).is_none() {
            self.order.push(id);
        }
    }

    pub(crate) fn link_dependent(&mut self, depends_on: TaskId, dependent: TaskId) {
        push_unique(self.dependents.entry(depends_on).or_default(), dependent);
    }

    pub(crate) fn unlink_dependent(&mut self, depends_on: TaskId, dependent: TaskId) {
        if let Some(dependents) = self.dependents.get_mut(&depends_on) {
            dependents.retain(|id| *id != dependent);
            if dependents.is_empty() {
                self.dependents.remove(&depends_on);
            }
        }
    }
}

fn push_unique(ids: &mut Vec<TaskId>, id: TaskId) {
    if !ids.contains(&id) {
        ids.push(id);
    }
}
