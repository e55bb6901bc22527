// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

/// Directed graph over component ids.
///
/// Stored as a forward adjacency list (`id -> [dependents]`): an edge `a -> b`
/// means `b` depends on `a`, so `a` must finish before `b` starts. Every node is
/// a key, including nodes without dependents.
///
/// # Examples
/// ```
/// use the_pipes::config::DependencyGraph;
///
/// let mut graph = DependencyGraph::new();
/// graph.add_dependency("core", "cli");
/// graph.add_node("docs");
///
/// assert_eq!(graph.sources(), vec!["core".to_string(), "docs".to_string()]);
///
/// graph.remove_node("core");
/// assert_eq!(graph.sources(), vec!["cli".to_string(), "docs".to_string()]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyGraph(pub HashMap<String, Vec<String>>);

#[derive(Clone, Copy, PartialEq)]
enum Visit {
    InProgress,
    Done,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Build a graph from `(id, depends_on)` pairs.
    pub fn from_dependencies<I, S, D>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, D)>,
        S: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        let mut graph = Self::new();
        for (id, dependencies) in entries {
            let id = id.into();
            graph.add_node(id.clone());
            for dependency in dependencies {
                graph.add_dependency(dependency, id.clone());
            }
        }
        graph
    }

    /// Add a node without edges. Existing nodes are left untouched.
    pub fn add_node(&mut self, id: impl Into<String>) {
        self.0.entry(id.into()).or_default();
    }

    /// Record that `dependent` depends on `dependency`.
    pub fn add_dependency(&mut self, dependency: impl Into<String>, dependent: impl Into<String>) {
        let dependent = dependent.into();
        self.add_node(dependent.clone());
        let dependents = self.0.entry(dependency.into()).or_default();
        if !dependents.contains(&dependent) {
            dependents.push(dependent);
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get all node IDs in the graph
    pub fn nodes(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Get dependents for a node
    pub fn get_dependents(&self, id: &str) -> &[String] {
        self.0.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Invert the adjacency list into `id -> [dependencies]`.
    pub fn build_reverse_dependencies(&self) -> HashMap<String, Vec<String>> {
        let mut reverse: HashMap<String, Vec<String>> =
            self.0.keys().map(|id| (id.clone(), Vec::new())).collect();
        for (dependency, dependents) in &self.0 {
            for dependent in dependents {
                if let Some(dependencies) = reverse.get_mut(dependent) {
                    dependencies.push(dependency.clone());
                }
            }
        }
        reverse
    }

    /// Nodes with no incoming edge, sorted for stable layer order.
    pub fn sources(&self) -> Vec<String> {
        let mut targeted = HashSet::new();
        for dependents in self.0.values() {
            targeted.extend(dependents.iter().map(String::as_str));
        }
        let mut sources: Vec<String> = self
            .0
            .keys()
            .filter(|id| !targeted.contains(id.as_str()))
            .cloned()
            .collect();
        sources.sort();
        sources
    }

    /// Remove a node together with every edge touching it.
    pub fn remove_node(&mut self, id: &str) -> bool {
        let removed = self.0.remove(id).is_some();
        if removed {
            for dependents in self.0.values_mut() {
                dependents.retain(|dependent| dependent != id);
            }
        }
        removed
    }

    /// Every node reachable from `id`, i.e. everything that transitively depends on it.
    pub fn descendants(&self, id: &str) -> BTreeSet<String> {
        let mut seen = BTreeSet::new();
        let mut queue: VecDeque<&str> = self.get_dependents(id).iter().map(String::as_str).collect();
        while let Some(current) = queue.pop_front() {
            if seen.insert(current.to_string()) {
                queue.extend(self.get_dependents(current).iter().map(String::as_str));
            }
        }
        seen
    }

    /// Find one cycle, returned as a closed path (`a -> b -> a`).
    ///
    /// Iterative three-colour DFS so that deep chains cannot exhaust the stack.
    /// Roots are visited in sorted order, making the reported cycle stable.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let mut state: HashMap<&str, Visit> = HashMap::new();
        let mut roots: Vec<&str> = self.0.keys().map(String::as_str).collect();
        roots.sort_unstable();

        for root in roots {
            if state.contains_key(root) {
                continue;
            }
            state.insert(root, Visit::InProgress);
            let mut stack: Vec<(&str, usize)> = vec![(root, 0)];

            while let Some(frame) = stack.last_mut() {
                let node = frame.0;
                let dependents = self.get_dependents(node);
                if frame.1 >= dependents.len() {
                    state.insert(node, Visit::Done);
                    stack.pop();
                    continue;
                }

                let child = dependents[frame.1].as_str();
                frame.1 += 1;
                match state.get(child).copied() {
                    Some(Visit::InProgress) => {
                        let start = stack.iter().position(|(n, _)| *n == child).unwrap_or(0);
                        let mut cycle: Vec<String> =
                            stack[start..].iter().map(|(n, _)| n.to_string()).collect();
                        cycle.push(child.to_string());
                        return Some(cycle);
                    }
                    Some(Visit::Done) => {}
                    None => {
                        state.insert(child, Visit::InProgress);
                        stack.push((child, 0));
                    }
                }
            }
        }
        None
    }
}

impl From<HashMap<String, Vec<String>>> for DependencyGraph {
    fn from(graph: HashMap<String, Vec<String>>) -> Self {
        let mut normalized = Self(graph);
        let targets: Vec<String> = normalized.0.values().flatten().cloned().collect();
        for target in targets {
            normalized.add_node(target);
        }
        normalized
    }
}

impl From<DependencyGraph> for HashMap<String, Vec<String>> {
    fn from(graph: DependencyGraph) -> Self {
        graph.0
    }
}
