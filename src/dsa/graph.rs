use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

type HashMap<K,V> = std::collections::hash_map::HashMap<K,V,nohash::BuildNoHashHasher<usize>>;
type HashSet<K> = std::collections::hash_set::HashSet<K,nohash::BuildNoHashHasher<usize>>;

fn new_set() -> HashSet<usize> {
    HashSet::with_hasher(nohash::BuildNoHashHasher::default())
}

// one direction of a link, an undirected link is stored as two edges with the same key
#[derive(Clone,Copy,Debug,PartialEq)]
pub struct Edge {
    pub link:usize,
    pub to:usize,
    pub weight:f64,
}

#[derive(Clone,Debug,PartialEq)]
pub struct Path {
    pub nodes:Vec<usize>,
    pub links:Vec<usize>,
    pub weight:f64,
}

// working is the lighter of the two, backup is None when no link-disjoint partner exists
#[derive(Clone,Debug,PartialEq)]
pub struct DisjointPair {
    pub working:Option<Path>,
    pub backup:Option<Path>,
}

#[derive(Clone)]
struct Visited {
    visited_nodes:HashSet<usize>,
    unvisited_nodes:HashSet<usize>
}

impl Visited {
    fn with_capacity(capacity:usize) -> Self {
        Self {visited_nodes:HashSet::with_capacity_and_hasher(capacity,nohash::BuildNoHashHasher::default()),
            unvisited_nodes:HashSet::with_capacity_and_hasher(capacity,nohash::BuildNoHashHasher::default())
        }
    }
    fn push_node(&mut self,node:&usize) {
        if self.visited_nodes.contains(node) {
            debug_assert!(!self.unvisited_nodes.contains(node));
            return;
        }
        self.unvisited_nodes.insert(*node);
    }
    fn visit(&mut self,node:&usize) {
        if !self.unvisited_nodes.remove(node) {
            return
        };
        self.visited_nodes.insert(*node);
    }
    //None: not in the graph
    fn is_visited(&self,node:&usize) -> Option<bool> {
        if self.unvisited_nodes.contains(node) {
            return Some(false);
        }
        if self.visited_nodes.contains(node) {
            return Some(true)
        }
        None
    }
}

impl<A:Borrow<usize>> FromIterator<A> for Visited {
    fn from_iter<T: IntoIterator<Item = A>>(iter: T) -> Self {
        let iter = iter.into_iter();
        let size = match iter.size_hint() {
            (_,Some(higher)) => {higher},
            (lower,None) => {lower}
        };
        let mut v = Self::with_capacity(size);
        for elem in iter {
            v.push_node(elem.borrow());
        }
        v
    }
}

// min-heap entry, ties resolved on the smaller node index so runs are reproducible
#[derive(PartialEq)]
struct Frontier {
    cost:f64,
    node:usize
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost.total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

struct ShortestPathTree {
    dist:HashMap<usize,f64>,
    // node -> (previous node, link used to get here)
    prev:HashMap<usize,(usize,usize)>,
}

impl ShortestPathTree {
    fn trace(&self,source:usize,target:usize) -> Option<(Vec<usize>,Vec<usize>)> {
        if !self.dist.contains_key(&target) {
            return None;
        }
        let mut nodes = vec![target];
        let mut links = vec![];
        let mut current = target;
        while current != source {
            let (previous,link) = self.prev.get(&current)?;
            nodes.push(*previous);
            links.push(*link);
            current = *previous;
        }
        nodes.reverse();
        links.reverse();
        Some((nodes,links))
    }
}

#[derive(Clone)]
pub struct WeightedMultigraph {
    edges_len:usize,
    adjacency:HashMap<usize,Vec<Edge>>,
    weights:HashMap<usize,f64>,
}

impl Default for WeightedMultigraph {
    fn default() -> Self {
        Self::new()
    }
}

impl WeightedMultigraph {
    pub fn new() -> Self {
        Self {
            edges_len:0,
            adjacency:HashMap::with_hasher(nohash::BuildNoHashHasher::default()),
            weights:HashMap::with_hasher(nohash::BuildNoHashHasher::default()),
        }
    }
    pub fn with_capacity(capacity:usize) -> Self {
        if capacity == 0 {
            return Self::new();
        }
        Self {
            edges_len:0,
            adjacency:HashMap::with_capacity_and_hasher(capacity, nohash::BuildNoHashHasher::default()),
            weights:HashMap::with_capacity_and_hasher(capacity, nohash::BuildNoHashHasher::default()),
        }
    }
    pub fn shrink_to_fit(&mut self) {
        self.adjacency.shrink_to_fit();
        self.weights.shrink_to_fit();
        for edges in self.adjacency.values_mut() {
            edges.shrink_to_fit();
        }
    }
    pub fn nodes_len(&self) -> usize {
        self.adjacency.len()
    }
    // counts links, an undirected link counts once
    pub fn edges_len(&self) -> usize {
        self.edges_len
    }
    pub fn contains_node(&self,node:usize) -> bool {
        self.adjacency.contains_key(&node)
    }
    pub fn link_weight(&self,link:usize) -> Option<f64> {
        self.weights.get(&link).copied()
    }
    pub fn next_edges(&self,node:usize) -> &[Edge] {
        self.adjacency.get(&node).map(|edges| edges.as_slice()).unwrap_or(&[])
    }
    pub fn push_node(&mut self,node:usize) {
        self.adjacency.entry(node).or_default();
    }
    fn push_edge(&mut self,from:usize,to:usize,link:usize,weight:f64) {
        self.push_node(to);
        self.adjacency.entry(from).or_default().push(Edge {link,to,weight});
    }
    pub fn push_link(&mut self,a:usize,b:usize,link:usize,weight:f64,directed:bool) {
        debug_assert!(weight.is_finite() && weight >= 0.0);
        self.push_edge(a, b, link, weight);
        if !directed {
            self.push_edge(b, a, link, weight);
        }
        self.weights.insert(link, weight);
        self.edges_len += 1;
    }
    pub fn path_weight(&self,links:&[usize]) -> f64 {
        links.iter().filter_map(|link| self.weights.get(link)).sum()
    }
    pub fn dfs(&self,start_node:usize) -> Option<Vec<usize>> {
        if !self.adjacency.contains_key(&start_node) {
            return None;
        }
        let mut visited:Visited = self.adjacency.keys().collect();
        let mut stack = Vec::with_capacity(self.nodes_len());
        let mut order = Vec::with_capacity(self.nodes_len());
        stack.push(start_node);
        while let Some(current) = stack.pop() {
            if visited.is_visited(&current)? {
                continue;
            }
            visited.visit(&current);
            order.push(current);
            for edge in self.next_edges(current).iter().rev() {
                if !visited.is_visited(&edge.to)? {
                    stack.push(edge.to);
                }
            }
        }
        Some(order)
    }

    fn dijkstra(&self,source:usize,banned_links:&HashSet<usize>,banned_nodes:&HashSet<usize>) -> ShortestPathTree {
        let mut dist = HashMap::with_capacity_and_hasher(self.nodes_len(),nohash::BuildNoHashHasher::default());
        let mut prev = HashMap::with_capacity_and_hasher(self.nodes_len(),nohash::BuildNoHashHasher::default());
        let mut settled = new_set();
        let mut heap = BinaryHeap::new();
        if !self.contains_node(source) {
            return ShortestPathTree {dist,prev};
        }
        dist.insert(source,0.0);
        heap.push(Frontier {cost:0.0,node:source});
        while let Some(Frontier {cost,node}) = heap.pop() {
            if !settled.insert(node) {
                continue;
            }
            for edge in self.next_edges(node) {
                if banned_links.contains(&edge.link) || banned_nodes.contains(&edge.to) {
                    continue;
                }
                let next_cost = cost + edge.weight;
                let better = match dist.get(&edge.to) {
                    Some(known) => next_cost < *known,
                    None => true
                };
                if better {
                    dist.insert(edge.to,next_cost);
                    prev.insert(edge.to,(node,edge.link));
                    heap.push(Frontier {cost:next_cost,node:edge.to});
                }
            }
        }
        ShortestPathTree {dist,prev}
    }

    fn restricted_path(&self,source:usize,target:usize,banned_links:&HashSet<usize>,banned_nodes:&HashSet<usize>) -> Option<Path> {
        let tree = self.dijkstra(source, banned_links, banned_nodes);
        let (nodes,links) = tree.trace(source, target)?;
        let weight = self.path_weight(&links);
        Some(Path {nodes,links,weight})
    }

    pub fn shortest_path(&self,source:usize,target:usize) -> Option<Path> {
        if source == target {
            return None;
        }
        self.restricted_path(source, target, &new_set(), &new_set())
    }

    // Yen's ranked enumeration, loopless paths in non-decreasing weight
    pub fn k_shortest_paths(&self,source:usize,target:usize,k:usize) -> Vec<Path> {
        let mut found:Vec<Path> = Vec::with_capacity(k);
        if k == 0 {
            return found;
        }
        let Some(first) = self.shortest_path(source, target) else {
            return found;
        };
        found.push(first);
        let mut candidates:Vec<Path> = vec![];

        while found.len() < k {
            let Some(last) = found.last().cloned() else {break};
            for i in 0..last.links.len() {
                let spur_node = last.nodes[i];
                let root_nodes = &last.nodes[..=i];
                let root_links = &last.links[..i];

                let mut banned_links = new_set();
                for path in found.iter() {
                    if path.links.len() > i && &path.nodes[..=i] == root_nodes && &path.links[..i] == root_links {
                        banned_links.insert(path.links[i]);
                    }
                }
                let banned_nodes:HashSet<usize> = root_nodes[..i].iter().copied().collect();

                let Some(spur) = self.restricted_path(spur_node, target, &banned_links, &banned_nodes)
                    else {continue};

                let mut nodes = root_nodes[..i].to_vec();
                nodes.extend_from_slice(&spur.nodes);
                let mut links = root_links.to_vec();
                links.extend_from_slice(&spur.links);

                let is_known = found.iter().chain(candidates.iter()).any(|path| path.links == links);
                if !is_known {
                    let weight = self.path_weight(&links);
                    candidates.push(Path {nodes,links,weight});
                }
            }
            // min_by keeps the earliest candidate among equal weights
            let Some(best) = (0..candidates.len())
                .min_by(|a,b| candidates[*a].weight.total_cmp(&candidates[*b].weight))
                else {break};
            found.push(candidates.remove(best));
        }
        found
    }

    // Suurballe: shortest path, then a second search over the residual graph with
    // reduced costs, where the first path's links only exist reversed at zero cost.
    // Segments walked backwards by the second search cancel out.
    pub fn disjoint_pair(&self,source:usize,target:usize) -> DisjointPair {
        let nothing = DisjointPair {working:None,backup:None};
        if source == target {
            return nothing;
        }
        let tree = self.dijkstra(source, &new_set(), &new_set());
        let Some((first_nodes,first_links)) = tree.trace(source, target) else {
            return nothing;
        };
        let first_weight = self.path_weight(&first_links);
        let first = Path {nodes:first_nodes,links:first_links,weight:first_weight};
        let only_first = |first:Path| DisjointPair {working:Some(first),backup:None};

        let on_first:HashSet<usize> = first.links.iter().copied().collect();
        let mut residual = WeightedMultigraph::with_capacity(self.nodes_len());
        let mut nodes:Vec<usize> = self.adjacency.keys().copied().collect();
        nodes.sort_unstable();
        for from in nodes {
            residual.push_node(from);
            let Some(d_from) = tree.dist.get(&from).copied() else {continue};
            for edge in self.next_edges(from) {
                if on_first.contains(&edge.link) {continue}
                let Some(d_to) = tree.dist.get(&edge.to).copied() else {continue};
                let reduced = (edge.weight + d_from - d_to).max(0.0);
                residual.push_edge(from, edge.to, edge.link, reduced);
            }
        }
        for (i,link) in first.links.iter().enumerate() {
            residual.push_edge(first.nodes[i+1], first.nodes[i], *link, 0.0);
        }

        let second_tree = residual.dijkstra(source, &new_set(), &new_set());
        let Some((second_nodes,second_links)) = second_tree.trace(source, target) else {
            return only_first(first);
        };

        let cancelled:HashSet<usize> = second_links.iter()
            .filter(|link| on_first.contains(link)).copied().collect();
        let mut outgoing:HashMap<usize,Vec<(usize,usize)>> =
            HashMap::with_capacity_and_hasher(self.nodes_len(),nohash::BuildNoHashHasher::default());
        for (nodes,links) in [(&first.nodes,&first.links),(&second_nodes,&second_links)] {
            for (i,link) in links.iter().enumerate() {
                if cancelled.contains(link) {continue}
                outgoing.entry(nodes[i]).or_default().push((*link,nodes[i+1]));
            }
        }

        let mut paths = Vec::with_capacity(2);
        for _ in 0..2 {
            let mut nodes = vec![source];
            let mut links = vec![];
            let mut current = source;
            while current != target && links.len() <= self.edges_len {
                let Some(edges) = outgoing.get_mut(&current) else {break};
                if edges.is_empty() {break}
                let (link,to) = edges.remove(0);
                links.push(link);
                nodes.push(to);
                current = to;
            }
            if current != target {
                return only_first(first);
            }
            let weight = self.path_weight(&links);
            paths.push(Path {nodes,links,weight});
        }
        paths.sort_by(|a,b| a.weight.total_cmp(&b.weight));
        let backup = paths.pop();
        let working = paths.pop();
        DisjointPair {working,backup}
    }
}

// undirected links (a,b,weight), link keys follow iteration order
impl<A:Borrow<(usize,usize,f64)>> FromIterator<A> for WeightedMultigraph {
    fn from_iter<T: IntoIterator<Item = A>>(iter: T) -> Self {
        let iter = iter.into_iter();
        let size = match iter.size_hint() {
            (_,Some(higher)) => {higher},
            (lower,None) => {lower}
        };
        let mut new_graph = Self::with_capacity(size);
        for (link,edge) in iter.enumerate() {
            let (a,b,weight) = edge.borrow();
            new_graph.push_link(*a, *b, link, *weight, false);
        }
        new_graph.shrink_to_fit();
        new_graph
    }
}
